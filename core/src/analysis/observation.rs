use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use serde::{Deserialize, Serialize};

use crate::*;

/// One cell the caller has revealed: its position and the number of mines
/// adjacent to it. The caller is the authority on what "revealed" means;
/// the agent only observes, it never reveals.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealedCell {
    pub coords: Coord2,
    pub adjacent_mines: u8,
}

impl RevealedCell {
    pub const fn new(coords: Coord2, adjacent_mines: u8) -> Self {
        Self {
            coords,
            adjacent_mines,
        }
    }
}

/// Tracks which revealed cells have already been reported to an agent, so a
/// caller can hand over only the delta since its previous reasoning pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationLog {
    reported: BTreeSet<Coord2>,
}

impl ObservationLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns an observation for every revealed cell of `board` not yet
    /// reported, and marks those cells as reported.
    pub fn drain_new(&mut self, board: &Board) -> Vec<RevealedCell> {
        let (x_end, y_end) = board.size();
        let mut batch = Vec::new();

        for x in 0..x_end {
            for y in 0..y_end {
                let coords = (x, y);
                let cell = board[coords];
                if cell.state.is_revealed() && self.reported.insert(coords) {
                    batch.push(RevealedCell::new(coords, cell.adjacent_mines));
                }
            }
        }

        batch
    }
}
