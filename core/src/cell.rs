use serde::{Deserialize, Serialize};

/// Visibility of a single board cell. A cell can never be revealed and
/// flagged at the same time; revealing a flagged cell discards the flag.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellState {
    Hidden,
    Revealed,
    Flagged,
}

impl CellState {
    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed)
    }

    pub const fn is_flagged(self) -> bool {
        matches!(self, Self::Flagged)
    }
}

impl Default for CellState {
    fn default() -> Self {
        Self::Hidden
    }
}

/// One cell of the minefield.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub mine: bool,
    pub state: CellState,
    pub adjacent_mines: u8,
}

impl Cell {
    pub const fn mine() -> Self {
        Self {
            mine: true,
            state: CellState::Hidden,
            adjacent_mines: 0,
        }
    }

    pub const fn hint(adjacent_mines: u8) -> Self {
        Self {
            mine: false,
            state: CellState::Hidden,
            adjacent_mines,
        }
    }
}
