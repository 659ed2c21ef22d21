use alloc::collections::VecDeque;
use alloc::string::String;
use core::ops::Index;

use hashbrown::HashSet;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum BoardState {
    Ready,
    Active,
    Won,
    Lost,
}

impl BoardState {
    pub const fn is_ready(self) -> bool {
        matches!(self, Self::Ready)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum MarkOutcome {
    NoChange,
    Changed,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum RevealOutcome {
    NoChange,
    Revealed,
    HitMine,
}

/// The minefield itself: a fixed-size grid of cells with consistent
/// adjacent-mine counts. Mutated only by the owning caller; the inference
/// side observes it exclusively through reported [`RevealedCell`] batches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Board {
    cells: Array2<Cell>,
    mine_count: CellCount,
}

impl Board {
    /// Builds a board from a mine mask, computing every adjacent-mine count
    /// with the 8-neighbor scan.
    pub fn from_mine_mask(mine_mask: &Array2<bool>) -> Self {
        let mut cells: Array2<Cell> = Array2::default(mine_mask.dim());
        let mut mine_count: CellCount = 0;

        for (index, &is_mine) in mine_mask.indexed_iter() {
            if is_mine {
                cells[index] = Cell::mine();
                mine_count += 1;
            }
        }

        let mut board = Self { cells, mine_count };
        let size = board.size();
        for x in 0..size.0 {
            for y in 0..size.1 {
                let coords = (x, y);
                let adjacent = moore_neighbors(coords, size)
                    .iter()
                    .filter(|&&pos| board[pos].mine)
                    .count()
                    .try_into()
                    .unwrap();
                board.cell_mut(coords).adjacent_mines = adjacent;
            }
        }

        board
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());

        for &coords in mine_coords {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        Ok(Self::from_mine_mask(&mine_mask))
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.cells.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    pub fn total_cells(&self) -> CellCount {
        self.cells.len().try_into().unwrap()
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn in_bounds(&self, coords: Coord2) -> bool {
        let size = self.size();
        coords.0 < size.0 && coords.1 < size.1
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        if self.in_bounds(coords) {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn cell_at(&self, coords: Coord2) -> Cell {
        self[coords]
    }

    /// Reveals the connected region of zero-adjacency cells around `origin`,
    /// plus its numbered border. A no-op when `origin` is out of bounds or
    /// its own adjacent-mine count is nonzero.
    pub fn reveal_empty_patch(&mut self, origin: Coord2) {
        if !self.in_bounds(origin) || self[origin].adjacent_mines != 0 {
            return;
        }

        let size = self.size();
        let mut discovered: HashSet<Coord2> = HashSet::new();
        let mut frontier = VecDeque::from([origin]);

        while let Some(coords) = frontier.pop_front() {
            if !discovered.insert(coords) {
                continue;
            }

            self.cell_mut(coords).state = CellState::Revealed;

            if self[coords].adjacent_mines != 0 {
                continue;
            }

            frontier.extend(
                moore_neighbors(coords, size)
                    .into_iter()
                    .filter(|pos| !discovered.contains(pos)),
            );
        }
    }

    /// Reveals a single cell, opening the whole empty patch when the cell
    /// has no adjacent mines. Revealing discards any flag on the cell.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;
        self.check_not_finished()?;

        if self[coords].state.is_revealed() {
            return Ok(RevealOutcome::NoChange);
        }

        self.cell_mut(coords).state = CellState::Revealed;

        if self[coords].mine {
            return Ok(RevealOutcome::HitMine);
        }

        if self[coords].adjacent_mines == 0 {
            self.reveal_empty_patch(coords);
        }

        Ok(RevealOutcome::Revealed)
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        use CellState::*;

        let coords = self.validate_coords(coords)?;
        self.check_not_finished()?;

        Ok(match self[coords].state {
            Hidden => {
                self.cell_mut(coords).state = Flagged;
                MarkOutcome::Changed
            }
            Flagged => {
                self.cell_mut(coords).state = Hidden;
                MarkOutcome::Changed
            }
            Revealed => MarkOutcome::NoChange,
        })
    }

    /// Derives the game state from the grid. Loss is checked before win, so
    /// a board that is simultaneously "all accounted for" and has a revealed
    /// mine counts as lost.
    pub fn state(&self) -> BoardState {
        if self
            .cells
            .iter()
            .any(|cell| cell.mine && cell.state.is_revealed())
        {
            return BoardState::Lost;
        }

        let won = self.cells.iter().all(|cell| match cell.state {
            CellState::Flagged => cell.mine,
            CellState::Revealed => true,
            CellState::Hidden => false,
        });
        if won {
            return BoardState::Won;
        }

        if self.cells.iter().all(|cell| !cell.state.is_revealed()) {
            BoardState::Ready
        } else {
            BoardState::Active
        }
    }

    /// Dense text dump of the whole field, `*` for mines and the adjacency
    /// digit otherwise. Shows unrevealed cells and mines alike; debugging
    /// only.
    pub fn render_ascii(&self) -> String {
        let (size_x, size_y) = self.size();
        let mut out = String::new();

        for y in 0..size_y {
            for x in 0..size_x {
                let cell = self[(x, y)];
                if cell.mine {
                    out.push('*');
                } else {
                    out.push(char::from(b'0' + cell.adjacent_mines));
                }
                out.push(' ');
            }
            out.push('\n');
        }

        out
    }

    fn cell_mut(&mut self, coords: Coord2) -> &mut Cell {
        &mut self.cells[coords.to_nd_index()]
    }

    fn check_not_finished(&self) -> Result<()> {
        if self.state().is_finished() {
            Err(GameError::AlreadyEnded)
        } else {
            Ok(())
        }
    }
}

impl Index<Coord2> for Board {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}
