#![no_std]

extern crate alloc;

use serde::{Deserialize, Serialize};

pub use agent::*;
pub use analysis::*;
pub use board::*;
pub use cell::*;
pub use error::*;
pub use generator::*;
pub use overlay::*;
pub use types::*;

mod agent;
mod analysis;
mod board;
mod cell;
mod error;
mod generator;
mod overlay;
mod types;

/// Board dimensions and the target mine density used by the generators.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardConfig {
    pub size: Coord2,
    pub mine_density: f64,
}

impl BoardConfig {
    pub const fn new_unchecked(size: Coord2, mine_density: f64) -> Self {
        Self { size, mine_density }
    }

    pub fn new((size_x, size_y): Coord2, mine_density: f64) -> Self {
        let size_x = size_x.clamp(1, Coord::MAX);
        let size_y = size_y.clamp(1, Coord::MAX);
        let mine_density = if mine_density.is_finite() {
            mine_density.clamp(0.0, 1.0)
        } else {
            log::warn!("Mine density {} is not finite, using 0", mine_density);
            0.0
        };
        Self::new_unchecked((size_x, size_y), mine_density)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }
}
