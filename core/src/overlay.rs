use core::ops::Index;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// The agent's belief about one board cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prediction {
    Unknown,
    Safe,
    Mine,
}

impl Prediction {
    pub const fn is_known(self) -> bool {
        !matches!(self, Self::Unknown)
    }
}

impl Default for Prediction {
    fn default() -> Self {
        Self::Unknown
    }
}

/// Display state the engine keeps for one board cell. The engine is the only
/// writer; callers read overlays to draw predictions and sentence highlights
/// and must never feed them back into the board on their own authority.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CellOverlay {
    pub prediction: Prediction,
    /// A cell can hold a prediction without showing it, e.g. cells the
    /// caller already revealed carry no inference worth displaying.
    pub show_prediction: bool,
    /// Sentence highlight hue in `[0, 1]`; higher means fewer expected mines
    /// among the highlighted sentence.
    pub highlight: Option<f32>,
}

impl Default for CellOverlay {
    fn default() -> Self {
        Self {
            prediction: Prediction::Unknown,
            show_prediction: true,
            highlight: None,
        }
    }
}

/// One overlay per board cell, created alongside an agent and living exactly
/// as long as it does.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OverlayGrid {
    overlays: Array2<CellOverlay>,
}

impl OverlayGrid {
    pub fn new(size: Coord2) -> Self {
        Self {
            overlays: Array2::default(size.to_nd_index()),
        }
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.overlays.dim();
        (dim.0.try_into().unwrap(), dim.1.try_into().unwrap())
    }

    pub fn get(&self, coords: Coord2) -> CellOverlay {
        self.overlays[coords.to_nd_index()]
    }

    pub fn prediction(&self, coords: Coord2) -> Prediction {
        self.get(coords).prediction
    }

    pub(crate) fn get_mut(&mut self, coords: Coord2) -> &mut CellOverlay {
        &mut self.overlays[coords.to_nd_index()]
    }
}

impl Index<Coord2> for OverlayGrid {
    type Output = CellOverlay;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.overlays[coords.to_nd_index()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_grid_is_all_unknown() {
        let grid = OverlayGrid::new((3, 2));

        assert_eq!(grid.size(), (3, 2));
        for x in 0..3 {
            for y in 0..2 {
                let overlay = grid.get((x, y));
                assert_eq!(overlay.prediction, Prediction::Unknown);
                assert!(overlay.show_prediction);
                assert_eq!(overlay.highlight, None);
            }
        }
    }
}
