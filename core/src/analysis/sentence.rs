use alloc::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::*;

/// Logical statement about the board: among `cells`, exactly `mines` are
/// mines. The mine count never changes after construction; tighter
/// statements are derived as new sentences, never by editing this one.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sentence {
    cells: BTreeSet<Coord2>,
    mines: u8,
}

impl Sentence {
    pub fn new(cells: BTreeSet<Coord2>, mines: u8) -> Self {
        Self { cells, mines }
    }

    pub fn cells(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.cells.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn mines(&self) -> u8 {
        self.mines
    }

    /// Set equality: two sentences say the same thing about the board when
    /// they constrain exactly the same cells.
    pub fn covers_same_cells(&self, other: &Sentence) -> bool {
        self.cells == other.cells
    }

    /// Cells of `self` that `other` does not constrain.
    pub fn difference(&self, other: &Sentence) -> BTreeSet<Coord2> {
        self.cells.difference(&other.cells).copied().collect()
    }

    /// Highlight hue for member cells: higher intensity means fewer expected
    /// mines among the sentence.
    pub fn highlight_intensity(&self) -> f32 {
        1.0 - f32::from(self.mines) / 9.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sentence(cells: &[Coord2], mines: u8) -> Sentence {
        Sentence::new(cells.iter().copied().collect(), mines)
    }

    #[test]
    fn coverage_ignores_collection_order() {
        let forward = sentence(&[(0, 0), (1, 0), (2, 0)], 1);
        let backward = sentence(&[(2, 0), (0, 0), (1, 0)], 2);

        assert!(forward.covers_same_cells(&backward));
    }

    #[test]
    fn difference_is_one_sided() {
        let big = sentence(&[(0, 0), (1, 0), (2, 0)], 2);
        let small = sentence(&[(1, 0)], 1);

        let only_in_big: BTreeSet<_> = big.difference(&small);
        assert_eq!(only_in_big, [(0, 0), (2, 0)].into_iter().collect());
        assert!(small.difference(&big).is_empty());
    }

    #[test]
    fn highlight_drops_with_expected_mines() {
        assert!(sentence(&[(0, 0)], 0).highlight_intensity() > sentence(&[(0, 0)], 5).highlight_intensity());
    }
}
