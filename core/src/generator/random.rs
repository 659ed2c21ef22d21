use ndarray::Array2;
use rand::prelude::*;

use super::*;

/// Purely random placement: every cell becomes a mine independently with the
/// configured density. A non-positive density yields a mine-free board.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RandomBoardGenerator {
    seed: u64,
}

impl RandomBoardGenerator {
    pub const fn new(seed: u64) -> Self {
        Self { seed }
    }
}

impl BoardGenerator for RandomBoardGenerator {
    fn generate(self, config: BoardConfig) -> Board {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        Board::from_mine_mask(&random_mine_mask(&mut rng, config))
    }
}

/// Regenerates whole boards until the starting cell is mine-free with a zero
/// adjacent-mine count, so the first reveal always opens a patch.
///
/// Rejection sampling with no retry cap: the acceptance probability shrinks
/// geometrically with density, so practical densities converge after a
/// handful of boards, but densities close to 1 can in principle spin for a
/// very long time.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SafeStartGenerator {
    seed: u64,
    start: Coord2,
}

impl SafeStartGenerator {
    pub const fn new(seed: u64, start: Coord2) -> Self {
        Self { seed, start }
    }
}

impl BoardGenerator for SafeStartGenerator {
    fn generate(self, config: BoardConfig) -> Board {
        let mut rng = SmallRng::seed_from_u64(self.seed);
        let start = (
            self.start.0.min(config.size.0.saturating_sub(1)),
            self.start.1.min(config.size.1.saturating_sub(1)),
        );
        if start != self.start {
            log::warn!("Start cell {:?} out of bounds, clamped to {:?}", self.start, start);
        }

        let mut attempts: u64 = 0;
        loop {
            let board = Board::from_mine_mask(&random_mine_mask(&mut rng, config));
            let cell = board[start];
            if !cell.mine && cell.adjacent_mines == 0 {
                return board;
            }

            attempts += 1;
            if attempts % 10_000 == 0 {
                log::warn!(
                    "Still searching for a zero start at {:?} after {} boards, density {}",
                    start,
                    attempts,
                    config.mine_density
                );
            }
        }
    }
}

fn random_mine_mask(rng: &mut SmallRng, config: BoardConfig) -> Array2<bool> {
    let density = config.mine_density;
    if !(density > 0.0) {
        return Array2::default(config.size.to_nd_index());
    }
    let density = density.clamp(0.0, 1.0);

    Array2::from_shape_simple_fn(config.size.to_nd_index(), || rng.random_bool(density))
}
