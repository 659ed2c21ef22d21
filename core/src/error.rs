use thiserror::Error;

use crate::Coord2;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid coordinates")]
    InvalidCoords,
    #[error("Game already ended, no new moves are accepted")]
    AlreadyEnded,
    #[error("Knowledge base is contradictory: {mines} mines claimed among {cells} cells")]
    ContradictoryKnowledge { cells: usize, mines: u8 },
    #[error("Conflicting prediction for cell {coords:?}")]
    ConflictingPrediction { coords: Coord2 },
}

pub type Result<T> = core::result::Result<T, GameError>;
