//! Error taxonomy
//!
//! Construction errors are fatal for a level load. Move errors are
//! recoverable: the rejected move leaves the grid untouched.

use thiserror::Error;

use crate::sim::element::{Colour, Position};

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, SimError>;

/// Errors raised while building a grid from a tile-code matrix
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstructionError {
    #[error("level has no cells")]
    Empty,
    #[error("row {row} has {found} cells, expected {expected}")]
    Ragged {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown element code {code} at ({row}, {col})")]
    UnknownCode { code: u8, row: usize, col: usize },
    #[error("level has no player")]
    MissingPlayer,
    #[error("level has more than one player: {first} and {second}")]
    MultiplePlayers { first: Position, second: Position },
}

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Construction(#[from] ConstructionError),
    #[error("position ({row}, {col}) is outside the grid")]
    OutOfBounds { row: usize, col: usize },
    #[error("illegal move from {from} to {to}")]
    IllegalMove { from: Position, to: Position },
    #[error("door needs a {door:?} key, player holds {held:?}")]
    MismatchedKey { door: Colour, held: Vec<Colour> },
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("line {line}: cannot parse tile code {token:?}")]
    Parse { line: usize, token: String },
    #[error("level json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

impl SimError {
    /// True for rejections the player phase swallows silently
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            SimError::IllegalMove { .. } | SimError::MismatchedKey { .. }
        )
    }
}
