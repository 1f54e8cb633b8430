//! Error type shared by the codec, the solver and the front ends.

use thiserror::Error;

use crate::{Pos, State};

/// Precondition violations. None of these are expected during correct play;
/// they surface caller bugs instead of silently corrupting a state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    #[error("position {0} is off the board (expected 0-8)")]
    InvalidPosition(u8),

    #[error("position {0} is already occupied")]
    OccupiedCell(Pos),

    #[error("invalid state encoding {0:#010x}")]
    InvalidEncoding(u32),

    #[error("invalid board notation '{notation}': {reason}")]
    InvalidNotation { notation: String, reason: String },

    #[error("invalid piece counts: X={crosses}, O={noughts} (X must equal O or lead by one)")]
    InvalidPieceCounts { crosses: usize, noughts: usize },

    #[error("game is already over")]
    GameOver,

    #[error("no empty cells left on the board")]
    BoardFull,

    #[error("state '{}' has not been solved", .0.notation())]
    Unsolved(State),
}

/// Convenience alias used across the workspace.
pub type Result<T> = std::result::Result<T, Error>;
