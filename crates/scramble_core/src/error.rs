//! Error types for the board engine.

use crate::types::Position;
use thiserror::Error;

/// Result type for board operations.
pub type BoardResult<T> = Result<T, BoardError>;

/// Errors that can occur in board operations.
///
/// All variants except [`BoardError::InvariantViolation`] are expected
/// outcomes of normal play; callers retry or report them. An invariant
/// violation indicates a concurrency bug inside the engine and aborts the
/// affected operation — it must never be swallowed.
#[derive(Debug, Error)]
pub enum BoardError {
    /// The target position holds no card (never had one, or the pair was
    /// removed).
    #[error("no card at {pos}")]
    NoCardHere {
        /// The requested position.
        pos: Position,
    },

    /// A second flip targeted a face-up card that a player currently
    /// holds.
    #[error("card at {pos} is held by a player")]
    OpponentControlled {
        /// The requested position.
        pos: Position,
    },

    /// Coordinates fall outside the grid.
    #[error("position {pos} is outside the {rows}x{cols} grid")]
    InvalidPosition {
        /// The requested position.
        pos: Position,
        /// Grid row count.
        rows: usize,
        /// Grid column count.
        cols: usize,
    },

    /// The construction-time layout was rejected.
    #[error("invalid layout: {message}")]
    InvalidLayout {
        /// Description of the problem.
        message: String,
    },

    /// A blocked flip abandoned its wait (deadline expired or the caller
    /// cancelled). No board state was mutated.
    #[error("wait for {pos} was cancelled")]
    Cancelled {
        /// The position the caller was waiting for.
        pos: Position,
    },

    /// The store-wide representation invariant failed to re-validate.
    /// Fatal: indicates a bug in the engine, not in the caller.
    #[error("internal invariant violated: {message}")]
    InvariantViolation {
        /// Description of the violated invariant.
        message: String,
    },
}

impl BoardError {
    /// Creates an invalid layout error.
    pub fn invalid_layout(message: impl Into<String>) -> Self {
        Self::InvalidLayout {
            message: message.into(),
        }
    }

    /// Creates an invariant violation error.
    pub fn invariant_violation(message: impl Into<String>) -> Self {
        Self::InvariantViolation {
            message: message.into(),
        }
    }
}
