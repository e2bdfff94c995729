//! Error types for board-file parsing.

use std::io;
use thiserror::Error;

/// Result type for format operations.
pub type FormatResult<T> = Result<T, FormatError>;

/// Errors produced while parsing a board file.
#[derive(Debug, Error)]
pub enum FormatError {
    /// The input contained nothing to parse.
    #[error("board file is empty")]
    EmptyInput,

    /// The first line was not `ROWSxCOLS` with positive decimals.
    #[error("invalid board dimensions: {text:?}")]
    InvalidDimensions {
        /// The offending header line.
        text: String,
    },

    /// The number of card lines did not match rows × cols.
    #[error("expected {expected} cards, got {actual}")]
    CardCountMismatch {
        /// rows × cols from the header.
        expected: usize,
        /// Card lines actually present.
        actual: usize,
    },

    /// A card token was empty or contained whitespace.
    #[error("invalid card on line {line}: {text:?}")]
    InvalidCard {
        /// 1-based line number in the input.
        line: usize,
        /// The offending token.
        text: String,
    },

    /// The board file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}
