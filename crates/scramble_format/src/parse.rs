//! Board-file grammar.
//!
//! ```text
//! ROWSxCOLS
//! CARD        (rows × cols lines, row-major)
//! ```
//!
//! `ROWS` and `COLS` are positive decimals. Each card is a non-empty
//! token with no whitespace. Blank lines after the header are ignored.

use crate::error::{FormatError, FormatResult};
use scramble_core::{CardValue, Layout};
use std::fs;
use std::path::Path;

/// Parses board-file text into a layout for
/// [`scramble_core::Board::from_layout`].
///
/// # Errors
///
/// See [`FormatError`] for the grammar violations reported.
pub fn parse_board(text: &str) -> FormatResult<Layout> {
    let mut lines = text.lines().enumerate();

    let (_, header) = lines
        .by_ref()
        .find(|(_, line)| !line.trim().is_empty())
        .ok_or(FormatError::EmptyInput)?;
    let (rows, cols) = parse_dimensions(header.trim())?;

    let mut cards = Vec::with_capacity(rows * cols);
    for (index, line) in lines {
        let token = line.trim();
        if token.is_empty() {
            continue;
        }
        if token.chars().any(char::is_whitespace) {
            return Err(FormatError::InvalidCard {
                line: index + 1,
                text: token.to_string(),
            });
        }
        cards.push(CardValue::new(token));
    }

    if cards.len() != rows * cols {
        return Err(FormatError::CardCountMismatch {
            expected: rows * cols,
            actual: cards.len(),
        });
    }

    let mut cards = cards.into_iter();
    Ok((0..rows)
        .map(|_| (0..cols).map(|_| cards.next()).collect())
        .collect())
}

/// Reads and parses a board file from disk.
///
/// # Errors
///
/// [`FormatError::Io`] if the file cannot be read, otherwise as
/// [`parse_board`].
pub fn parse_board_file(path: impl AsRef<Path>) -> FormatResult<Layout> {
    let text = fs::read_to_string(path)?;
    parse_board(&text)
}

fn parse_dimensions(header: &str) -> FormatResult<(usize, usize)> {
    let invalid = || FormatError::InvalidDimensions {
        text: header.to_string(),
    };

    let (rows, cols) = header.split_once('x').ok_or_else(invalid)?;
    let parse = |part: &str| -> FormatResult<usize> {
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        part.parse().map_err(|_| invalid())
    };

    let rows = parse(rows)?;
    let cols = parse(cols)?;
    if rows == 0 || cols == 0 {
        return Err(invalid());
    }
    Ok((rows, cols))
}
