//! # Scramble Format
//!
//! Board-file parsing and board-state text rendering for the scramble
//! board engine.
//!
//! This crate owns the text formats at the engine's boundary:
//! - The board-file grammar (`ROWSxCOLS` header, one card per line)
//! - The player-perspective board-state rendering
//!   (`none` / `down` / `up CARD` / `my CARD`)
//!
//! It knows nothing about concurrency: it produces layouts for
//! [`scramble_core::Board::from_layout`] and renders snapshots taken
//! with [`scramble_core::Board::look`].
//!
//! ## Example
//!
//! ```rust
//! use scramble_core::{Board, PlayerId};
//! use scramble_format::{parse_board, render_view};
//!
//! let board = Board::from_layout(parse_board("1x2\nA\nA\n")?).unwrap();
//! let view = board.look(&PlayerId::new("alice"));
//! assert_eq!(render_view(&view), "1x2\ndown\ndown\n");
//! # Ok::<(), scramble_format::FormatError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod parse;
mod render;

pub use error::{FormatError, FormatResult};
pub use parse::{parse_board, parse_board_file};
pub use render::render_view;
