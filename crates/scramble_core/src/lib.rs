//! # Scramble Core
//!
//! A shared, mutable card-matching board accessed concurrently by many
//! independent players.
//!
//! This crate provides:
//! - The concurrent flip protocol with lazy per-player cleanup
//! - Blocking waits on cards held by other players, with cancellation
//! - Bulk value transforms that preserve pairwise-matching consistency
//! - A change notifier for "board changed" watchers
//! - Player-perspective board snapshots
//!
//! Board files and text serialization live in `scramble_format`; request
//! transport and rendering are out of scope entirely.
//!
//! ## Example
//!
//! ```rust
//! use scramble_core::{Board, CardValue, FlipOutcome, PlayerId, Position};
//!
//! let a = || Some(CardValue::new("A"));
//! let board = Board::from_layout(vec![vec![a(), a()]])?;
//! let player = PlayerId::new("alice");
//!
//! board.flip(&player, Position::new(0, 0))?;
//! let outcome = board.flip(&player, Position::new(0, 1))?;
//! assert_eq!(outcome, FlipOutcome::Matched);
//! # Ok::<(), scramble_core::BoardError>(())
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod board;
mod cell;
mod error;
mod notifier;
mod store;
mod turn;
mod types;
mod valuelock;
mod view;
mod waitlist;

pub use board::{Board, FlipOutcome};
pub use cell::Cell;
pub use error::{BoardError, BoardResult};
pub use notifier::ChangeNotifier;
pub use store::{CellStore, Layout};
pub use turn::TurnState;
pub use types::{CardValue, PlayerId, Position};
pub use valuelock::ValueLocks;
pub use view::{BoardView, CellView};
pub use waitlist::{WaitRegistry, WaitTicket};
