//! The shared, concurrent game board.
//!
//! A `Board` is one owned aggregate behind an explicit concurrency
//! boundary: a single exclusive section guards all cell-state mutation,
//! per-position wait slots park callers blocked by rule 1-D, value-scoped
//! locks serialize bulk transforms, and a change counter wakes watchers.
//!
//! ## Flip protocol
//!
//! First card of a turn:
//! - 1-A: empty position fails.
//! - 1-B: face-down card turns face up under the caller's control.
//! - 1-C: face-up uncontrolled card is claimed.
//! - 1-D: a card held by another player blocks the caller until it is
//!   released, then every rule is re-evaluated from the top.
//!
//! Second card:
//! - 2-A/2-B: an empty position or a held card fails the turn and
//!   releases the first card (face up, uncontrolled).
//! - 2-C: the card turns face up (or is claimed) under the caller.
//! - 2-D: equal values: the caller keeps control of both.
//! - 2-E: unequal values: control of both is dropped immediately.
//!
//! Cleanup, at the start of the same player's *next* call, resolves the
//! finished pair lazily: a still-controlled equal pair is removed from
//! the board; anything else is turned back face down unless another
//! player has since taken it. The board may hold a resolved-but-uncleaned
//! pair indefinitely, visible to onlookers, until its owner moves again.

use crate::cell::Cell;
use crate::error::{BoardError, BoardResult};
use crate::notifier::ChangeNotifier;
use crate::store::{CellStore, Layout};
use crate::turn::TurnState;
use crate::types::{CardValue, PlayerId, Position};
use crate::valuelock::ValueLocks;
use crate::view::{BoardView, CellView};
use crate::waitlist::WaitRegistry;
use parking_lot::Mutex;
use std::fmt;
use std::time::Instant;
use tracing::{debug, trace};

/// Outcome of a successful flip call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlipOutcome {
    /// The first card of a turn is now face up under the caller.
    TurnedUp(CardValue),
    /// The second card completed a matching pair; the caller keeps
    /// control of both until their next call removes them.
    Matched,
    /// The second card did not match; both cards stay face up and
    /// uncontrolled until the caller's next call turns them down.
    Mismatched,
}

enum FlipStep {
    Complete(FlipOutcome),
    Blocked,
}

/// A shared, mutable game board for concurrent players.
///
/// All entry points take `&self`; the board is safe to share across
/// threads behind an `Arc`. Its lifecycle is caller-managed: construct
/// from a layout, discard when the game ends.
pub struct Board {
    rows: usize,
    cols: usize,
    state: Mutex<CellStore>,
    waiters: WaitRegistry,
    notifier: ChangeNotifier,
    transform_locks: ValueLocks,
}

impl Board {
    /// Builds a board from a rectangular layout of optional initial
    /// values. Every card starts face down; absent values start (and
    /// stay) empty.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidLayout`] if rows are inconsistent or
    /// dimensions are non-positive.
    pub fn from_layout(layout: Layout) -> BoardResult<Self> {
        let store = CellStore::from_layout(layout)?;
        Ok(Self {
            rows: store.rows(),
            cols: store.cols(),
            state: Mutex::new(store),
            waiters: WaitRegistry::new(),
            notifier: ChangeNotifier::new(),
            transform_locks: ValueLocks::new(),
        })
    }

    /// Number of rows. Dimensions never change after construction.
    #[must_use]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Tries to flip the card at `pos` for `player`, blocking while the
    /// target is held by another player (rule 1-D).
    ///
    /// The caller's previous turn, if resolved, is cleaned up first —
    /// even if this request ultimately fails.
    ///
    /// # Errors
    ///
    /// [`BoardError::InvalidPosition`], [`BoardError::NoCardHere`],
    /// [`BoardError::OpponentControlled`], or a fatal
    /// [`BoardError::InvariantViolation`].
    pub fn flip(&self, player: &PlayerId, pos: Position) -> BoardResult<FlipOutcome> {
        self.flip_inner(player, pos, None)
    }

    /// Like [`Board::flip`], but abandons a rule 1-D wait at `deadline`
    /// with [`BoardError::Cancelled`], leaving board state untouched.
    pub fn flip_until(
        &self,
        player: &PlayerId,
        pos: Position,
        deadline: Instant,
    ) -> BoardResult<FlipOutcome> {
        self.flip_inner(player, pos, Some(deadline))
    }

    fn flip_inner(
        &self,
        player: &PlayerId,
        pos: Position,
        deadline: Option<Instant>,
    ) -> BoardResult<FlipOutcome> {
        // Malformed coordinates are rejected before the protocol engages.
        if pos.row >= self.rows || pos.col >= self.cols {
            return Err(BoardError::InvalidPosition {
                pos,
                rows: self.rows,
                cols: self.cols,
            });
        }

        let mut state = self.state.lock();
        loop {
            self.run_cleanup(&mut state, player)?;
            match self.try_flip(&mut state, player, pos)? {
                FlipStep::Complete(outcome) => return Ok(outcome),
                FlipStep::Blocked => {
                    trace!(player = %player, %pos, "flip blocked, waiting for release");
                    let ticket = self.waiters.register(pos);
                    match deadline {
                        Some(deadline) => {
                            if !ticket.wait_until(&mut state, deadline) {
                                return Err(BoardError::Cancelled { pos });
                            }
                        }
                        None => ticket.wait(&mut state),
                    }
                    // Re-evaluate every rule from the top: the board may
                    // have changed arbitrarily while suspended.
                }
            }
        }
    }

    /// Lazy cleanup of the caller's previous turn (rules 3-A/3-B).
    fn run_cleanup(&self, store: &mut CellStore, player: &PlayerId) -> BoardResult<()> {
        let TurnState::Resolved { first, second } = store.turn(player) else {
            return Ok(());
        };

        // The pair is matched exactly when the player still controls
        // both cells: a matched pair keeps control (2-D) and cannot be
        // taken, while a mismatched pair loses it immediately (2-E).
        // Value equality is re-checked lazily; transforms rewrite both
        // cards of a pair together, so it cannot have drifted.
        let matched = store.get(first)?.controller() == Some(player)
            && store.get(second)?.controller() == Some(player)
            && store.get(first)?.value() == store.get(second)?.value();

        if matched {
            for pos in [first, second] {
                store.set(pos, Cell::Empty)?;
                // Waiters on a removed card must wake and fail.
                self.waiters.release_all(pos);
                self.notifier.record_change();
            }
            debug!(player = %player, %first, %second, "matched pair removed");
        } else {
            for pos in [first, second] {
                let Cell::FaceUp { value, controller } = store.get(pos)?.clone() else {
                    continue;
                };
                if matches!(&controller, Some(owner) if owner != player) {
                    // Another player has since taken this card.
                    continue;
                }
                store.set(pos, Cell::FaceDown(value))?;
                if controller.is_some() {
                    self.waiters.release_all(pos);
                }
                self.notifier.record_change();
            }
        }

        store.set_turn(player, TurnState::Idle);
        store.verify()
    }

    fn try_flip(
        &self,
        store: &mut CellStore,
        player: &PlayerId,
        pos: Position,
    ) -> BoardResult<FlipStep> {
        match store.turn(player) {
            TurnState::Idle => self.first_flip(store, player, pos),
            TurnState::HoldingOne(first) => self
                .second_flip(store, player, first, pos)
                .map(FlipStep::Complete),
            TurnState::Resolved { .. } => Err(BoardError::invariant_violation(format!(
                "cleanup did not run before {player}'s flip"
            ))),
        }
    }

    /// First card of a turn (rules 1-A through 1-D).
    fn first_flip(
        &self,
        store: &mut CellStore,
        player: &PlayerId,
        pos: Position,
    ) -> BoardResult<FlipStep> {
        match store.get(pos)?.clone() {
            Cell::Empty => Err(BoardError::NoCardHere { pos }),
            Cell::FaceDown(value) => {
                store.set(
                    pos,
                    Cell::FaceUp {
                        value: value.clone(),
                        controller: Some(player.clone()),
                    },
                )?;
                store.set_turn(player, TurnState::HoldingOne(pos));
                self.notifier.record_change();
                store.verify()?;
                Ok(FlipStep::Complete(FlipOutcome::TurnedUp(value)))
            }
            Cell::FaceUp {
                value,
                controller: None,
            } => {
                // Claiming an already-visible card changes no face or
                // value: watchers are not woken.
                store.set(
                    pos,
                    Cell::FaceUp {
                        value: value.clone(),
                        controller: Some(player.clone()),
                    },
                )?;
                store.set_turn(player, TurnState::HoldingOne(pos));
                store.verify()?;
                Ok(FlipStep::Complete(FlipOutcome::TurnedUp(value)))
            }
            Cell::FaceUp {
                controller: Some(owner),
                ..
            } => {
                if owner == *player {
                    Err(BoardError::invariant_violation(format!(
                        "idle player {player} already controls {pos}"
                    )))
                } else {
                    Ok(FlipStep::Blocked)
                }
            }
        }
    }

    /// Second card of a turn (rules 2-A through 2-E).
    fn second_flip(
        &self,
        store: &mut CellStore,
        player: &PlayerId,
        first: Position,
        pos: Position,
    ) -> BoardResult<FlipOutcome> {
        let result = self.second_flip_inner(store, player, first, pos);
        store.verify()?;
        result
    }

    fn second_flip_inner(
        &self,
        store: &mut CellStore,
        player: &PlayerId,
        first: Position,
        pos: Position,
    ) -> BoardResult<FlipOutcome> {
        match store.get(pos)?.clone() {
            Cell::Empty => {
                self.abandon_first(store, player, first)?;
                Err(BoardError::NoCardHere { pos })
            }
            Cell::FaceUp {
                controller: Some(_),
                ..
            } => {
                // Held by anyone — another player, or the caller's own
                // first card.
                self.abandon_first(store, player, first)?;
                Err(BoardError::OpponentControlled { pos })
            }
            Cell::FaceDown(value) => {
                store.set(
                    pos,
                    Cell::FaceUp {
                        value,
                        controller: Some(player.clone()),
                    },
                )?;
                self.notifier.record_change();
                self.compare_pair(store, player, first, pos)
            }
            Cell::FaceUp {
                value,
                controller: None,
            } => {
                store.set(
                    pos,
                    Cell::FaceUp {
                        value,
                        controller: Some(player.clone()),
                    },
                )?;
                self.compare_pair(store, player, first, pos)
            }
        }
    }

    fn compare_pair(
        &self,
        store: &mut CellStore,
        player: &PlayerId,
        first: Position,
        second: Position,
    ) -> BoardResult<FlipOutcome> {
        let first_value = store
            .get(first)?
            .value()
            .cloned()
            .ok_or_else(|| held_card_vanished(player, first))?;
        let second_value = store
            .get(second)?
            .value()
            .cloned()
            .ok_or_else(|| held_card_vanished(player, second))?;

        if first_value == second_value {
            // 2-D: keep control of both; removal is deferred to cleanup.
            store.set_turn(player, TurnState::Resolved { first, second });
            debug!(player = %player, %first, %second, value = %first_value, "pair matched");
            Ok(FlipOutcome::Matched)
        } else {
            // 2-E: drop control immediately; the face-down reset is
            // deferred to cleanup.
            self.release_control(store, player, first)?;
            self.release_control(store, player, second)?;
            store.set_turn(player, TurnState::Resolved { first, second });
            self.waiters.release_all(first);
            self.waiters.release_all(second);
            Ok(FlipOutcome::Mismatched)
        }
    }

    /// Rule 2-A/2-B failure path: the first card is released face up and
    /// the turn ends with no deferred cleanup.
    fn abandon_first(
        &self,
        store: &mut CellStore,
        player: &PlayerId,
        first: Position,
    ) -> BoardResult<()> {
        self.release_control(store, player, first)?;
        store.set_turn(player, TurnState::Idle);
        self.waiters.release_all(first);
        Ok(())
    }

    /// Clears `player`'s control of `pos`, leaving the card face up.
    /// Control-only: never signals watchers.
    fn release_control(
        &self,
        store: &mut CellStore,
        player: &PlayerId,
        pos: Position,
    ) -> BoardResult<()> {
        if let Cell::FaceUp {
            value,
            controller: Some(owner),
        } = store.get(pos)?.clone()
        {
            if owner == *player {
                store.set(
                    pos,
                    Cell::FaceUp {
                        value,
                        controller: None,
                    },
                )?;
            }
        }
        Ok(())
    }

    /// Rewrites every cell currently showing `old` to `new`, preserving
    /// face state and controllers, and returns the number of rewritten
    /// cells (0 if the value is absent — not an error).
    ///
    /// Runs under exclusive locks for both `old` and `new`, so no
    /// observer can see one card of a previously matching pair rewritten
    /// while its partner is not. Transforms over disjoint values proceed
    /// concurrently.
    ///
    /// # Errors
    ///
    /// Only the fatal [`BoardError::InvariantViolation`].
    pub fn transform(&self, old: &CardValue, new: &CardValue) -> BoardResult<usize> {
        self.transform_locks.with_pair(old, new, || {
            let mut state = self.state.lock();
            let positions = state.positions_with_value(old);
            let count = rewrite(&mut state, &positions, old, new)?;
            state.verify()?;
            if count > 0 && old != new {
                self.notifier.record_change();
            }
            debug!(%old, %new, count, "transform applied");
            Ok(count)
        })
    }

    /// Replaces every card value `v` on the board with `f(v)`,
    /// preserving pairwise consistency, and returns the number of
    /// rewritten cells.
    ///
    /// Positions are snapshotted per value before any rewrite, so a
    /// value mapped onto another value already present is not
    /// transformed twice.
    pub fn map_values<F>(&self, f: F) -> BoardResult<usize>
    where
        F: Fn(&CardValue) -> CardValue,
    {
        let snapshot = self.state.lock().value_positions();
        let mut total = 0;
        for (old, positions) in snapshot {
            let new = f(&old);
            total += self.transform_locks.with_pair(&old, &new, || {
                let mut state = self.state.lock();
                let count = rewrite(&mut state, &positions, &old, &new)?;
                state.verify()?;
                if count > 0 && old != new {
                    self.notifier.record_change();
                }
                Ok::<usize, BoardError>(count)
            })?;
        }
        Ok(total)
    }

    /// A consistent snapshot of the board from `player`'s perspective,
    /// taken under a brief lock.
    #[must_use]
    pub fn look(&self, player: &PlayerId) -> BoardView {
        let state = self.state.lock();
        let cells = state
            .iter()
            .map(|(_, cell)| match cell {
                Cell::Empty => CellView::Gone,
                Cell::FaceDown(_) => CellView::Down,
                Cell::FaceUp { value, controller } => {
                    if controller.as_ref() == Some(player) {
                        CellView::Mine(value.clone())
                    } else {
                        CellView::Up(value.clone())
                    }
                }
            })
            .collect();
        BoardView::new(self.rows, self.cols, cells)
    }

    /// The current change counter. Pair with [`Board::watch_since`] to
    /// observe every change after a [`Board::look`].
    #[must_use]
    pub fn version(&self) -> u64 {
        self.notifier.version()
    }

    /// Suspends until the next qualifying change after this call, then
    /// returns the new change counter.
    ///
    /// Face, value, and existence changes qualify; control-only changes
    /// do not.
    pub fn watch(&self) -> u64 {
        self.notifier.wait_past(self.notifier.version())
    }

    /// Suspends until the change counter differs from `seen`; returns
    /// immediately if it already does.
    pub fn watch_since(&self, seen: u64) -> u64 {
        self.notifier.wait_past(seen)
    }

    /// Like [`Board::watch_since`], but gives up at `deadline`,
    /// returning `None` if nothing changed.
    pub fn watch_until(&self, seen: u64, deadline: Instant) -> Option<u64> {
        self.notifier.wait_past_until(seen, deadline)
    }

    /// Re-validates the store-wide representation invariant.
    ///
    /// Every mutating operation re-validates before returning; this
    /// entry point exists for tests and harnesses.
    ///
    /// # Errors
    ///
    /// The fatal [`BoardError::InvariantViolation`].
    pub fn verify(&self) -> BoardResult<()> {
        self.state.lock().verify()
    }
}

fn held_card_vanished(player: &PlayerId, pos: Position) -> BoardError {
    BoardError::invariant_violation(format!(
        "card at {pos} vanished while held by {player}"
    ))
}

fn rewrite(
    store: &mut CellStore,
    positions: &[Position],
    old: &CardValue,
    new: &CardValue,
) -> BoardResult<usize> {
    let mut count = 0;
    for &pos in positions {
        match store.get(pos)?.clone() {
            Cell::FaceDown(value) if value == *old => {
                store.set(pos, Cell::FaceDown(new.clone()))?;
                count += 1;
            }
            Cell::FaceUp { value, controller } if value == *old => {
                store.set(
                    pos,
                    Cell::FaceUp {
                        value: new.clone(),
                        controller,
                    },
                )?;
                count += 1;
            }
            // Removed or renamed since the snapshot.
            _ => {}
        }
    }
    Ok(count)
}

impl fmt::Debug for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Board")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .field("version", &self.notifier.version())
            .finish_non_exhaustive()
    }
}

/// Raw debug rendering: `---` empty, `???` face down, `[C]` held,
/// ` C ` face up uncontrolled.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        for row in 0..self.rows {
            for col in 0..self.cols {
                if col > 0 {
                    write!(f, " ")?;
                }
                match state
                    .get(Position::new(row, col))
                    .map_err(|_| fmt::Error)?
                {
                    Cell::Empty => write!(f, "---")?,
                    Cell::FaceDown(_) => write!(f, "???")?,
                    Cell::FaceUp {
                        value,
                        controller: Some(_),
                    } => write!(f, "[{value}]")?,
                    Cell::FaceUp {
                        value,
                        controller: None,
                    } => write!(f, " {value} ")?,
                }
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
