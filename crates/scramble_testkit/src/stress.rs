//! Concurrent stress harness for the board engine.
//!
//! Spawns player threads that sweep flip positions in interleaved
//! deterministic patterns, forcing contention on held cards, lazy
//! cleanups, and wait/wake cycles. Game failures are expected and
//! counted; engine failures abort the run.

use scramble_core::{Board, BoardError, FlipOutcome, PlayerId};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use crate::generators::position_for;

/// Configuration for a stress run.
#[derive(Debug, Clone)]
pub struct StressConfig {
    /// Number of concurrent player threads.
    pub players: usize,
    /// Flip calls issued per player.
    pub flips_per_player: usize,
    /// Budget for each rule 1-D wait before it is abandoned.
    pub wait_budget: Duration,
}

impl Default for StressConfig {
    fn default() -> Self {
        Self {
            players: 4,
            flips_per_player: 200,
            wait_budget: Duration::from_millis(50),
        }
    }
}

/// Aggregated outcome of a stress run.
#[derive(Debug, Clone, Default)]
pub struct StressOutcome {
    /// First cards successfully turned or claimed.
    pub turned_up: usize,
    /// Completed matching pairs.
    pub matched: usize,
    /// Completed non-matching pairs.
    pub mismatched: usize,
    /// Flips that hit an empty or removed position.
    pub no_card: usize,
    /// Second flips that hit a held card.
    pub opponent_controlled: usize,
    /// Waits abandoned after the budget expired.
    pub cancelled: usize,
    /// Wall-clock duration of the run.
    pub duration: Duration,
}

impl StressOutcome {
    /// Total flip calls accounted for.
    #[must_use]
    pub fn total(&self) -> usize {
        self.turned_up
            + self.matched
            + self.mismatched
            + self.no_card
            + self.opponent_controlled
            + self.cancelled
    }

    fn absorb(&mut self, other: &StressOutcome) {
        self.turned_up += other.turned_up;
        self.matched += other.matched;
        self.mismatched += other.mismatched;
        self.no_card += other.no_card;
        self.opponent_controlled += other.opponent_controlled;
        self.cancelled += other.cancelled;
    }
}

/// Runs `config.players` threads of deterministic contending flips
/// against `board` and returns the aggregated outcome.
///
/// # Panics
///
/// Panics on any [`BoardError::InvariantViolation`] or
/// [`BoardError::InvalidPosition`]: neither can occur unless the engine
/// (or this harness) is broken.
pub fn run_contending_flips(board: &Arc<Board>, config: &StressConfig) -> StressOutcome {
    let start = Instant::now();

    let handles: Vec<_> = (0..config.players)
        .map(|t| {
            let board = Arc::clone(board);
            let config = config.clone();
            thread::spawn(move || {
                let player = PlayerId::new(format!("stress-p{t}"));
                let mut local = StressOutcome::default();
                for i in 0..config.flips_per_player {
                    // Interleaved sweeps: distinct strides per thread keep
                    // every position contested sooner or later.
                    let pos = position_for(t + i * (t + 1), board.rows(), board.cols());
                    let deadline = Instant::now() + config.wait_budget;
                    match board.flip_until(&player, pos, deadline) {
                        Ok(FlipOutcome::TurnedUp(_)) => local.turned_up += 1,
                        Ok(FlipOutcome::Matched) => local.matched += 1,
                        Ok(FlipOutcome::Mismatched) => local.mismatched += 1,
                        Err(BoardError::NoCardHere { .. }) => local.no_card += 1,
                        Err(BoardError::OpponentControlled { .. }) => {
                            local.opponent_controlled += 1;
                        }
                        Err(BoardError::Cancelled { .. }) => local.cancelled += 1,
                        Err(fatal) => panic!("stress run hit engine failure: {fatal}"),
                    }
                }
                local
            })
        })
        .collect();

    let mut outcome = StressOutcome::default();
    for handle in handles {
        let local = handle.join().expect("stress player panicked");
        outcome.absorb(&local);
    }
    outcome.duration = start.elapsed();
    outcome
}
