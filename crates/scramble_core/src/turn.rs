//! Per-player turn state.

use crate::types::Position;

/// Where a player stands in the flip protocol.
///
/// The deferred-cleanup rule makes this an explicit state machine rather
/// than something inferred from cell ownership: a `Resolved` pair stays
/// on the board — matched or mismatched — until the owning player's next
/// flip call resolves it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TurnState {
    /// The player holds nothing from an in-progress turn.
    #[default]
    Idle,
    /// The player has flipped one card and controls it.
    HoldingOne(Position),
    /// The player finished a turn; the pair awaits lazy cleanup at the
    /// start of their next flip.
    Resolved {
        /// First card of the finished turn.
        first: Position,
        /// Second card of the finished turn.
        second: Position,
    },
}

impl TurnState {
    /// True if `pos` belongs to this turn.
    #[must_use]
    pub fn holds(&self, pos: Position) -> bool {
        match *self {
            TurnState::Idle => false,
            TurnState::HoldingOne(p) => p == pos,
            TurnState::Resolved { first, second } => first == pos || second == pos,
        }
    }

    /// Number of positions held (0, 1, or 2).
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            TurnState::Idle => 0,
            TurnState::HoldingOne(_) => 1,
            TurnState::Resolved { .. } => 2,
        }
    }

    /// True if the player holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        matches!(self, TurnState::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_holds_nothing() {
        assert!(TurnState::Idle.is_empty());
        assert_eq!(TurnState::Idle.len(), 0);
        assert!(!TurnState::Idle.holds(Position::new(0, 0)));
    }

    #[test]
    fn holding_one_tracks_its_position() {
        let state = TurnState::HoldingOne(Position::new(1, 2));
        assert_eq!(state.len(), 1);
        assert!(state.holds(Position::new(1, 2)));
        assert!(!state.holds(Position::new(2, 1)));
    }

    #[test]
    fn resolved_holds_both() {
        let state = TurnState::Resolved {
            first: Position::new(0, 0),
            second: Position::new(0, 1),
        };
        assert_eq!(state.len(), 2);
        assert!(state.holds(Position::new(0, 0)));
        assert!(state.holds(Position::new(0, 1)));
    }
}
