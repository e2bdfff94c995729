//! Canonical boards and players for tests.

use scramble_core::{Board, CardValue, Layout, PlayerId};

/// The three-pair scenario layout:
///
/// ```text
/// A A B
/// B C C
/// . . .
/// ```
///
/// The bottom row starts (and stays) empty.
#[must_use]
pub fn scenario_layout() -> Layout {
    let v = |text: &str| Some(CardValue::new(text));
    vec![
        vec![v("A"), v("A"), v("B")],
        vec![v("B"), v("C"), v("C")],
        vec![None, None, None],
    ]
}

/// A board built from [`scenario_layout`].
#[must_use]
pub fn scenario_board() -> Board {
    Board::from_layout(scenario_layout()).expect("scenario layout is valid")
}

/// A 2×3 board whose A and B pairs are split across rows:
///
/// ```text
/// A B A
/// B C C
/// ```
#[must_use]
pub fn split_pairs_board() -> Board {
    let v = |text: &str| Some(CardValue::new(text));
    Board::from_layout(vec![
        vec![v("A"), v("B"), v("A")],
        vec![v("B"), v("C"), v("C")],
    ])
    .expect("split-pairs layout is valid")
}

/// A rows×cols board where every card carries the same value.
#[must_use]
pub fn uniform_board(rows: usize, cols: usize, value: &str) -> Board {
    let layout = vec![vec![Some(CardValue::new(value)); cols]; rows];
    Board::from_layout(layout).expect("uniform layout is valid")
}

/// Players `p0` through `p{n-1}`.
#[must_use]
pub fn players(n: usize) -> Vec<PlayerId> {
    (0..n).map(|i| PlayerId::new(format!("p{i}"))).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scramble_core::{CellView, Position};

    #[test]
    fn scenario_board_has_empty_bottom_row() {
        let board = scenario_board();
        let view = board.look(&PlayerId::new("p0"));
        for col in 0..3 {
            assert_eq!(view.get(Position::new(2, col)), Some(&CellView::Gone));
        }
    }

    #[test]
    fn uniform_board_matches_any_two_cards() {
        let board = uniform_board(2, 2, "X");
        let p = PlayerId::new("p0");
        board.flip(&p, Position::new(0, 0)).unwrap();
        let outcome = board.flip(&p, Position::new(1, 1)).unwrap();
        assert_eq!(outcome, scramble_core::FlipOutcome::Matched);
    }

    #[test]
    fn players_are_distinct() {
        let ps = players(3);
        assert_eq!(ps.len(), 3);
        assert_ne!(ps[0], ps[1]);
    }
}
