//! Text rendering of player-perspective board snapshots.
//!
//! Output format, one line per cell in row-major order after the
//! `ROWSxCOLS` header: `none`, `down`, `up CARD`, or `my CARD`. The
//! rendered text always ends with a newline.

use scramble_core::{BoardView, CellView};
use std::fmt::Write;

/// Renders a [`BoardView`] into the board-state text format.
#[must_use]
pub fn render_view(view: &BoardView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}x{}", view.rows(), view.cols());
    for (_, cell) in view.iter() {
        let _ = match cell {
            CellView::Gone => writeln!(out, "none"),
            CellView::Down => writeln!(out, "down"),
            CellView::Up(value) => writeln!(out, "up {value}"),
            CellView::Mine(value) => writeln!(out, "my {value}"),
        };
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse::parse_board;
    use scramble_core::{Board, PlayerId, Position};

    #[test]
    fn renders_fresh_board_as_all_down() {
        let board = Board::from_layout(parse_board("2x2\nA\nB\nB\nA\n").unwrap()).unwrap();
        let view = board.look(&PlayerId::new("p1"));
        assert_eq!(render_view(&view), "2x2\ndown\ndown\ndown\ndown\n");
    }

    #[test]
    fn renders_every_spot_kind() {
        let board = Board::from_layout(parse_board("1x4\nA\nB\nA\nB\n").unwrap()).unwrap();
        let p1 = PlayerId::new("p1");
        let p2 = PlayerId::new("p2");

        // p1 mismatches A and B, leaving both face up; p2 then holds the A.
        board.flip(&p1, Position::new(0, 0)).unwrap();
        board.flip(&p1, Position::new(0, 1)).unwrap();
        board.flip(&p2, Position::new(0, 0)).unwrap();

        assert_eq!(
            render_view(&board.look(&p2)),
            "1x4\nmy A\nup B\ndown\ndown\n"
        );
        assert_eq!(
            render_view(&board.look(&p1)),
            "1x4\nup A\nup B\ndown\ndown\n"
        );
    }

    #[test]
    fn renders_removed_cards_as_none() {
        let board = Board::from_layout(parse_board("1x4\nA\nA\nB\nB\n").unwrap()).unwrap();
        let p = PlayerId::new("p1");
        board.flip(&p, Position::new(0, 0)).unwrap();
        board.flip(&p, Position::new(0, 1)).unwrap();
        board.flip(&p, Position::new(0, 2)).unwrap(); // cleanup removes the pair

        assert_eq!(
            render_view(&board.look(&p)),
            "1x4\nnone\nnone\nmy B\ndown\n"
        );
    }
}
