//! Property-based test generators using proptest.

use proptest::prelude::*;
use scramble_core::{CardValue, Layout, Position};

/// Strategy for short card values (letters and digits, no whitespace).
pub fn card_value_strategy() -> impl Strategy<Value = CardValue> {
    prop::string::string_regex("[A-Za-z0-9]{1,3}")
        .expect("valid regex")
        .prop_map(CardValue::new)
}

/// Strategy for small board dimensions.
pub fn dimensions_strategy() -> impl Strategy<Value = (usize, usize)> {
    (1..=4usize, 1..=4usize)
}

/// Strategy for layouts where every value appears an even number of
/// times: a set of values is doubled, shuffled, and cut into rows.
pub fn paired_layout_strategy() -> impl Strategy<Value = Layout> {
    prop::collection::vec(card_value_strategy(), 1..=6).prop_flat_map(|values| {
        let mut doubled = values.clone();
        doubled.extend(values);
        let total = doubled.len();
        let row_lengths: Vec<usize> = (1..=total).filter(|cols| total % cols == 0).collect();
        (Just(doubled).prop_shuffle(), prop::sample::select(row_lengths)).prop_map(
            |(cards, cols)| {
                cards
                    .chunks(cols)
                    .map(|chunk| chunk.iter().cloned().map(Some).collect())
                    .collect()
            },
        )
    })
}

/// Strategy for a sequence of `(player index, cell index)` moves; cell
/// indices are reduced modulo the board size by the consumer.
pub fn move_sequence_strategy(
    players: usize,
    len: usize,
) -> impl Strategy<Value = Vec<(usize, usize)>> {
    prop::collection::vec((0..players, 0..64usize), 1..=len)
}

/// Maps a flat cell index onto a position of a `rows` × `cols` grid.
#[must_use]
pub fn position_for(index: usize, rows: usize, cols: usize) -> Position {
    let index = index % (rows * cols);
    Position::new(index / cols, index % cols)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scramble_core::{Board, BoardError};
    use std::time::Instant;

    proptest! {
        #[test]
        fn paired_layouts_build_valid_boards(layout in paired_layout_strategy()) {
            let board = Board::from_layout(layout).unwrap();
            board.verify().unwrap();
        }

        #[test]
        fn random_flips_preserve_the_invariant(
            layout in paired_layout_strategy(),
            moves in move_sequence_strategy(3, 40),
        ) {
            let board = Board::from_layout(layout).unwrap();
            let players = crate::fixtures::players(3);
            let (rows, cols) = (board.rows(), board.cols());

            for (player, cell) in moves {
                let pos = position_for(cell, rows, cols);
                // An already-expired deadline turns rule 1-D blocks into
                // immediate cancellations on this single thread.
                match board.flip_until(&players[player], pos, Instant::now()) {
                    Ok(_)
                    | Err(BoardError::NoCardHere { .. })
                    | Err(BoardError::OpponentControlled { .. })
                    | Err(BoardError::Cancelled { .. }) => {}
                    Err(other) => prop_assert!(false, "unexpected error: {other}"),
                }
                board.verify().unwrap();
            }
        }

        #[test]
        fn generated_board_files_parse_back(layout in paired_layout_strategy()) {
            let rows = layout.len();
            let cols = layout[0].len();
            let mut text = format!("{rows}x{cols}\n");
            for row in &layout {
                for card in row.iter().flatten() {
                    text.push_str(card.as_str());
                    text.push('\n');
                }
            }
            let parsed = scramble_format::parse_board(&text).unwrap();
            prop_assert_eq!(parsed, layout);
        }

        #[test]
        fn transform_preserves_card_count(
            layout in paired_layout_strategy(),
            target in card_value_strategy(),
        ) {
            let board = Board::from_layout(layout.clone()).unwrap();
            let source = layout[0][0].clone().unwrap();
            let expected = layout
                .iter()
                .flatten()
                .filter(|cell| cell.as_ref() == Some(&source))
                .count();

            let count = board.transform(&source, &target).unwrap();
            if source == target {
                prop_assert_eq!(count, expected);
            } else {
                prop_assert_eq!(count, expected);
                prop_assert_eq!(board.transform(&source, &target).unwrap(), 0);
            }
            board.verify().unwrap();
        }
    }
}
