//! Cross-thread behavior of the board: blocking flips, wakeups, watch,
//! and transform consistency under interleaving.

use scramble_core::{Board, BoardError, CardValue, CellView, FlipOutcome, PlayerId, Position};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

fn value(text: &str) -> CardValue {
    CardValue::new(text)
}

fn pos(row: usize, col: usize) -> Position {
    Position::new(row, col)
}

/// `A B A / B C C`: one split A pair, one split B pair, one C pair.
fn mixed_board() -> Arc<Board> {
    Arc::new(
        Board::from_layout(vec![
            vec![Some(value("A")), Some(value("B")), Some(value("A"))],
            vec![Some(value("B")), Some(value("C")), Some(value("C"))],
        ])
        .unwrap(),
    )
}

#[test]
fn blocked_flip_suspends_then_succeeds_after_release() {
    let board = mixed_board();
    let p1 = PlayerId::new("p1");
    let p2 = PlayerId::new("p2");

    board.flip(&p1, pos(0, 0)).unwrap(); // p1 holds the A at (0,0)

    let (tx, rx) = mpsc::channel();
    let waiter = {
        let board = Arc::clone(&board);
        let p2 = p2.clone();
        thread::spawn(move || {
            let outcome = board.flip(&p2, pos(0, 0));
            tx.send(()).unwrap();
            outcome
        })
    };

    // The contested flip must suspend, not fail fast.
    assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());

    // p1 mismatches elsewhere: control of (0,0) is dropped, waking p2.
    assert_eq!(board.flip(&p1, pos(0, 1)).unwrap(), FlipOutcome::Mismatched);

    rx.recv_timeout(Duration::from_secs(2))
        .expect("waiter should wake after release");
    let outcome = waiter.join().unwrap().unwrap();
    assert_eq!(outcome, FlipOutcome::TurnedUp(value("A")));
    assert_eq!(
        board.look(&p2).get(pos(0, 0)),
        Some(&CellView::Mine(value("A")))
    );
}

#[test]
fn removal_wakes_waiters_into_no_card_failure() {
    let board = Arc::new(
        Board::from_layout(vec![
            vec![Some(value("A")), Some(value("A")), Some(value("B"))],
            vec![Some(value("B")), Some(value("C")), Some(value("C"))],
        ])
        .unwrap(),
    );
    let p1 = PlayerId::new("p1");

    board.flip(&p1, pos(0, 0)).unwrap();
    assert_eq!(board.flip(&p1, pos(0, 1)).unwrap(), FlipOutcome::Matched);

    // Two players pile onto the held (0,0).
    let waiters: Vec<_> = ["p2", "p3"]
        .into_iter()
        .map(|name| {
            let board = Arc::clone(&board);
            let player = PlayerId::new(name);
            thread::spawn(move || board.flip(&player, pos(0, 0)))
        })
        .collect();

    thread::sleep(Duration::from_millis(50));

    // p1's next flip removes the matched pair; both waiters must wake
    // and fail, whether they were suspended yet or not.
    board.flip(&p1, pos(1, 0)).unwrap();

    for waiter in waiters {
        let result = waiter.join().unwrap();
        assert!(matches!(result, Err(BoardError::NoCardHere { .. })));
    }
}

#[test]
fn cancelled_wait_mutates_nothing() {
    let board = mixed_board();
    let p1 = PlayerId::new("p1");
    let p2 = PlayerId::new("p2");

    board.flip(&p1, pos(0, 0)).unwrap();
    let before = board.look(&p1);

    let deadline = Instant::now() + Duration::from_millis(50);
    let result = board.flip_until(&p2, pos(0, 0), deadline);
    assert!(matches!(result, Err(BoardError::Cancelled { .. })));

    // Board unchanged; p2 is free to act normally elsewhere.
    assert_eq!(board.look(&p1), before);
    assert_eq!(
        board.flip(&p2, pos(1, 1)).unwrap(),
        FlipOutcome::TurnedUp(value("C"))
    );
}

#[test]
fn watch_wakes_on_face_change() {
    let board = mixed_board();
    let p1 = PlayerId::new("p1");

    let seen = board.version();
    let watcher = {
        let board = Arc::clone(&board);
        thread::spawn(move || board.watch_since(seen))
    };

    thread::sleep(Duration::from_millis(50));
    board.flip(&p1, pos(0, 0)).unwrap(); // face down -> up

    let version = watcher.join().unwrap();
    assert!(version > seen);
}

#[test]
fn watch_ignores_control_only_changes() {
    let board = mixed_board();
    let p1 = PlayerId::new("p1");
    let p2 = PlayerId::new("p2");
    let p3 = PlayerId::new("p3");

    // Leave the A at (0,0) face up and uncontrolled, and give p3 a held
    // card for p2 to fail against.
    board.flip(&p1, pos(0, 0)).unwrap();
    board.flip(&p1, pos(0, 1)).unwrap(); // mismatch releases both
    board.flip(&p3, pos(1, 0)).unwrap();

    let seen = board.version();
    // p2 claims the face-up card: control only.
    board.flip(&p2, pos(0, 0)).unwrap();
    // A failed second flip onto p3's card releases (0,0): control only
    // again.
    assert!(matches!(
        board.flip(&p2, pos(1, 0)),
        Err(BoardError::OpponentControlled { .. })
    ));

    let deadline = Instant::now() + Duration::from_millis(100);
    assert_eq!(board.watch_until(seen, deadline), None);
}

#[test]
fn watch_since_returns_immediately_when_already_changed() {
    let board = mixed_board();
    let p1 = PlayerId::new("p1");

    let seen = board.version();
    board.flip(&p1, pos(0, 0)).unwrap();

    // No suspend: the counter already moved past `seen`.
    let start = Instant::now();
    let version = board.watch_since(seen);
    assert!(version > seen);
    assert!(start.elapsed() < Duration::from_millis(100));
}

#[test]
fn look_proceeds_while_cards_are_held() {
    let board = mixed_board();
    let p1 = PlayerId::new("p1");
    board.flip(&p1, pos(0, 0)).unwrap();

    let viewer = {
        let board = Arc::clone(&board);
        thread::spawn(move || board.look(&PlayerId::new("p2")))
    };
    let view = viewer.join().unwrap();
    assert_eq!(view.get(pos(0, 0)), Some(&CellView::Up(value("A"))));
}

#[test]
fn transform_keeps_pairs_matching_under_interleaving() {
    // One pair per player; a background storm renames every value in a
    // cycle. Each player must still see its pair match: observing one
    // card renamed while its partner is not would break that.
    const PAIRS: usize = 8;
    let layout = vec![(0..PAIRS * 2)
        .map(|i| Some(value(&format!("V{}", i / 2))))
        .collect::<Vec<_>>()];
    let board = Arc::new(Board::from_layout(layout).unwrap());

    let storm = {
        let board = Arc::clone(&board);
        thread::spawn(move || {
            for round in 0..50 {
                board
                    .map_values(|v| value(&format!("{}x{round}", v.as_str())))
                    .unwrap();
            }
        })
    };

    let players: Vec<_> = (0..PAIRS)
        .map(|i| {
            let board = Arc::clone(&board);
            thread::spawn(move || {
                let player = PlayerId::new(format!("p{i}"));
                let first = pos(0, i * 2);
                let second = pos(0, i * 2 + 1);
                board.flip(&player, first).unwrap();
                board.flip(&player, second).unwrap()
            })
        })
        .collect();

    for player in players {
        assert_eq!(player.join().unwrap(), FlipOutcome::Matched);
    }
    storm.join().unwrap();
}

#[test]
fn concurrent_players_on_disjoint_cards_all_succeed() {
    let board = mixed_board();
    let handles: Vec<_> = [("p1", pos(0, 0)), ("p2", pos(0, 1)), ("p3", pos(1, 1))]
        .into_iter()
        .map(|(name, target)| {
            let board = Arc::clone(&board);
            let player = PlayerId::new(name);
            thread::spawn(move || board.flip(&player, target))
        })
        .collect();

    for handle in handles {
        assert!(matches!(
            handle.join().unwrap(),
            Ok(FlipOutcome::TurnedUp(_))
        ));
    }
}
