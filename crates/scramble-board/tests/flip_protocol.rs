use scramble_board::Board;
use std::sync::Arc;
use std::time::Duration;

/// End-to-end replay of a full turn cycle across two players: a first flip
/// never blocks a concurrent player working a different cell, a second flip
/// resolves a match, and that match is only removed once the matching
/// player starts their next turn elsewhere (spec.md §8's scenario).
#[tokio::test]
async fn full_turn_cycle_across_players() {
    let board = Board::new(2, 2, vec!["A".into(), "B".into(), "B".into(), "A".into()]).unwrap();

    let first = board.flip("alice", (0, 0)).await.unwrap();
    assert!(first.contains("my A"));

    // bob can flip an untouched position concurrently with alice's open turn
    let bob = board.flip("bob", (0, 1)).await.unwrap();
    assert!(bob.contains("my B"));

    // alice completes her turn with a match against her own first card
    let second = board.flip("alice", (1, 1)).await.unwrap();
    assert!(second.contains("my A"));

    // alice's match is resolved but not yet removed; her next first-flip
    // elsewhere triggers cleanup, removing the matched pair (0,0) and (1,1)
    board.flip("alice", (1, 0)).await.unwrap();

    let snapshot = board.look("carol").await;
    assert_eq!(snapshot.matches("none").count(), 2);
}

/// A blocked `watch` call returns as soon as any state-changing operation
/// runs, even one issued by a different player than the one being watched.
/// The returned snapshot always uses a sentinel viewer (spec.md §4.3.7), so
/// even the flipping player's own card never renders as `my`.
#[tokio::test]
async fn watch_unblocks_on_any_change() {
    let board = Arc::new(Board::new(1, 2, vec!["A".into(), "B".into()]).unwrap());

    let watcher_board = Arc::clone(&board);
    let watcher = tokio::spawn(async move { watcher_board.watch("someone").await });

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!watcher.is_finished());

    board.flip("someone", (0, 0)).await.unwrap();

    let snapshot = tokio::time::timeout(Duration::from_millis(200), watcher)
        .await
        .expect("watch should unblock after any flip")
        .unwrap();
    assert!(snapshot.contains("up A"));
    assert!(!snapshot.contains("my"));
}

/// A watcher must wake even when the flip that mutated the board ultimately
/// fails: rule-3A cleanup can remove a matched pair *before* the requested
/// position is found to be already removed, so the call both mutates state
/// and returns an error. `version` must still advance (spec.md §5/§8.1/P5).
#[tokio::test]
async fn watch_wakes_when_cleanup_mutates_state_even_though_the_flip_itself_fails() {
    let board = Arc::new(
        Board::new(1, 6, vec!["A".into(), "A".into(), "B".into(), "B".into(), "C".into(), "C".into()]).unwrap(),
    );

    board.flip("p1", (0, 0)).await.unwrap();
    board.flip("p1", (0, 1)).await.unwrap(); // match A
    board.flip("p1", (0, 2)).await.unwrap(); // cleanup removes (0,0)/(0,1); p1 now holds (0,2)
    board.flip("p1", (0, 3)).await.unwrap(); // match B; p1 now holds matched (0,2)/(0,3)

    let watcher_board = Arc::clone(&board);
    let watcher = tokio::spawn(async move { watcher_board.watch("observer").await });
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(!watcher.is_finished());

    // p1's next first-flip targets the already-removed (0,0). Rule-3A
    // cleanup removes the matched (0,2)/(0,3) pair first, then the call
    // fails because (0,0) itself is removed.
    let err = board.flip("p1", (0, 0)).await.unwrap_err();
    assert!(matches!(err, scramble_core::GameError::FlipError(_)));

    let snapshot = tokio::time::timeout(Duration::from_millis(200), watcher)
        .await
        .expect("watch must wake: cleanup mutated state even though the flip itself failed")
        .unwrap();
    assert!(snapshot.matches("none").count() >= 4);
}

/// Two players racing to flip the same never-relinquished card: exactly one
/// wins control, and the other blocks (no third party ever frees the card in
/// this test, so its flip stays pending rather than erroring).
#[tokio::test]
async fn concurrent_flips_on_same_position_serialize() {
    let board = Arc::new(Board::new(1, 1, vec!["A".into()]).unwrap());

    let b1 = Arc::clone(&board);
    let b2 = Arc::clone(&board);
    let h1 = tokio::spawn(async move { b1.flip("p1", (0, 0)).await });
    let h2 = tokio::spawn(async move { b2.flip("p2", (0, 0)).await });

    tokio::time::sleep(Duration::from_millis(50)).await;
    let finished = [h1.is_finished(), h2.is_finished()];
    assert_eq!(
        finished.iter().filter(|f| **f).count(),
        1,
        "exactly one racer should win control of the only card, the other stays blocked"
    );
    h1.abort();
    h2.abort();
}

/// A transform that collapses two distinct labels into the same new label
/// merges their match groups rather than erroring (spec.md §4.3.6 only
/// requires new labels to be non-empty and whitespace-free).
#[tokio::test]
async fn map_merges_groups_that_collapse_to_the_same_label() {
    let board = Board::new(1, 4, vec!["A".into(), "B".into(), "C".into(), "A".into()]).unwrap();

    board
        .map(|label| async move {
            match label.as_str() {
                "A" | "B" => "X".to_string(),
                other => other.to_string(),
            }
        })
        .await
        .unwrap();

    // (0,0) was "A", (0,1) was "B"; both are now "X" and therefore match.
    board.flip("p1", (0, 0)).await.unwrap();
    let second = board.flip("p1", (0, 1)).await.unwrap();
    assert!(second.contains("my X"));
}
