mod common;

use common::*;
use game_core::{ConversationError, ConversationPhase, compute_standings};
use game_types::NO_LEADER;

#[test]
fn test_every_marker_maps_to_expected_score() {
    let parser = create_test_parser();
    let expected = [("1", 6), ("2", 5), ("3", 4), ("4", 3), ("5", 2), ("6", 1), ("X", 0)];

    for (marker, score) in expected {
        let result = parser.parse(&shared_result(300, marker)).unwrap();
        assert_eq!(result.puzzle_id, 300);
        assert_eq!(result.score, score, "marker {}", marker);
    }
}

#[test]
fn test_parsed_scores_drive_standings() {
    let parser = create_test_parser();
    let alice = parser.parse(&shared_result(10, "2")).unwrap();
    let bob = parser.parse(&shared_result(10, "4")).unwrap();

    let standings = compute_standings(&[
        create_test_score(1, "Alice", 0, alice.score as i32),
        create_test_score(2, "Bob", 1, bob.score as i32),
    ]);

    assert_eq!(standings.leader_name, "Alice");
    assert_eq!(standings.margin, 2);
}

#[test]
fn test_tie_after_equal_results() {
    let parser = create_test_parser();
    let result = parser.parse(&shared_result(11, "3")).unwrap();

    let standings = compute_standings(&[
        create_test_score(1, "Alice", 0, result.score as i32),
        create_test_score(2, "Bob", 1, result.score as i32),
    ]);

    assert_eq!(standings.leader_name, NO_LEADER);
    assert_eq!(standings.margin, 0);
}

#[test]
fn test_tracker_naming_from_idle_rejected() {
    let tracker = game_core::PlayerStateTracker::new();
    let result = tracker.set_game_name(1, "Бочки".to_string());
    assert!(matches!(result, Err(ConversationError::InvalidState { .. })));
    assert_eq!(tracker.get(1).phase, ConversationPhase::Idle);
}

#[test]
fn test_tracker_awaiting_contact_helper() {
    let tracker = create_tracker_awaiting_contact(4, "Вечірня");
    assert_eq!(
        tracker.get(4).phase,
        ConversationPhase::AwaitingContact {
            game_name: "Вечірня".to_string()
        }
    );
}
