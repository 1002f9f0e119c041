#![allow(dead_code)]

use game_core::{PlayerStateTracker, ResultParser};
use game_types::{PlayerId, PlayerScore};

/// Builds the text the puzzle produces when sharing a result
pub fn shared_result(puzzle_id: u32, marker: &str) -> String {
    format!(
        "СЛОВКО {} {}/6\n\n⬜🟨⬜⬜⬜\n🟩🟩🟩🟩🟩\nhttps://slovko.zaxid.net/",
        puzzle_id, marker
    )
}

pub fn create_test_parser() -> ResultParser {
    ResultParser::default()
}

/// Creates a score entry with specified points
pub fn create_test_score(player_id: PlayerId, name: &str, seat: i16, points: i32) -> PlayerScore {
    PlayerScore {
        player_id,
        player_name: name.to_string(),
        score: points,
        last_puzzle_id: 0,
        seat,
    }
}

/// Creates a tracker with a player already waiting for a contact
pub fn create_tracker_awaiting_contact(player_id: PlayerId, game_name: &str) -> PlayerStateTracker {
    let tracker = PlayerStateTracker::new();
    tracker.transition_to_naming(player_id);
    tracker
        .set_game_name(player_id, game_name.to_string())
        .expect("player should be naming a game");
    tracker
}
