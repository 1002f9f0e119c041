use game_types::{NO_LEADER, PlayerScore};

/// Derived leader fields of a game.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standings {
    pub leader_name: String,
    pub margin: i32,
}

impl Standings {
    pub fn level() -> Self {
        Self {
            leader_name: NO_LEADER.to_string(),
            margin: 0,
        }
    }
}

/// Rank the players of a game by score and derive leader and margin.
/// Level scores have no leader. A lone player (a game still waiting for its
/// second participant) is measured against zero.
pub fn compute_standings(players: &[PlayerScore]) -> Standings {
    let mut ranked: Vec<&PlayerScore> = players.iter().collect();
    ranked.sort_by(|a, b| b.score.cmp(&a.score).then(a.seat.cmp(&b.seat)));

    match ranked.as_slice() {
        [first, second, ..] if first.score > second.score => Standings {
            leader_name: first.player_name.clone(),
            margin: first.score - second.score,
        },
        [only] if only.score > 0 => Standings {
            leader_name: only.player_name.clone(),
            margin: only.score,
        },
        _ => Standings::level(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn score(name: &str, seat: i16, points: i32) -> PlayerScore {
        PlayerScore {
            player_id: seat as i64 + 1,
            player_name: name.to_string(),
            score: points,
            last_puzzle_id: 0,
            seat,
        }
    }

    #[test]
    fn test_leader_is_higher_scorer() {
        let standings = compute_standings(&[score("Alice", 0, 5), score("Bob", 1, 3)]);
        assert_eq!(standings.leader_name, "Alice");
        assert_eq!(standings.margin, 2);

        let standings = compute_standings(&[score("Alice", 0, 4), score("Bob", 1, 10)]);
        assert_eq!(standings.leader_name, "Bob");
        assert_eq!(standings.margin, 6);
    }

    #[test]
    fn test_level_scores_have_no_leader() {
        let standings = compute_standings(&[score("Alice", 0, 7), score("Bob", 1, 7)]);
        assert_eq!(standings, Standings::level());
        assert_eq!(standings.leader_name, NO_LEADER);

        assert_eq!(
            compute_standings(&[score("Alice", 0, 0), score("Bob", 1, 0)]),
            Standings::level()
        );
    }

    #[test]
    fn test_margin_is_absolute_difference() {
        for (a, b) in [(0, 6), (6, 0), (12, 5), (3, 3), (1, 2)] {
            let standings = compute_standings(&[score("A", 0, a), score("B", 1, b)]);
            assert_eq!(standings.margin, (a - b).abs());
            assert_eq!(standings.leader_name == NO_LEADER, a == b);
        }
    }

    #[test]
    fn test_lone_player() {
        let standings = compute_standings(&[score("Alice", 0, 4)]);
        assert_eq!(standings.leader_name, "Alice");
        assert_eq!(standings.margin, 4);

        assert_eq!(compute_standings(&[score("Alice", 0, 0)]), Standings::level());
        assert_eq!(compute_standings(&[]), Standings::level());
    }
}
