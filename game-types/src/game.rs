use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{GameId, PlayerId};

/// Leader name stored while the two scores are level.
pub const NO_LEADER: &str = "None";

/// Number of participants every game has once both players joined.
pub const PLAYERS_PER_GAME: usize = 2;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PlayerScore {
    pub player_id: PlayerId,
    pub player_name: String, // Snapshot taken when the player joined
    pub score: i32,
    pub last_puzzle_id: i64,
    pub seat: i16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Game {
    pub id: GameId,
    pub name: String,
    pub created_by: PlayerId,
    pub players: Vec<PlayerScore>,
    pub leader_name: String,
    pub total_score_margin: i32,
    pub revision: i32,
    pub created_at: String, // ISO 8601 string
}

impl Game {
    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.players.iter().any(|p| p.player_id == player_id)
    }

    pub fn score_of(&self, player_id: PlayerId) -> Option<&PlayerScore> {
        self.players.iter().find(|p| p.player_id == player_id)
    }

    pub fn summary(&self) -> GameSummary {
        GameSummary {
            id: self.id,
            name: self.name.clone(),
        }
    }

    pub fn standing(&self) -> GameStanding {
        GameStanding {
            game_id: self.id,
            name: self.name.clone(),
            leader_name: self.leader_name.clone(),
            margin: self.total_score_margin,
            players: self.players.clone(),
        }
    }
}

/// Lightweight reference to a game, used for "reuse an existing game" lists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameSummary {
    pub id: GameId,
    pub name: String,
}

/// Leader and margin of a single game as presented to a player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GameStanding {
    pub game_id: GameId,
    pub name: String,
    pub leader_name: String,
    pub margin: i32,
    pub players: Vec<PlayerScore>,
}

impl GameStanding {
    pub fn has_leader(&self) -> bool {
        self.leader_name != NO_LEADER && self.margin > 0
    }
}
