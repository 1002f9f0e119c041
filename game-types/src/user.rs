use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{GameId, PlayerId};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Player {
    pub id: PlayerId,
    pub name: String,
    pub games: Vec<GameId>,
    pub created_at: String, // ISO 8601 string
}

impl Player {
    pub fn has_games(&self) -> bool {
        !self.games.is_empty()
    }
}
