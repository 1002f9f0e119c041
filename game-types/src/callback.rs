use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{CallbackError, GameId, PlayerId};

/// Payload attached to an inline button and echoed back by the transport
/// when the button is pressed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "t", rename_all = "snake_case")]
#[ts(export)]
pub enum CallbackAction {
    Accept { inviter_id: PlayerId, game_name: String },
    Reject { inviter_id: PlayerId },
    JoinGame { game_id: GameId },
    ShowScore { game_id: GameId },
}

impl CallbackAction {
    pub fn encode(&self) -> Result<String, CallbackError> {
        serde_json::to_string(self).map_err(|e| CallbackError::Malformed {
            data: e.to_string(),
        })
    }

    pub fn decode(data: &str) -> Result<Self, CallbackError> {
        let data = data.trim();
        if data.is_empty() {
            return Err(CallbackError::Empty);
        }

        serde_json::from_str(data).map_err(|_| CallbackError::Malformed {
            data: data.to_string(),
        })
    }
}
