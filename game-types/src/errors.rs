use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Failure categories reported back to the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum FailureKind {
    InvalidState,
    InvalidGameName,
    UnknownCounterpart,
    CannotInviteSelf,
    PlayerUnknown,
    GameNotFound,
    GameFull,
    NoActiveGames,
    InvalidCallback,
    PersistenceFailure,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, thiserror::Error)]
#[ts(export)]
pub enum CallbackError {
    #[error("malformed callback payload: {data}")]
    Malformed { data: String },
    #[error("empty callback payload")]
    Empty,
}
