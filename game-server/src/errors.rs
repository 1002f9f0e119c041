use std::future::Future;
use std::time::Duration;
use tracing::error;

use game_core::ConversationError;
use game_types::{CallbackError, FailureKind, GameId, PlayerId};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EngineError {
    #[error("Player {player_id} is in phase {actual}, expected {expected}")]
    InvalidState {
        player_id: PlayerId,
        expected: &'static str,
        actual: &'static str,
    },
    #[error("Invalid game name: {reason}")]
    InvalidGameName { reason: String },
    #[error("Player {0} has never contacted the bot")]
    UnknownCounterpart(PlayerId),
    #[error("Players cannot invite themselves")]
    CannotInviteSelf,
    #[error("Player {0} is not registered")]
    PlayerUnknown(PlayerId),
    #[error("Game {0} not found")]
    GameNotFound(GameId),
    #[error("Game {game_name} already has two players")]
    GameFull { game_name: String },
    #[error("No active games")]
    NoActiveGames,
    #[error("Invalid callback: {0}")]
    InvalidCallback(#[from] CallbackError),
    #[error("Persistence failure: {0}")]
    PersistenceFailure(String),
}

impl EngineError {
    pub fn kind(&self) -> FailureKind {
        match self {
            EngineError::InvalidState { .. } => FailureKind::InvalidState,
            EngineError::InvalidGameName { .. } => FailureKind::InvalidGameName,
            EngineError::UnknownCounterpart(_) => FailureKind::UnknownCounterpart,
            EngineError::CannotInviteSelf => FailureKind::CannotInviteSelf,
            EngineError::PlayerUnknown(_) => FailureKind::PlayerUnknown,
            EngineError::GameNotFound(_) => FailureKind::GameNotFound,
            EngineError::GameFull { .. } => FailureKind::GameFull,
            EngineError::NoActiveGames => FailureKind::NoActiveGames,
            EngineError::InvalidCallback(_) => FailureKind::InvalidCallback,
            EngineError::PersistenceFailure(_) => FailureKind::PersistenceFailure,
        }
    }
}

impl From<ConversationError> for EngineError {
    fn from(err: ConversationError) -> Self {
        match err {
            ConversationError::InvalidState {
                player_id,
                expected,
                actual,
            } => EngineError::InvalidState {
                player_id,
                expected,
                actual,
            },
        }
    }
}

/// Run one persistence round trip under `timeout`. Failures are logged here
/// and never retried.
pub async fn bounded<T, F>(
    timeout: Duration,
    operation: &'static str,
    round_trip: F,
) -> Result<T, EngineError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    match tokio::time::timeout(timeout, round_trip).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => {
            error!("{} failed: {:#}", operation, e);
            Err(EngineError::PersistenceFailure(format!("{} failed", operation)))
        }
        Err(_) => {
            error!("{} timed out after {:?}", operation, timeout);
            Err(EngineError::PersistenceFailure(format!(
                "{} timed out",
                operation
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bounded_passes_value_through() {
        let value = bounded(Duration::from_secs(1), "lookup", async { Ok::<_, anyhow::Error>(7) })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test]
    async fn test_bounded_maps_errors() {
        let result: Result<(), _> = bounded(Duration::from_secs(1), "lookup", async {
            Err::<(), _>(anyhow::anyhow!("disk on fire"))
        })
        .await;

        let err = result.unwrap_err();
        assert_eq!(err.kind(), FailureKind::PersistenceFailure);
        assert!(!err.to_string().contains("disk on fire"));
    }

    #[tokio::test]
    async fn test_bounded_times_out() {
        let result: Result<(), _> = bounded(Duration::from_millis(10), "lookup", async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, anyhow::Error>(())
        })
        .await;

        assert_eq!(
            result.unwrap_err(),
            EngineError::PersistenceFailure("lookup timed out".to_string())
        );
    }

    #[test]
    fn test_conversation_errors_become_invalid_state() {
        let err: EngineError = ConversationError::InvalidState {
            player_id: 1,
            expected: "AwaitingGameName",
            actual: "Idle",
        }
        .into();

        assert_eq!(err.kind(), FailureKind::InvalidState);
    }
}
