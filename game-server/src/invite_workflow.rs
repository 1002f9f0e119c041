use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::errors::{EngineError, bounded};
use game_core::{ConversationPhase, PlayerStateTracker};
use game_persistence::{GameRepository, JoinOutcome, PlayerRepository};
use game_types::{Game, GameId, GameSummary, Invitation, Player, PlayerId};

/// Notice for the inviter after the counterpart declined.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    pub inviter_id: PlayerId,
    pub counterpart_name: String,
}

/// Turns one player's intent into a two-player game: naming, picking a
/// counterpart, and accepting or rejecting the invitation.
pub struct InviteWorkflow {
    tracker: Arc<PlayerStateTracker>,
    players: PlayerRepository,
    games: GameRepository,
    timeout: Duration,
    max_game_name_length: usize,
}

impl InviteWorkflow {
    pub fn new(
        tracker: Arc<PlayerStateTracker>,
        players: PlayerRepository,
        games: GameRepository,
        timeout: Duration,
        max_game_name_length: usize,
    ) -> Self {
        Self {
            tracker,
            players,
            games,
            timeout,
            max_game_name_length,
        }
    }

    pub fn tracker(&self) -> &PlayerStateTracker {
        &self.tracker
    }

    /// First contact. Creates the player record if missing and resets any
    /// dialogue in progress.
    pub async fn register(&self, player_id: PlayerId, display_name: &str) -> Result<Player, EngineError> {
        let display_name = display_name.trim();
        let (player, created) = bounded(
            self.timeout,
            "register player",
            self.players.register(player_id, display_name),
        )
        .await?;

        self.tracker.forget(player_id);
        self.tracker.get(player_id);

        if created {
            info!("Registered player {} ({})", player_id, player.name);
        }
        Ok(player)
    }

    /// Start creating a game. Returns the player's existing games so one of
    /// them can be reused instead of naming a new one.
    pub async fn propose_game(&self, player_id: PlayerId) -> Result<Vec<GameSummary>, EngineError> {
        self.require_player(player_id).await?;
        let existing = self.player_games(player_id).await?;

        self.tracker.transition_to_naming(player_id);
        info!(
            "Player {} is naming a game ({} existing)",
            player_id,
            existing.len()
        );
        Ok(existing)
    }

    pub async fn player_games(&self, player_id: PlayerId) -> Result<Vec<GameSummary>, EngineError> {
        bounded(
            self.timeout,
            "list player games",
            self.games.summaries_for_player(player_id),
        )
        .await
    }

    pub fn name_game(&self, player_id: PlayerId, text: &str) -> Result<String, EngineError> {
        let phase = self
            .tracker
            .peek(player_id)
            .map(|state| state.phase)
            .unwrap_or_default();
        if phase != ConversationPhase::AwaitingGameName {
            return Err(EngineError::InvalidState {
                player_id,
                expected: ConversationPhase::AwaitingGameName.label(),
                actual: phase.label(),
            });
        }

        let game_name = self.validate_game_name(text)?;
        self.tracker.set_game_name(player_id, game_name.clone())?;
        Ok(game_name)
    }

    /// Pick one of the player's existing games instead of naming a new one
    pub async fn reuse_game(&self, player_id: PlayerId, game_id: GameId) -> Result<String, EngineError> {
        let game = bounded(
            self.timeout,
            "load game",
            self.games.find_for_player(player_id, game_id),
        )
        .await?
        .ok_or(EngineError::GameNotFound(game_id))?;

        self.tracker.set_game_name(player_id, game.name.clone())?;
        Ok(game.name)
    }

    /// The inviter named the player to challenge. Produces the invitation
    /// for the transport to deliver and ends the inviter's dialogue.
    pub async fn designate_counterpart(
        &self,
        inviter_id: PlayerId,
        counterpart_id: PlayerId,
    ) -> Result<Invitation, EngineError> {
        let game_name = self.tracker.pending_game_name(inviter_id)?;

        if inviter_id == counterpart_id {
            return Err(EngineError::CannotInviteSelf);
        }

        let inviter = self.require_player(inviter_id).await?;
        let counterpart_known = bounded(
            self.timeout,
            "look up counterpart",
            self.players.exists(counterpart_id),
        )
        .await?;
        if !counterpart_known {
            // Stay in AwaitingContact so another contact can be supplied
            return Err(EngineError::UnknownCounterpart(counterpart_id));
        }

        if !self.tracker.complete_invitation(inviter_id, &game_name) {
            let actual = self.tracker.get(inviter_id).phase.label();
            warn!(
                "Player {} changed dialogue while inviting {}",
                inviter_id, counterpart_id
            );
            return Err(EngineError::InvalidState {
                player_id: inviter_id,
                expected: "AwaitingContact",
                actual,
            });
        }

        info!(
            "Player {} invited {} to game {}",
            inviter_id, counterpart_id, game_name
        );
        Ok(Invitation::new(
            inviter_id,
            inviter.name,
            counterpart_id,
            game_name,
        ))
    }

    /// The counterpart accepted. Creates the game, joins an existing one, or
    /// does nothing when both players are already in it.
    pub async fn accept(
        &self,
        counterpart_id: PlayerId,
        inviter_id: PlayerId,
        game_name: &str,
    ) -> Result<Game, EngineError> {
        if counterpart_id == inviter_id {
            return Err(EngineError::CannotInviteSelf);
        }
        let game_name = self.validate_game_name(game_name)?;

        let inviter = self.require_player(inviter_id).await?;
        let counterpart = self.require_player(counterpart_id).await?;

        let outcome = bounded(
            self.timeout,
            "accept invitation",
            self.games.join_or_create(&inviter, &counterpart, &game_name),
        )
        .await?;

        match outcome {
            JoinOutcome::Full(game) => Err(EngineError::GameFull {
                game_name: game.name,
            }),
            JoinOutcome::Created(game)
            | JoinOutcome::Joined(game)
            | JoinOutcome::AlreadyJoined(game) => Ok(game),
        }
    }

    pub async fn reject(
        &self,
        counterpart_id: PlayerId,
        inviter_id: PlayerId,
    ) -> Result<Rejection, EngineError> {
        let counterpart = self.require_player(counterpart_id).await?;
        info!("Player {} declined invitation from {}", counterpart_id, inviter_id);

        Ok(Rejection {
            inviter_id,
            counterpart_name: counterpart.name,
        })
    }

    async fn require_player(&self, player_id: PlayerId) -> Result<Player, EngineError> {
        bounded(self.timeout, "look up player", self.players.find_by_id(player_id))
            .await?
            .ok_or(EngineError::PlayerUnknown(player_id))
    }

    fn validate_game_name(&self, text: &str) -> Result<String, EngineError> {
        let name = text.trim();
        if name.is_empty() {
            return Err(EngineError::InvalidGameName {
                reason: "name is empty".to_string(),
            });
        }
        if name.chars().count() > self.max_game_name_length {
            return Err(EngineError::InvalidGameName {
                reason: format!("longer than {} characters", self.max_game_name_length),
            });
        }
        Ok(name.to_string())
    }
}
