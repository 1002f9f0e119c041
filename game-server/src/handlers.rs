use std::sync::Arc;
use tracing::{info, warn};

use crate::errors::EngineError;
use crate::invite_workflow::InviteWorkflow;
use crate::score_ledger::ScoreLedger;
use game_types::{CallbackAction, InboundEvent, InlineSuggestion, PlayerId, Reply};

/// Routes classified transport events to the invite workflow or the score
/// ledger and turns every outcome, including errors, into a `Reply`.
#[derive(Clone)]
pub struct EventHandler {
    invites: Arc<InviteWorkflow>,
    ledger: Arc<ScoreLedger>,
    score_keyword: String,
}

impl EventHandler {
    pub fn new(invites: Arc<InviteWorkflow>, ledger: Arc<ScoreLedger>, score_keyword: String) -> Self {
        Self {
            invites,
            ledger,
            score_keyword,
        }
    }

    pub async fn handle(&self, event: InboundEvent) -> Reply {
        let actor = event.actor();

        match self.dispatch(event).await {
            Ok(reply) => reply,
            Err(e) => Self::recover(actor, e),
        }
    }

    async fn dispatch(&self, event: InboundEvent) -> Result<Reply, EngineError> {
        match event {
            InboundEvent::Start {
                player_id,
                display_name,
            } => {
                let player = self.invites.register(player_id, &display_name).await?;
                Ok(Reply::Registered {
                    player_id: player.id,
                })
            }
            InboundEvent::GameProposalRequested { player_id } => {
                let existing_games = self.invites.propose_game(player_id).await?;
                Ok(Reply::GameProposal { existing_games })
            }
            InboundEvent::GameNameSupplied { player_id, text } => {
                let game_name = self.invites.name_game(player_id, &text)?;
                Ok(Reply::AwaitingContact { game_name })
            }
            InboundEvent::CounterpartDesignated {
                inviter_id,
                counterpart_id,
            } => {
                let invitation = self
                    .invites
                    .designate_counterpart(inviter_id, counterpart_id)
                    .await?;
                Ok(Reply::InvitationSent { invitation })
            }
            InboundEvent::InviteAccepted {
                counterpart_id,
                inviter_id,
                game_name,
            } => self.accept(counterpart_id, inviter_id, &game_name).await,
            InboundEvent::InviteRejected {
                counterpart_id,
                inviter_id,
            } => self.reject(counterpart_id, inviter_id).await,
            InboundEvent::CallbackQuery { player_id, data } => {
                let action = CallbackAction::decode(&data)?;
                self.handle_callback(player_id, action).await
            }
            InboundEvent::ResultTextReceived { player_id, text } => {
                match self.ledger.submit_text(player_id, &text).await? {
                    Some(outcome) => Ok(Reply::ScoreRecorded {
                        puzzle_id: outcome.puzzle_id,
                        score: outcome.score,
                        games_updated: outcome.games_updated,
                        standings: outcome.standings,
                    }),
                    None => Ok(Reply::NotAResult),
                }
            }
            InboundEvent::StandingsRequested { player_id } => {
                let standings = self.ledger.standings(player_id).await?;
                Ok(Reply::Standings { standings })
            }
            InboundEvent::InlineQuery { player_id, query } => {
                self.inline_suggestions(player_id, &query).await
            }
        }
    }

    async fn handle_callback(
        &self,
        player_id: PlayerId,
        action: CallbackAction,
    ) -> Result<Reply, EngineError> {
        match action {
            CallbackAction::Accept {
                inviter_id,
                game_name,
            } => self.accept(player_id, inviter_id, &game_name).await,
            CallbackAction::Reject { inviter_id } => self.reject(player_id, inviter_id).await,
            CallbackAction::JoinGame { game_id } => {
                let game_name = self.invites.reuse_game(player_id, game_id).await?;
                Ok(Reply::AwaitingContact { game_name })
            }
            CallbackAction::ShowScore { game_id } => {
                let standing = self.ledger.game_standing(player_id, game_id).await?;
                Ok(Reply::Standings {
                    standings: vec![standing],
                })
            }
        }
    }

    async fn accept(
        &self,
        counterpart_id: PlayerId,
        inviter_id: PlayerId,
        game_name: &str,
    ) -> Result<Reply, EngineError> {
        let game = self
            .invites
            .accept(counterpart_id, inviter_id, game_name)
            .await?;
        Ok(Reply::InviteAccepted {
            inviter_id,
            game: game.standing(),
        })
    }

    async fn reject(&self, counterpart_id: PlayerId, inviter_id: PlayerId) -> Result<Reply, EngineError> {
        let rejection = self.invites.reject(counterpart_id, inviter_id).await?;
        Ok(Reply::InviteRejected {
            inviter_id: rejection.inviter_id,
            counterpart_name: rejection.counterpart_name,
        })
    }

    /// Suggest adding the typed result, or list standings when the query is
    /// the score keyword. Anything else gets no suggestions.
    async fn inline_suggestions(&self, player_id: PlayerId, query: &str) -> Result<Reply, EngineError> {
        if self.ledger.parse(query).is_some() {
            return Ok(Reply::Suggestions {
                suggestions: vec![InlineSuggestion::AddResult {
                    text: query.to_string(),
                }],
            });
        }

        if query.trim().to_lowercase() != self.score_keyword.to_lowercase() {
            return Ok(Reply::Suggestions {
                suggestions: Vec::new(),
            });
        }

        let standings = match self.ledger.standings(player_id).await {
            Ok(standings) => standings,
            Err(EngineError::NoActiveGames | EngineError::PlayerUnknown(_)) => Vec::new(),
            Err(e) => return Err(e),
        };

        Ok(Reply::Suggestions {
            suggestions: standings
                .into_iter()
                .map(|standing| InlineSuggestion::Standing { standing })
                .collect(),
        })
    }

    fn recover(actor: PlayerId, err: EngineError) -> Reply {
        let kind = err.kind();

        let detail = match &err {
            // Logged with the failing operation in `bounded`
            EngineError::PersistenceFailure(_) => "Something went wrong, please try again".to_string(),
            EngineError::NoActiveGames => {
                info!("Player {} has no games to score", actor);
                err.to_string()
            }
            _ => {
                warn!("Rejected request from player {}: {}", actor, err);
                err.to_string()
            }
        };

        Reply::Failure { kind, detail }
    }
}
