use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{CallbackAction, FailureKind, GameStanding, GameSummary, PlayerId, PuzzleId};

/// Events delivered by the chat transport, already classified.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum InboundEvent {
    Start { player_id: PlayerId, display_name: String },
    GameProposalRequested { player_id: PlayerId },
    GameNameSupplied { player_id: PlayerId, text: String },
    CounterpartDesignated { inviter_id: PlayerId, counterpart_id: PlayerId },
    InviteAccepted { counterpart_id: PlayerId, inviter_id: PlayerId, game_name: String },
    InviteRejected { counterpart_id: PlayerId, inviter_id: PlayerId },
    CallbackQuery { player_id: PlayerId, data: String },
    ResultTextReceived { player_id: PlayerId, text: String },
    StandingsRequested { player_id: PlayerId },
    InlineQuery { player_id: PlayerId, query: String },
}

impl InboundEvent {
    /// The player whose action produced the event.
    pub fn actor(&self) -> PlayerId {
        match self {
            InboundEvent::Start { player_id, .. }
            | InboundEvent::GameProposalRequested { player_id }
            | InboundEvent::GameNameSupplied { player_id, .. }
            | InboundEvent::CallbackQuery { player_id, .. }
            | InboundEvent::ResultTextReceived { player_id, .. }
            | InboundEvent::StandingsRequested { player_id }
            | InboundEvent::InlineQuery { player_id, .. } => *player_id,
            InboundEvent::CounterpartDesignated { inviter_id, .. } => *inviter_id,
            InboundEvent::InviteAccepted { counterpart_id, .. }
            | InboundEvent::InviteRejected { counterpart_id, .. } => *counterpart_id,
        }
    }
}

/// Invitation the transport delivers to the counterpart, with the two
/// button payloads it should attach.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Invitation {
    pub inviter_id: PlayerId,
    pub inviter_name: String,
    pub counterpart_id: PlayerId,
    pub game_name: String,
    pub accept: CallbackAction,
    pub reject: CallbackAction,
}

impl Invitation {
    pub fn new(
        inviter_id: PlayerId,
        inviter_name: String,
        counterpart_id: PlayerId,
        game_name: String,
    ) -> Self {
        Self {
            accept: CallbackAction::Accept {
                inviter_id,
                game_name: game_name.clone(),
            },
            reject: CallbackAction::Reject { inviter_id },
            inviter_id,
            inviter_name,
            counterpart_id,
            game_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum InlineSuggestion {
    AddResult { text: String },
    Standing { standing: GameStanding },
}

/// Status values handed back to the transport, which renders them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum Reply {
    Registered { player_id: PlayerId },
    GameProposal { existing_games: Vec<GameSummary> },
    AwaitingContact { game_name: String },
    InvitationSent { invitation: Invitation },
    InviteAccepted { inviter_id: PlayerId, game: GameStanding },
    InviteRejected { inviter_id: PlayerId, counterpart_name: String },
    ScoreRecorded {
        puzzle_id: PuzzleId,
        score: u8,
        games_updated: u32,
        standings: Vec<GameStanding>,
    },
    Standings { standings: Vec<GameStanding> },
    Suggestions { suggestions: Vec<InlineSuggestion> },
    NotAResult,
    Failure { kind: FailureKind, detail: String },
}

impl Reply {
    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Reply::Failure { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
