use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use game_types::PlayerId;
use std::fmt;
use tracing::debug;

/// Where a player is in the "create a game and invite someone" dialogue.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConversationPhase {
    #[default]
    Idle,
    AwaitingGameName,
    AwaitingContact {
        game_name: String,
    },
}

impl ConversationPhase {
    pub fn label(&self) -> &'static str {
        match self {
            ConversationPhase::Idle => "Idle",
            ConversationPhase::AwaitingGameName => "AwaitingGameName",
            ConversationPhase::AwaitingContact { .. } => "AwaitingContact",
        }
    }
}

impl fmt::Display for ConversationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerConversationState {
    pub player_id: PlayerId,
    pub phase: ConversationPhase,
}

impl PlayerConversationState {
    pub fn idle(player_id: PlayerId) -> Self {
        Self {
            player_id,
            phase: ConversationPhase::Idle,
        }
    }

    pub fn pending_game_name(&self) -> Option<&str> {
        match &self.phase {
            ConversationPhase::AwaitingContact { game_name } => Some(game_name),
            _ => None,
        }
    }

    pub fn is_idle(&self) -> bool {
        self.phase == ConversationPhase::Idle
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConversationError {
    #[error("Player {player_id} is in phase {actual}, expected {expected}")]
    InvalidState {
        player_id: PlayerId,
        expected: &'static str,
        actual: &'static str,
    },
}

/// Process-wide store of conversational phases. Every transition happens
/// under the map's per-player entry lock, so concurrent events for the same
/// player are serialized.
#[derive(Debug, Default)]
pub struct PlayerStateTracker {
    states: DashMap<PlayerId, PlayerConversationState>,
}

impl PlayerStateTracker {
    pub fn new() -> Self {
        Self {
            states: DashMap::new(),
        }
    }

    /// Current state of a player. Creates an Idle entry on first access.
    pub fn get(&self, player_id: PlayerId) -> PlayerConversationState {
        self.states
            .entry(player_id)
            .or_insert_with(|| PlayerConversationState::idle(player_id))
            .value()
            .clone()
    }

    /// Current state of a player without creating one.
    pub fn peek(&self, player_id: PlayerId) -> Option<PlayerConversationState> {
        self.states.get(&player_id).map(|state| state.value().clone())
    }

    /// Start (or restart) naming a new game. Any earlier dialogue is
    /// abandoned: the last request wins.
    pub fn transition_to_naming(&self, player_id: PlayerId) {
        let mut state = self
            .states
            .entry(player_id)
            .or_insert_with(|| PlayerConversationState::idle(player_id));

        if !state.is_idle() {
            debug!(
                "Player {} restarted naming from phase {}",
                player_id, state.phase
            );
        }
        state.phase = ConversationPhase::AwaitingGameName;
    }

    /// Record the chosen game name and move on to waiting for a contact.
    pub fn set_game_name(
        &self,
        player_id: PlayerId,
        game_name: String,
    ) -> Result<(), ConversationError> {
        let mut state = self
            .states
            .entry(player_id)
            .or_insert_with(|| PlayerConversationState::idle(player_id));

        if state.phase != ConversationPhase::AwaitingGameName {
            return Err(ConversationError::InvalidState {
                player_id,
                expected: ConversationPhase::AwaitingGameName.label(),
                actual: state.phase.label(),
            });
        }

        state.phase = ConversationPhase::AwaitingContact { game_name };
        Ok(())
    }

    /// Name of the game the player is about to invite someone to.
    pub fn pending_game_name(&self, player_id: PlayerId) -> Result<String, ConversationError> {
        let actual = match self.states.get(&player_id) {
            Some(state) => match state.pending_game_name() {
                Some(name) => return Ok(name.to_string()),
                None => state.phase.label(),
            },
            None => ConversationPhase::Idle.label(),
        };

        Err(ConversationError::InvalidState {
            player_id,
            expected: "AwaitingContact",
            actual,
        })
    }

    /// Finish an invitation: back to Idle, but only if the player is still
    /// waiting for a contact for `game_name`. Returns whether it cleared.
    pub fn complete_invitation(&self, player_id: PlayerId, game_name: &str) -> bool {
        match self.states.entry(player_id) {
            Entry::Occupied(mut entry) if entry.get().pending_game_name() == Some(game_name) => {
                entry.get_mut().phase = ConversationPhase::Idle;
                true
            }
            _ => false,
        }
    }

    pub fn clear(&self, player_id: PlayerId) {
        if let Some(mut state) = self.states.get_mut(&player_id) {
            state.phase = ConversationPhase::Idle;
        }
    }

    pub fn forget(&self, player_id: PlayerId) {
        self.states.remove(&player_id);
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_creates_idle_entry() {
        let tracker = PlayerStateTracker::new();
        assert!(tracker.peek(1).is_none());

        let state = tracker.get(1);
        assert!(state.is_idle());
        assert_eq!(state.pending_game_name(), None);
        assert!(tracker.peek(1).is_some());
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_full_dialogue() {
        let tracker = PlayerStateTracker::new();

        tracker.transition_to_naming(7);
        assert_eq!(tracker.get(7).phase, ConversationPhase::AwaitingGameName);

        tracker.set_game_name(7, "Бочки".to_string()).unwrap();
        assert_eq!(tracker.pending_game_name(7).unwrap(), "Бочки");

        assert!(tracker.complete_invitation(7, "Бочки"));
        assert!(tracker.get(7).is_idle());
    }

    #[test]
    fn test_set_game_name_requires_naming_phase() {
        let tracker = PlayerStateTracker::new();

        let err = tracker.set_game_name(3, "late".to_string()).unwrap_err();
        assert_eq!(
            err,
            ConversationError::InvalidState {
                player_id: 3,
                expected: "AwaitingGameName",
                actual: "Idle",
            }
        );

        tracker.transition_to_naming(3);
        tracker.set_game_name(3, "first".to_string()).unwrap();
        let err = tracker.set_game_name(3, "second".to_string()).unwrap_err();
        assert!(matches!(
            err,
            ConversationError::InvalidState {
                actual: "AwaitingContact",
                ..
            }
        ));
        assert_eq!(tracker.pending_game_name(3).unwrap(), "first");
    }

    #[test]
    fn test_naming_restart_drops_pending_name() {
        let tracker = PlayerStateTracker::new();

        tracker.transition_to_naming(5);
        tracker.set_game_name(5, "old".to_string()).unwrap();
        tracker.transition_to_naming(5);

        let state = tracker.get(5);
        assert_eq!(state.phase, ConversationPhase::AwaitingGameName);
        assert_eq!(state.pending_game_name(), None);
        assert!(tracker.pending_game_name(5).is_err());
    }

    #[test]
    fn test_complete_invitation_ignores_restarted_dialogue() {
        let tracker = PlayerStateTracker::new();

        tracker.transition_to_naming(9);
        tracker.set_game_name(9, "one".to_string()).unwrap();
        tracker.transition_to_naming(9);
        tracker.set_game_name(9, "two".to_string()).unwrap();

        assert!(!tracker.complete_invitation(9, "one"));
        assert_eq!(tracker.pending_game_name(9).unwrap(), "two");
    }

    #[test]
    fn test_clear_and_forget() {
        let tracker = PlayerStateTracker::new();

        tracker.transition_to_naming(11);
        tracker.clear(11);
        assert!(tracker.get(11).is_idle());

        tracker.forget(11);
        assert!(tracker.peek(11).is_none());
        assert!(tracker.is_empty());
    }

    #[test]
    fn test_concurrent_players_do_not_interfere() {
        let tracker = PlayerStateTracker::new();

        std::thread::scope(|scope| {
            for player_id in 0..8 {
                let tracker = &tracker;
                scope.spawn(move || {
                    tracker.transition_to_naming(player_id);
                    tracker
                        .set_game_name(player_id, format!("game-{}", player_id))
                        .unwrap();
                });
            }
        });

        for player_id in 0..8 {
            assert_eq!(
                tracker.pending_game_name(player_id).unwrap(),
                format!("game-{}", player_id)
            );
        }
    }

    #[test]
    fn test_pending_name_of_unknown_player_does_not_create_state() {
        let tracker = PlayerStateTracker::new();
        assert!(tracker.pending_game_name(99).is_err());
        assert!(tracker.peek(99).is_none());
    }
}
