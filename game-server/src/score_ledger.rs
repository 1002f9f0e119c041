use std::time::Duration;
use tracing::info;

use crate::errors::{EngineError, bounded};
use game_core::{PuzzleResult, ResultParser};
use game_persistence::{GameRepository, PlayerRepository};
use game_types::{GameId, GameStanding, Player, PlayerId, PuzzleId};

#[derive(Debug, Clone, PartialEq)]
pub struct SubmitOutcome {
    pub puzzle_id: PuzzleId,
    pub score: u8,
    /// Games whose score moved; zero for a replayed or stale result.
    pub games_updated: u32,
    pub standings: Vec<GameStanding>,
}

/// Applies parsed puzzle results to every game a player belongs to and keeps
/// each game's leader and margin current.
pub struct ScoreLedger {
    parser: ResultParser,
    players: PlayerRepository,
    games: GameRepository,
    timeout: Duration,
}

impl ScoreLedger {
    pub fn new(
        parser: ResultParser,
        players: PlayerRepository,
        games: GameRepository,
        timeout: Duration,
    ) -> Self {
        Self {
            parser,
            players,
            games,
            timeout,
        }
    }

    pub fn parse(&self, text: &str) -> Option<PuzzleResult> {
        self.parser.parse(text)
    }

    /// Parse shared result text and submit it. `Ok(None)` means the text was
    /// not a puzzle result at all.
    pub async fn submit_text(
        &self,
        player_id: PlayerId,
        text: &str,
    ) -> Result<Option<SubmitOutcome>, EngineError> {
        let Some(result) = self.parse(text) else {
            return Ok(None);
        };

        self.submit(player_id, result.puzzle_id, result.score)
            .await
            .map(Some)
    }

    /// Record `score` for `puzzle_id` in each of the player's games. A puzzle
    /// that is not newer than the game's watermark for this player is
    /// ignored for that game, so resubmitting is always safe.
    pub async fn submit(
        &self,
        player_id: PlayerId,
        puzzle_id: PuzzleId,
        score: u8,
    ) -> Result<SubmitOutcome, EngineError> {
        let player = self.require_player(player_id).await?;

        if !player.has_games() {
            return Err(EngineError::NoActiveGames);
        }

        let applied = bounded(
            self.timeout,
            "apply puzzle result",
            self.games.apply_result(player_id, puzzle_id, score),
        )
        .await?;

        if applied.games.is_empty() {
            return Err(EngineError::NoActiveGames);
        }

        if applied.games_updated > 0 {
            info!(
                "Player {} scored {} on puzzle {} in {} games",
                player_id, score, puzzle_id, applied.games_updated
            );
        } else {
            info!(
                "Puzzle {} already counted for player {}",
                puzzle_id, player_id
            );
        }

        Ok(SubmitOutcome {
            puzzle_id,
            score,
            games_updated: applied.games_updated,
            standings: applied.games.iter().map(|game| game.standing()).collect(),
        })
    }

    /// Leader and margin for every game of the player
    pub async fn standings(&self, player_id: PlayerId) -> Result<Vec<GameStanding>, EngineError> {
        self.require_player(player_id).await?;

        let games = bounded(
            self.timeout,
            "load standings",
            self.games.games_for_player(player_id),
        )
        .await?;

        if games.is_empty() {
            return Err(EngineError::NoActiveGames);
        }

        Ok(games.iter().map(|game| game.standing()).collect())
    }

    pub async fn game_standing(
        &self,
        player_id: PlayerId,
        game_id: GameId,
    ) -> Result<GameStanding, EngineError> {
        bounded(
            self.timeout,
            "load standings",
            self.games.find_for_player(player_id, game_id),
        )
        .await?
        .map(|game| game.standing())
        .ok_or(EngineError::GameNotFound(game_id))
    }

    async fn require_player(&self, player_id: PlayerId) -> Result<Player, EngineError> {
        bounded(self.timeout, "look up player", self.players.find_by_id(player_id))
            .await?
            .ok_or(EngineError::PlayerUnknown(player_id))
    }
}
