use anyhow::{Result, anyhow};
use sea_orm::sea_query::{Expr, OnConflict, Query};
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder, TransactionTrait,
};
use std::collections::HashMap;
use tracing::{debug, info};
use uuid::Uuid;

use crate::entities::{game_players, games, player_games, players, prelude::*};
use crate::repositories::player_repository::{add_game_references, game_ids_for_player};
use game_core::compute_standings;
use game_types::{
    Game, GameId, GameSummary, PLAYERS_PER_GAME, Player, PlayerId, PlayerScore, PuzzleId,
    NO_LEADER,
};

/// Result of accepting an invitation.
#[derive(Debug, Clone, PartialEq)]
pub enum JoinOutcome {
    /// A new game was created for the pair.
    Created(Game),
    /// Missing participants were added to an existing game.
    Joined(Game),
    /// Both players were already in the game.
    AlreadyJoined(Game),
    /// The game already has two other participants; nothing was written.
    Full(Game),
}

impl JoinOutcome {
    pub fn game(&self) -> &Game {
        match self {
            JoinOutcome::Created(game)
            | JoinOutcome::Joined(game)
            | JoinOutcome::AlreadyJoined(game)
            | JoinOutcome::Full(game) => game,
        }
    }
}

/// Result of applying one puzzle result to all of a player's games.
#[derive(Debug, Clone, PartialEq)]
pub struct ApplyOutcome {
    /// Games whose score moved. Zero for duplicate or stale submissions.
    pub games_updated: u32,
    /// Every game the player is registered in, after the update.
    pub games: Vec<Game>,
}

#[derive(Clone)]
pub struct GameRepository {
    db: DatabaseConnection,
}

impl GameRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_game(model: games::Model, players: Vec<PlayerScore>) -> Game {
        Game {
            id: model.id,
            name: model.name,
            created_by: model.created_by,
            players,
            leader_name: model.leader_name,
            total_score_margin: model.total_score_margin,
            revision: model.revision,
            created_at: model.created_at.to_rfc3339(),
        }
    }

    fn model_to_score(model: game_players::Model) -> PlayerScore {
        PlayerScore {
            player_id: model.player_id,
            player_name: model.player_name,
            score: model.score,
            last_puzzle_id: model.last_puzzle_id,
            seat: model.seat,
        }
    }

    pub async fn find_by_id(&self, id: GameId) -> Result<Option<Game>> {
        let mut games = load_games(&self.db, &[id]).await?;
        Ok(games.pop())
    }

    /// A game, provided the player is registered in it
    pub async fn find_for_player(&self, player_id: PlayerId, id: GameId) -> Result<Option<Game>> {
        let references = game_ids_for_player(&self.db, player_id).await?;
        if !references.contains(&id) {
            return Ok(None);
        }

        self.find_by_id(id).await
    }

    pub async fn games_for_player(&self, player_id: PlayerId) -> Result<Vec<Game>> {
        let references = game_ids_for_player(&self.db, player_id).await?;
        load_games(&self.db, &references).await
    }

    pub async fn summaries_for_player(&self, player_id: PlayerId) -> Result<Vec<GameSummary>> {
        let games = self.games_for_player(player_id).await?;
        Ok(games.iter().map(Game::summary).collect())
    }

    /// Create the inviter's game called `game_name`, or add the counterpart
    /// to it, and register the game with both players. Runs in a single
    /// transaction.
    pub async fn join_or_create(
        &self,
        inviter: &Player,
        counterpart: &Player,
        game_name: &str,
    ) -> Result<JoinOutcome> {
        let txn = self.db.begin().await?;
        lock_players(&txn, &[inviter.id, counterpart.id]).await?;

        let (model, created) = match find_named_game(&txn, inviter.id, game_name).await? {
            Some(model) => (model, false),
            None => {
                let inserted = insert_game(&txn, inviter.id, game_name).await?;
                // Lost a creation race: the other accept's game wins
                let model = Games::find()
                    .filter(games::Column::Name.eq(game_name))
                    .filter(games::Column::CreatedBy.eq(inviter.id))
                    .one(&txn)
                    .await?
                    .ok_or_else(|| anyhow!("Failed to retrieve created game {}", game_name))?;
                (model, inserted)
            }
        };
        let game_id = model.id;

        let members = load_members(&txn, &[game_id]).await?;
        let members = members.get(&game_id).map(Vec::as_slice).unwrap_or_default();

        let missing: Vec<&Player> = [inviter, counterpart]
            .into_iter()
            .filter(|p| !members.iter().any(|m| m.player_id == p.id))
            .collect();

        if members.len() + missing.len() > PLAYERS_PER_GAME {
            let game = Self::model_to_game(model, members.to_vec());
            info!(
                "Game {} ({}) is full, rejecting player {}",
                game.name, game.id, counterpart.id
            );
            return Ok(JoinOutcome::Full(game));
        }

        if !missing.is_empty() {
            let first_free_seat = members.iter().map(|m| m.seat + 1).max().unwrap_or(0);
            let seats = missing
                .iter()
                .enumerate()
                .map(|(i, player)| game_players::ActiveModel {
                    game_id: ActiveValue::Set(game_id),
                    player_id: ActiveValue::Set(player.id),
                    player_name: ActiveValue::Set(player.name.clone()),
                    score: ActiveValue::Set(0),
                    last_puzzle_id: ActiveValue::Set(0),
                    seat: ActiveValue::Set(first_free_seat + i as i16),
                });
            GamePlayers::insert_many(seats).exec_without_returning(&txn).await?;
        }

        add_game_references(&txn, &[inviter.id, counterpart.id], game_id).await?;
        let game = refresh_standings(&txn, game_id).await?;

        txn.commit().await?;

        let outcome = if created {
            info!(
                "Created game {} ({}) for players {} and {}",
                game.name, game.id, inviter.id, counterpart.id
            );
            JoinOutcome::Created(game)
        } else if !missing.is_empty() {
            info!(
                "Player {} joined game {} ({})",
                counterpart.id, game.name, game.id
            );
            JoinOutcome::Joined(game)
        } else {
            debug!("Players already share game {} ({})", game.name, game.id);
            JoinOutcome::AlreadyJoined(game)
        };

        Ok(outcome)
    }

    /// Add `score` to the player's entry in every game they belong to where
    /// `puzzle_id` is newer than the entry's watermark, then recompute the
    /// leader of each game that moved.
    ///
    /// The player's game rows are write-locked before the watermark is read
    /// and the increment repeats the watermark condition, so a duplicate or
    /// stale result can never be counted twice.
    pub async fn apply_result(
        &self,
        player_id: PlayerId,
        puzzle_id: PuzzleId,
        score: u8,
    ) -> Result<ApplyOutcome> {
        let txn = self.db.begin().await?;

        // Write first: the game rows stay locked until commit, so the reads
        // below see every score committed before ours.
        lock_player_games(&txn, player_id).await?;

        let references = game_ids_for_player(&txn, player_id).await?;
        if references.is_empty() {
            return Ok(ApplyOutcome {
                games_updated: 0,
                games: Vec::new(),
            });
        }

        let puzzle_id = i64::from(puzzle_id);
        let mut affected: Vec<GameId> = GamePlayers::find()
            .filter(game_players::Column::PlayerId.eq(player_id))
            .filter(game_players::Column::GameId.is_in(references.clone()))
            .filter(game_players::Column::LastPuzzleId.lt(puzzle_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|row| row.game_id)
            .collect();
        affected.sort();
        affected.dedup();
        let games_updated = u32::try_from(affected.len())?;

        if !affected.is_empty() {
            let updated = GamePlayers::update_many()
                .col_expr(
                    game_players::Column::Score,
                    Expr::col(game_players::Column::Score).add(i32::from(score)),
                )
                .col_expr(game_players::Column::LastPuzzleId, Expr::value(puzzle_id))
                .filter(game_players::Column::PlayerId.eq(player_id))
                .filter(game_players::Column::GameId.is_in(affected.clone()))
                .filter(game_players::Column::LastPuzzleId.lt(puzzle_id))
                .exec(&txn)
                .await?;
            if updated.rows_affected != u64::from(games_updated) {
                return Err(anyhow!(
                    "Expected to update {} score rows for player {}, updated {}",
                    affected.len(),
                    player_id,
                    updated.rows_affected
                ));
            }

            Games::update_many()
                .col_expr(
                    games::Column::Revision,
                    Expr::col(games::Column::Revision).add(1),
                )
                .filter(games::Column::Id.is_in(affected.clone()))
                .exec(&txn)
                .await?;

            for game_id in &affected {
                refresh_standings(&txn, *game_id).await?;
            }
        }

        let games = load_games(&txn, &references).await?;
        txn.commit().await?;

        debug!(
            "Applied puzzle {} (+{}) for player {} to {} of {} games",
            puzzle_id,
            score,
            player_id,
            affected.len(),
            references.len()
        );

        Ok(ApplyOutcome {
            games_updated,
            games,
        })
    }
}

/// No-op write on the players' rows. Taking the write lock before any read
/// keeps a concurrent transaction from invalidating what we read.
async fn lock_players<C: ConnectionTrait>(conn: &C, ids: &[PlayerId]) -> Result<()> {
    Players::update_many()
        .col_expr(
            players::Column::UpdatedAt,
            Expr::col(players::Column::UpdatedAt).into(),
        )
        .filter(players::Column::Id.is_in(ids.to_vec()))
        .exec(conn)
        .await?;
    Ok(())
}

/// No-op write on every game the player is registered in
async fn lock_player_games<C: ConnectionTrait>(conn: &C, player_id: PlayerId) -> Result<()> {
    Games::update_many()
        .col_expr(
            games::Column::Revision,
            Expr::col(games::Column::Revision).into(),
        )
        .filter(
            games::Column::Id.in_subquery(
                Query::select()
                    .column(player_games::Column::GameId)
                    .from(PlayerGames)
                    .and_where(player_games::Column::PlayerId.eq(player_id))
                    .to_owned(),
            ),
        )
        .exec(conn)
        .await?;
    Ok(())
}

async fn find_named_game<C: ConnectionTrait>(
    conn: &C,
    member: PlayerId,
    game_name: &str,
) -> Result<Option<games::Model>> {
    let member_of: Vec<GameId> = GamePlayers::find()
        .filter(game_players::Column::PlayerId.eq(member))
        .all(conn)
        .await?
        .into_iter()
        .map(|seat| seat.game_id)
        .collect();

    if member_of.is_empty() {
        return Ok(None);
    }

    let model = Games::find()
        .filter(games::Column::Name.eq(game_name))
        .filter(games::Column::Id.is_in(member_of))
        .order_by_asc(games::Column::CreatedAt)
        .one(conn)
        .await?;

    Ok(model)
}

/// Returns whether a row was written; `false` means a game with the same
/// name and creator already exists.
async fn insert_game<C: ConnectionTrait>(
    conn: &C,
    created_by: PlayerId,
    game_name: &str,
) -> Result<bool> {
    let now = chrono::Utc::now();

    let model = games::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        name: ActiveValue::Set(game_name.to_string()),
        created_by: ActiveValue::Set(created_by),
        leader_name: ActiveValue::Set(NO_LEADER.to_string()),
        total_score_margin: ActiveValue::Set(0),
        revision: ActiveValue::Set(0),
        created_at: ActiveValue::Set(now.into()),
        updated_at: ActiveValue::Set(now.into()),
    };

    let inserted = Games::insert(model)
        .on_conflict(
            OnConflict::columns([games::Column::Name, games::Column::CreatedBy])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    Ok(inserted > 0)
}

async fn load_members<C: ConnectionTrait>(
    conn: &C,
    game_ids: &[GameId],
) -> Result<HashMap<GameId, Vec<PlayerScore>>> {
    let mut members: HashMap<GameId, Vec<PlayerScore>> = HashMap::new();
    if game_ids.is_empty() {
        return Ok(members);
    }

    let seats = GamePlayers::find()
        .filter(game_players::Column::GameId.is_in(game_ids.to_vec()))
        .order_by_asc(game_players::Column::Seat)
        .all(conn)
        .await?;

    for seat in seats {
        members
            .entry(seat.game_id)
            .or_default()
            .push(GameRepository::model_to_score(seat));
    }

    Ok(members)
}

async fn load_games<C: ConnectionTrait>(conn: &C, game_ids: &[GameId]) -> Result<Vec<Game>> {
    if game_ids.is_empty() {
        return Ok(Vec::new());
    }

    let models = Games::find()
        .filter(games::Column::Id.is_in(game_ids.to_vec()))
        .order_by_asc(games::Column::CreatedAt)
        .all(conn)
        .await?;
    let mut members = load_members(conn, game_ids).await?;

    Ok(models
        .into_iter()
        .map(|model| {
            let players = members.remove(&model.id).unwrap_or_default();
            GameRepository::model_to_game(model, players)
        })
        .collect())
}

/// Recompute leader and margin from the stored scores and persist them
async fn refresh_standings<C: ConnectionTrait>(conn: &C, game_id: GameId) -> Result<Game> {
    let model = Games::find_by_id(game_id)
        .one(conn)
        .await?
        .ok_or_else(|| anyhow!("Game {} not found", game_id))?;
    let players = load_members(conn, &[game_id])
        .await?
        .remove(&game_id)
        .unwrap_or_default();

    let standings = compute_standings(&players);
    if standings.leader_name == model.leader_name && standings.margin == model.total_score_margin {
        return Ok(GameRepository::model_to_game(model, players));
    }

    let updated = games::ActiveModel {
        id: ActiveValue::Unchanged(model.id),
        leader_name: ActiveValue::Set(standings.leader_name),
        total_score_margin: ActiveValue::Set(standings.margin),
        updated_at: ActiveValue::Set(chrono::Utc::now().into()),
        ..Default::default()
    };
    let model = Games::update(updated).exec(conn).await?;

    Ok(GameRepository::model_to_game(model, players))
}
