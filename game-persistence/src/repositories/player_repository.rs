use anyhow::Result;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveValue, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    QueryOrder,
};

use crate::entities::{player_games, players, prelude::*};
use game_types::{GameId, Player, PlayerId};

#[derive(Clone)]
pub struct PlayerRepository {
    db: DatabaseConnection,
}

impl PlayerRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    fn model_to_player(model: players::Model, games: Vec<GameId>) -> Player {
        Player {
            id: model.id,
            name: model.name,
            games,
            created_at: model.created_at.to_rfc3339(),
        }
    }

    pub async fn find_by_id(&self, id: PlayerId) -> Result<Option<Player>> {
        let Some(model) = Players::find_by_id(id).one(&self.db).await? else {
            return Ok(None);
        };

        let games = game_ids_for_player(&self.db, id).await?;
        Ok(Some(Self::model_to_player(model, games)))
    }

    pub async fn exists(&self, id: PlayerId) -> Result<bool> {
        Ok(Players::find_by_id(id).one(&self.db).await?.is_some())
    }

    /// Insert the player unless a record already exists. An existing record
    /// keeps its name and game references. Returns the stored player and
    /// whether it was created by this call.
    pub async fn register(&self, id: PlayerId, name: &str) -> Result<(Player, bool)> {
        let now = chrono::Utc::now();

        let model = players::ActiveModel {
            id: ActiveValue::Set(id),
            name: ActiveValue::Set(name.to_string()),
            created_at: ActiveValue::Set(now.into()),
            updated_at: ActiveValue::Set(now.into()),
        };

        let inserted = Players::insert(model)
            .on_conflict(
                OnConflict::column(players::Column::Id)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        let player = self
            .find_by_id(id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("Failed to retrieve registered player {}", id))?;

        Ok((player, inserted > 0))
    }
}

/// Games the player is registered in, oldest first
pub async fn game_ids_for_player<C: ConnectionTrait>(
    conn: &C,
    player_id: PlayerId,
) -> Result<Vec<GameId>> {
    let references = PlayerGames::find()
        .filter(player_games::Column::PlayerId.eq(player_id))
        .order_by_asc(player_games::Column::AddedAt)
        .all(conn)
        .await?;

    Ok(references.into_iter().map(|r| r.game_id).collect())
}

/// Add games to a player's reference set. Already present references are
/// left untouched.
pub async fn add_game_references<C: ConnectionTrait>(
    conn: &C,
    player_ids: &[PlayerId],
    game_id: GameId,
) -> Result<u64> {
    if player_ids.is_empty() {
        return Ok(0);
    }

    let now = chrono::Utc::now();
    let references = player_ids.iter().map(|&player_id| player_games::ActiveModel {
        player_id: ActiveValue::Set(player_id),
        game_id: ActiveValue::Set(game_id),
        added_at: ActiveValue::Set(now.into()),
    });

    let added = PlayerGames::insert_many(references)
        .on_conflict(
            OnConflict::columns([player_games::Column::PlayerId, player_games::Column::GameId])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await?;

    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::connect_to_memory_database;
    use migration::{Migrator, MigratorTrait};

    async fn setup_test_db() -> PlayerRepository {
        let db = connect_to_memory_database().await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        PlayerRepository::new(db)
    }

    #[tokio::test]
    async fn test_register_and_find_player() {
        let repo = setup_test_db().await;

        let (player, created) = repo.register(1001, "Alice Smith").await.unwrap();
        assert!(created);
        assert_eq!(player.id, 1001);
        assert_eq!(player.name, "Alice Smith");
        assert!(player.games.is_empty());

        let found = repo.find_by_id(1001).await.unwrap().unwrap();
        assert_eq!(found.name, "Alice Smith");
        assert!(repo.exists(1001).await.unwrap());
    }

    #[tokio::test]
    async fn test_register_keeps_existing_record() {
        let repo = setup_test_db().await;

        repo.register(1001, "Alice Smith").await.unwrap();
        let (player, created) = repo.register(1001, "Renamed").await.unwrap();

        assert!(!created);
        assert_eq!(player.name, "Alice Smith");
    }

    #[tokio::test]
    async fn test_unknown_player() {
        let repo = setup_test_db().await;

        assert!(repo.find_by_id(404).await.unwrap().is_none());
        assert!(!repo.exists(404).await.unwrap());
    }
}
