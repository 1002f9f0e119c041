use sea_orm_migration::prelude::*;

use crate::m20240101_000001_create_players_table::Players;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Games::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Games::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Games::Name).string().not_null())
                    .col(ColumnDef::new(Games::CreatedBy).big_integer().not_null())
                    .col(
                        ColumnDef::new(Games::LeaderName)
                            .string()
                            .not_null()
                            .default("None"),
                    )
                    .col(
                        ColumnDef::new(Games::TotalScoreMargin)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Games::Revision)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Games::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Games::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Game names are scoped per inviter
        manager
            .create_index(
                Index::create()
                    .name("idx_games_name_created_by")
                    .table(Games::Table)
                    .col(Games::Name)
                    .col(Games::CreatedBy)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GamePlayers::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(GamePlayers::GameId).uuid().not_null())
                    .col(ColumnDef::new(GamePlayers::PlayerId).big_integer().not_null())
                    .col(ColumnDef::new(GamePlayers::PlayerName).string().not_null())
                    .col(
                        ColumnDef::new(GamePlayers::Score)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GamePlayers::LastPuzzleId)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(GamePlayers::Seat).small_integer().not_null())
                    .primary_key(
                        Index::create()
                            .col(GamePlayers::GameId)
                            .col(GamePlayers::PlayerId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_players_game")
                            .from(GamePlayers::Table, GamePlayers::GameId)
                            .to(Games::Table, Games::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_game_players_player")
                            .from(GamePlayers::Table, GamePlayers::PlayerId)
                            .to(Players::Table, Players::Id),
                    )
                    .to_owned(),
            )
            .await?;

        // Score application filters on player first
        manager
            .create_index(
                Index::create()
                    .name("idx_game_players_player_id")
                    .table(GamePlayers::Table)
                    .col(GamePlayers::PlayerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PlayerGames::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(PlayerGames::PlayerId).big_integer().not_null())
                    .col(ColumnDef::new(PlayerGames::GameId).uuid().not_null())
                    .col(
                        ColumnDef::new(PlayerGames::AddedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .primary_key(
                        Index::create()
                            .col(PlayerGames::PlayerId)
                            .col(PlayerGames::GameId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_player_games_player")
                            .from(PlayerGames::Table, PlayerGames::PlayerId)
                            .to(Players::Table, Players::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_player_games_game")
                            .from(PlayerGames::Table, PlayerGames::GameId)
                            .to(Games::Table, Games::Id),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PlayerGames::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GamePlayers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Games::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Games {
    Table,
    Id,
    Name,
    CreatedBy,
    LeaderName,
    TotalScoreMargin,
    Revision,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum GamePlayers {
    Table,
    GameId,
    PlayerId,
    PlayerName,
    Score,
    LastPuzzleId,
    Seat,
}

#[derive(DeriveIden)]
enum PlayerGames {
    Table,
    PlayerId,
    GameId,
    AddedAt,
}
