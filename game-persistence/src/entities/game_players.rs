use sea_orm::entity::prelude::*;

/// One seat of a game: the player's running score and the highest puzzle
/// already counted for them.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "game_players")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub game_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub player_id: i64,
    pub player_name: String,
    pub score: i32,
    pub last_puzzle_id: i64,
    pub seat: i16,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
