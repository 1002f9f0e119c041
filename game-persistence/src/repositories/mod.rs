pub mod game_repository;
pub mod player_repository;

pub use game_repository::{ApplyOutcome, GameRepository, JoinOutcome};
pub use player_repository::PlayerRepository;
