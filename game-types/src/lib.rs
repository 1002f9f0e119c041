pub mod callback;
pub mod errors;
pub mod game;
pub mod messages;
pub mod user;

// Re-export all types
pub use callback::*;
pub use errors::*;
pub use game::*;
pub use messages::*;
pub use user::*;

/// Chat identity of a player, as assigned by the transport.
pub type PlayerId = i64;
pub type GameId = uuid::Uuid;
/// Day index of the shared puzzle.
pub type PuzzleId = u32;
