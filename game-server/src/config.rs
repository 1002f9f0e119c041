use std::env;
use std::time::Duration;

use game_core::DEFAULT_RESULT_HEADER;

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    /// Upper bound for a single persistence round trip.
    pub persistence_timeout: Duration,
    /// Shared secret the transport must present on every event.
    pub webhook_secret: Option<String>,
    pub result_header: String,
    /// Inline query that asks for standings instead of submitting a result.
    pub score_keyword: String,
    pub max_game_name_length: usize,
}

impl Config {
    pub fn new() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .expect("Invalid PORT"),
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://puzzle_tally.db?mode=rwc".to_string()),
            persistence_timeout: Duration::from_millis(
                env::var("PERSISTENCE_TIMEOUT_MS")
                    .unwrap_or_else(|_| "5000".to_string())
                    .parse()
                    .expect("Invalid PERSISTENCE_TIMEOUT_MS"),
            ),
            webhook_secret: env::var("WEBHOOK_SECRET").ok().filter(|s| !s.is_empty()),
            result_header: env::var("RESULT_HEADER")
                .unwrap_or_else(|_| DEFAULT_RESULT_HEADER.to_string()),
            score_keyword: env::var("SCORE_KEYWORD").unwrap_or_else(|_| "Рахунок".to_string()),
            max_game_name_length: env::var("MAX_GAME_NAME_LENGTH")
                .unwrap_or_else(|_| "32".to_string())
                .parse()
                .expect("Invalid MAX_GAME_NAME_LENGTH"),
        }
    }

    /// Fixed settings for tests, independent of the environment
    pub fn for_tests() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            database_url: "sqlite::memory:".to_string(),
            persistence_timeout: Duration::from_secs(5),
            webhook_secret: None,
            result_header: DEFAULT_RESULT_HEADER.to_string(),
            score_keyword: "Рахунок".to_string(),
            max_game_name_length: 32,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}
