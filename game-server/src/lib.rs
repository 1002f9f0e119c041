use std::sync::Arc;
use warp::Filter;

use crate::config::Config;
use crate::handlers::EventHandler;
use crate::invite_workflow::InviteWorkflow;
use crate::score_ledger::ScoreLedger;
use game_core::{PlayerStateTracker, ResultParser};
use game_persistence::connection::DatabaseConnection;
use game_persistence::{GameRepository, PlayerRepository};
use game_types::InboundEvent;

pub mod config;
pub mod errors;
pub mod handlers;
pub mod invite_workflow;
pub mod score_ledger;

pub const WEBHOOK_SECRET_HEADER: &str = "x-webhook-secret";

/// Wire the repositories, tracker, workflow and ledger into one handler.
pub fn build_handler(config: &Config, db: DatabaseConnection) -> anyhow::Result<EventHandler> {
    let players = PlayerRepository::new(db.clone());
    let games = GameRepository::new(db);
    let tracker = Arc::new(PlayerStateTracker::new());
    let parser = ResultParser::new(&config.result_header)?;

    let invites = Arc::new(InviteWorkflow::new(
        tracker,
        players.clone(),
        games.clone(),
        config.persistence_timeout,
        config.max_game_name_length,
    ));
    let ledger = Arc::new(ScoreLedger::new(
        parser,
        players,
        games,
        config.persistence_timeout,
    ));

    Ok(EventHandler::new(
        invites,
        ledger,
        config.score_keyword.clone(),
    ))
}

pub fn create_routes(
    handler: Arc<EventHandler>,
    webhook_secret: Option<String>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let handler_filter = warp::any().map({
        let handler = handler.clone();
        move || handler.clone()
    });

    let secret_filter = warp::any().map(move || webhook_secret.clone());

    // Classified transport events
    let events = warp::path("events")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::header::optional::<String>(WEBHOOK_SECRET_HEADER))
        .and(secret_filter)
        .and(warp::body::json())
        .and(handler_filter)
        .and_then(handle_event_request);

    // Health check endpoint
    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", warp::http::StatusCode::OK));

    events.or(health).with(warp::log("puzzle_tally"))
}

async fn handle_event_request(
    presented_secret: Option<String>,
    expected_secret: Option<String>,
    event: InboundEvent,
    handler: Arc<EventHandler>,
) -> Result<impl warp::Reply, warp::Rejection> {
    if let Some(expected) = expected_secret {
        if presented_secret.as_deref() != Some(expected.as_str()) {
            tracing::warn!("Rejected event with missing or wrong webhook secret");
            return Ok(warp::reply::with_status(
                warp::reply::json(&serde_json::json!({
                    "error": "Invalid webhook secret"
                })),
                warp::http::StatusCode::FORBIDDEN,
            ));
        }
    }

    let reply = handler.handle(event).await;
    Ok(warp::reply::with_status(
        warp::reply::json(&reply),
        warp::http::StatusCode::OK,
    ))
}
