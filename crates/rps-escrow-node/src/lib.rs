//! RPS Escrow Node
//!
//! Hosts one round coordinator over an in-memory custodian and exposes its
//! operations over HTTP. The coordinator's lock is the transaction boundary;
//! the router only translates requests.

pub mod config;
pub mod handlers;
pub mod state;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use config::NodeConfig;
pub use state::AppState;

use handlers::*;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Round
        .route("/api/round", get(get_round))
        .route("/api/round/bet", post(place_bet))
        .route("/api/round/reveal", post(reveal_bet))
        .route("/api/round/withdraw", post(withdraw))
        .route("/api/config", get(get_config))
        .route("/api/events", get(list_events))
        // Ledger
        .route("/api/balance/:address", get(get_balance))
        .route("/api/faucet", post(faucet))
        // System
        .route("/api/system/tick", post(tick))
        .route("/api/health", get(health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
