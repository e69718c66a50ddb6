//! RPS Escrow Node binary.

use rps_escrow_node::{create_router, AppState, NodeConfig};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match NodeConfig::from_env() {
        Ok(config) => config,
        Err(err) => {
            tracing::error!("Invalid configuration: {}", err);
            std::process::exit(1);
        }
    };

    tracing::info!(
        "Round config: {} {} per bet, {}s timeout, escrow {}",
        config.round.betting_amount(),
        config.round.asset(),
        config.round.round_timeout_secs(),
        config.escrow_account
    );

    let app = create_router(AppState::new(&config));

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("Failed to bind {}: {}", addr, err);
            std::process::exit(1);
        }
    };
    tracing::info!("RPS escrow node listening on http://{}", addr);

    if let Err(err) = axum::serve(listener, app).await {
        tracing::error!("Server error: {}", err);
    }
}
