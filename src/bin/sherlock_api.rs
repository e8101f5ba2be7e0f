//! ChainSherlock API Server
//!
//! REST API for wallet fraud investigation
//!
//! Usage:
//!   cargo run --bin sherlock_api
//!
//! Environment:
//!   PORT / SHERLOCK_PORT - Server port (default: 8080)
//!   SHERLOCK_HOST        - Server host (default: 0.0.0.0)
//!   ETHERSCAN_API_KEY    - Required
//!   RUST_LOG             - Log level (default: info)

use chain_sherlock::api::{create_router, start_cleanup_task, AppState};
use chain_sherlock::{Investigator, InvestigatorConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

const DEFAULT_PORT: u16 = 8080;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    dotenvy::dotenv().ok();

    FmtSubscriber::builder()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let config = InvestigatorConfig::from_env()?;
    let investigator = Arc::new(Investigator::from_config(&config)?);
    let telemetry = investigator.telemetry();

    if config.telegram.is_some() {
        info!("📨 Telegram alerts enabled");
    }

    let state = Arc::new(AppState::new(investigator));

    start_cleanup_task();
    info!("🧹 Background cleanup task started");

    let app = create_router(state);

    // Hosting platforms set PORT, SHERLOCK_PORT is for local dev
    let host = std::env::var("SHERLOCK_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("PORT")
        .or_else(|_| std::env::var("SHERLOCK_PORT"))
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(DEFAULT_PORT);

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

    info!("🕵️ ChainSherlock API starting on http://{} ({})", addr, config.chain_name());
    info!("Endpoints:");
    info!("  POST /v1/investigate - Full wallet investigation");
    info!("  GET  /v1/stats       - Investigation statistics");
    info!("  GET  /v1/health      - Health check");

    let listener = TcpListener::bind(addr).await?;

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("⚠️ Failed to listen for Ctrl+C: {}", e);
        }
    };

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("🛑 Shutdown signal received");
    info!("{}", telemetry.get_stats().summary());
    info!("👋 ChainSherlock API shutdown complete");

    Ok(())
}
