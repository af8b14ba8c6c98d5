mod config;
mod engine;
mod leaderboard;
mod metrics;
mod reputation;
mod seed;
mod store;
mod web;

use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::engine::TrustEngine;
use crate::web::server::WebServer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load config
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "tiker-trust.toml".to_string());

    let config = Config::load(&config_path)?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.filter.as_str().into());
    if config.logging.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    info!("tiker-trust v{} starting...", env!("CARGO_PKG_VERSION"));
    info!("Config loaded from {}", config_path);

    let config = Arc::new(config);

    // Build engine (store, leaderboard, metrics) and load seed data
    let engine = Arc::new(TrustEngine::from_config(config)?);
    info!("Store ready with {} agents", engine.store.agent_count());

    WebServer::new(engine).run().await
}
