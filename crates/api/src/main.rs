//! SnapTrack - background timer and screenshot capture daemon
//!
//! Main entry point: load configuration, wire the context, serve the
//! loopback surface until Ctrl-C.

use std::sync::Arc;

use anyhow::Context as _;
use snaptrack_lib::utils::logging::init_tracing;
use snaptrack_lib::{AppContext, MessageServer};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before reading configuration so it can feed SNAPTRACK_* vars
    let dotenv = dotenvy::dotenv();

    let config = snaptrack_infra::config::load().context("failed to load configuration")?;
    init_tracing(&config.logging);

    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(err) => warn!(error = %err, "no .env file loaded"),
    }
    if config.sink.api_key.is_none() {
        warn!("sink api key not configured; remote calls will be anonymous");
    }

    info!("SnapTrack starting...");

    let bind_addr = config.server.bind_addr.clone();
    let ctx = Arc::new(AppContext::new_with_config(config).await.context("failed to initialize application")?);
    let server = MessageServer::start(ctx.clone(), &bind_addr).await.context("failed to start message server")?;

    info!(addr = %server.local_addr(), "SnapTrack initialized successfully");

    tokio::signal::ctrl_c().await.context("failed to listen for shutdown signal")?;
    info!("shutdown signal received");

    server.shutdown().await.context("failed to stop message server")?;
    ctx.shutdown().await.context("failed to shut down application context")?;
    Ok(())
}
