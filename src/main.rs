use anyhow::Result;
use dotenv::dotenv;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use social_visibility_engine::api::{self, AppState};
use social_visibility_engine::config::Config;
use social_visibility_engine::media::media_channel;
use social_visibility_engine::store::Store;
use social_visibility_engine::worker::MediaWorker;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file if present
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,social_visibility_engine=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::init()?;
    info!("Initialized configuration");

    // Authoritative in-memory state
    let store = Arc::new(Store::new());

    // Media pipeline: upload-complete events flow to the async worker
    let (media_tx, media_rx) = media_channel();
    let worker = MediaWorker::new(
        store.clone(),
        media_rx,
        Duration::from_millis(config.media.processing_delay_ms),
    );
    let worker_handle = tokio::spawn(worker.run());

    // Start API server
    let state = AppState::new(store, media_tx);
    let api_handle = tokio::spawn(async move {
        if let Err(e) = api::start_api_server(state).await {
            error!("API server error: {}", e);
        }
    });

    // Handle shutdown signal
    signal::ctrl_c().await?;
    info!("Shutdown signal received, initiating graceful shutdown");
    api_handle.abort();
    worker_handle.abort();

    info!("Visibility engine shutdown complete");
    Ok(())
}
