//! Overlay backend binary for SideQuest.
//!
//! This is the main entry point that wires together the world store,
//! the 10 Hz broadcaster, the vision pipeline, and the HTTP/`WebSocket`
//! server. It loads configuration, initializes all subsystems, and
//! serves until Ctrl-C.
//!
//! # Startup Sequence
//!
//! 1. Initialize structured logging (tracing)
//! 2. Load configuration from `sidequest-config.yaml`
//! 3. Build the gazetteer and world store at the start position
//! 4. Build the LLM backend and prompt engine for the vision pipeline
//! 5. Spawn the broadcaster task
//! 6. Optionally spawn the simulated GPS producer
//! 7. Serve HTTP/`WebSocket` until the shutdown signal

mod error;
mod gps_sim;

use std::sync::Arc;
use std::time::Duration;

use sidequest_core::config::BackendConfig;
use sidequest_core::gazetteer::Gazetteer;
use sidequest_core::store::WorldStore;
use sidequest_server::state::AppState;
use sidequest_server::{run_broadcaster, start_server};
use sidequest_vision::{create_backend, BackendType, LlmBackendConfig, PromptEngine, VisionPipeline};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::BackendError;

/// Application entry point for the overlay backend.
///
/// # Errors
///
/// Returns an error if configuration or vision setup fails, or if the
/// HTTP server cannot bind.
#[tokio::main]
async fn main() -> Result<(), BackendError> {
    // 1. Initialize structured logging.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("sidequest-backend starting");

    // 2. Load configuration.
    let config = BackendConfig::load_or_default("sidequest-config.yaml")?;
    info!(
        host = config.server.host,
        port = config.server.port,
        broadcast_interval_ms = config.world.broadcast_interval_ms,
        history_size = config.world.history_size,
        vision_backend = config.vision.backend,
        mock_gps = config.demo.mock_gps,
        "Configuration loaded"
    );

    // 3. Build the world store at the start position.
    let store = WorldStore::new(
        config.world.start_lat,
        config.world.start_lon,
        Gazetteer::new(),
        config.world.poi_radius_km,
    );
    info!(
        start_lat = config.world.start_lat,
        start_lon = config.world.start_lon,
        poi_radius_km = config.world.poi_radius_km,
        "World store initialized"
    );

    // 4. Build the vision pipeline.
    let api_key = std::env::var(&config.vision.api_key_env).unwrap_or_default();
    if api_key.is_empty() {
        warn!(
            env_var = config.vision.api_key_env,
            "API key not set, vision producer will fail closed to safe defaults"
        );
    }
    let backend = create_backend(&LlmBackendConfig {
        backend_type: BackendType::parse(&config.vision.backend)?,
        api_url: config.vision.api_url.clone(),
        api_key,
        model: config.vision.model.clone(),
    });
    let prompt_engine = match PromptEngine::new(&config.vision.templates_dir) {
        Ok(engine) => engine,
        Err(e) => {
            warn!(
                templates_dir = config.vision.templates_dir,
                error = %e,
                "failed to load prompt templates, using built-in prompts"
            );
            PromptEngine::builtin()
        }
    };
    let pipeline = Arc::new(VisionPipeline::new(
        store.clone(),
        backend,
        prompt_engine,
        config.world.history_size,
        Duration::from_millis(config.vision.request_timeout_ms),
    ));
    info!("Vision pipeline initialized");

    // 5. Spawn the broadcaster.
    let app_state = Arc::new(AppState::new(store.clone(), pipeline));
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let broadcaster = tokio::spawn(run_broadcaster(
        store.clone(),
        app_state.tx.clone(),
        Duration::from_millis(config.world.broadcast_interval_ms),
        shutdown_rx.clone(),
    ));
    info!(
        interval_ms = config.world.broadcast_interval_ms,
        "Broadcaster started"
    );

    // 6. Optionally spawn the simulated GPS producer.
    if config.demo.mock_gps {
        tokio::spawn(gps_sim::run_gps_sim(
            store,
            config.world.start_lat,
            config.world.start_lon,
            Duration::from_millis(config.demo.mock_gps_interval_ms),
            shutdown_rx.clone(),
        ));
        info!(
            interval_ms = config.demo.mock_gps_interval_ms,
            "Simulated GPS producer started"
        );
    }

    // 7. Translate Ctrl-C into the shutdown signal.
    let signal_tx = shutdown_tx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl-C received, shutting down");
            let _ = signal_tx.send(true);
        }
    });

    // 8. Serve until shutdown.
    start_server(
        &config.server.host,
        config.server.port,
        app_state,
        shutdown_rx,
    )
    .await?;

    // The broadcaster observes the same signal; wait for it to drain.
    let _ = shutdown_tx.send(true);
    let _ = broadcaster.await;

    info!("sidequest-backend shutdown complete");
    Ok(())
}
