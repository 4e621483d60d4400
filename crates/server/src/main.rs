//! Maintenance Server - fleet maintenance risk prediction
//!
//! Trains the maintenance model on a synthetic corpus at startup and serves
//! per-vehicle predictions over HTTP.

use anyhow::Result;
use engine_lib::{
    health::{components, HealthRegistry},
    observability::StructuredLogger,
    InMemoryVehicleStore, ModelCache, PredictionService, TrainingPipeline,
};
use maintenance_server::{api, config::ServerConfig};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing with JSON output and env filter
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    info!("Starting maintenance-server");

    let config = ServerConfig::load()?;
    info!(
        instance = %config.instance_name,
        corpus_size = config.corpus_size,
        corpus_seed = config.corpus_seed,
        "Server configured"
    );

    let health_registry = HealthRegistry::new();
    health_registry.register(components::TRAINER).await;
    health_registry.register(components::PREDICTOR).await;
    health_registry.register(components::VEHICLE_STORE).await;

    let vehicles = match &config.vehicles_path {
        Some(path) => match InMemoryVehicleStore::load(path) {
            Ok(store) => store,
            Err(e) => {
                warn!(error = %e, "Vehicle file unusable, starting with an empty fleet");
                health_registry
                    .set_degraded(components::VEHICLE_STORE, e.to_string())
                    .await;
                InMemoryVehicleStore::new()
            }
        },
        None => {
            info!("No vehicle file configured, starting with an empty fleet");
            InMemoryVehicleStore::new()
        }
    };

    let logger = StructuredLogger::new(&config.instance_name);
    logger.log_startup(SERVER_VERSION);

    let cache = Arc::new(ModelCache::new());
    let predictions = PredictionService::new(cache, Arc::new(vehicles), logger.clone());
    let app_state = Arc::new(api::AppState::new(
        health_registry.clone(),
        logger.clone(),
        predictions,
        config.corpus(),
        TrainingPipeline::new(config.split_seed),
    ));

    // Health and metrics are reachable while the first model trains
    let api_handle = tokio::spawn(api::serve(config.api_port, app_state.clone()));

    // A failed startup training leaves the server up with predictions unavailable
    if let Err(e) = app_state.train_and_publish(config.corpus()).await {
        warn!(error = ?e, "Initial training failed, predictions unavailable until retrain");
    }

    tokio::select! {
        result = api_handle => {
            warn!("API server exited");
            result??;
        }
        signal = tokio::signal::ctrl_c() => {
            signal?;
            logger.log_shutdown("SIGINT received");
        }
    }

    info!("Shutting down");
    Ok(())
}
