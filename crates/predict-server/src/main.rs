//! Predict Server Binary
//!
//! Standalone server for the model prediction API.

use std::sync::Arc;

use predict_core::PredictionService;
use predict_server::{serve, AppState, ServerSettings};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = ServerSettings::from_env();

    let service = PredictionService::load(&settings.config_path).map_err(|e| {
        tracing::error!("Failed to load {:?}: {}", settings.config_path, e);
        e
    })?;

    let metadata = &service.config().metadata;
    tracing::info!("Starting {} v{} API...", metadata.name, metadata.version);
    tracing::info!("Model loaded from: {:?}", metadata.model_file);
    tracing::info!(
        "Features: {}",
        service.config().feature_names().collect::<Vec<_>>().join(", ")
    );

    serve(&settings.addr, Arc::new(AppState::new(service))).await
}
