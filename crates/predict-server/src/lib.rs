//! Predict Server - model prediction API
//!
//! HTTP server exposing a configured regression model.

pub mod http;
pub mod settings;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use predict_core::PredictionService;

pub use settings::ServerSettings;

/// Shared application state
///
/// Built once at startup and never mutated, so handlers share it without locking.
pub struct AppState {
    pub service: PredictionService,
}

impl AppState {
    pub fn new(service: PredictionService) -> Self {
        Self { service }
    }
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(http::home))
        .route("/config", get(http::get_config))
        .route("/predict", post(http::predict))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the server
pub async fn serve(addr: &str, state: Arc<AppState>) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("API running on http://{}", addr);
    axum::serve(listener, app).await?;
    Ok(())
}
