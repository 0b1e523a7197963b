//! HTTP endpoint handlers

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use predict_core::{PredictError, PredictionResult};

use crate::AppState;

/// Error response body
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Failure returned by a handler
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
        }
    }
}

impl From<PredictError> for ApiError {
    fn from(err: PredictError) -> Self {
        if err.is_client_error() {
            tracing::warn!("Rejected prediction request: {}", err);
            Self::bad_request(err.to_string())
        } else {
            tracing::error!("{}", err);
            Self::internal(err.to_string())
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorResponse {
                error: self.message,
            }),
        )
            .into_response()
    }
}

/// API information
pub async fn home(State(state): State<Arc<AppState>>) -> Json<Value> {
    let metadata = &state.service.config().metadata;
    Json(serde_json::json!({
        "message": "ML Model Prediction API",
        "model": metadata.name,
        "version": metadata.version,
        "endpoints": {
            "/config": "GET - Get model configuration",
            "/predict": "POST - Make a prediction"
        }
    }))
}

/// The model configuration document as loaded
pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(state.service.config().document().clone())
}

/// Make a prediction
///
/// Takes the raw body so that a missing or empty body is reported as a
/// client error rather than an extractor rejection.
pub async fn predict(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<PredictionResult>, ApiError> {
    let body = parse_body(&body)?;

    // Inference is CPU-bound; keep it off the async workers
    let service = state.service.clone();
    let result = tokio::task::spawn_blocking(move || service.predict_json(body))
        .await
        .map_err(|e| {
            tracing::error!("Prediction task failed: {}", e);
            ApiError::internal(format!("Prediction failed: {}", e))
        })??;

    Ok(Json(result))
}

fn parse_body(body: &[u8]) -> Result<Option<Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(body)
        .map(Some)
        .map_err(|e| ApiError::bad_request(format!("Invalid JSON: {}", e)))
}
