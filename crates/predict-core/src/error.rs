//! Error types for predict-core

use serde_json::Value;
use thiserror::Error;

/// Result type alias for prediction operations
pub type Result<T> = std::result::Result<T, PredictError>;

/// Errors raised while handling a single prediction request
#[derive(Error, Debug)]
pub enum PredictError {
    /// Request carried no feature values
    #[error("No data provided")]
    NoData,

    /// Request body is not a JSON object of feature values
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// A feature value could not be encoded
    #[error(transparent)]
    Encoding(#[from] EncodingError),

    /// The model failed to produce a prediction
    #[error("Prediction failed: {0}")]
    Model(#[from] ModelError),
}

impl PredictError {
    /// Whether the failure was caused by the request rather than the service
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PredictError::NoData | PredictError::InvalidRequest(_) | PredictError::Encoding(_)
        )
    }
}

/// Feature encoding errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EncodingError {
    /// The request omitted a configured feature
    #[error("Missing value for {0}")]
    MissingFeature(String),

    /// Value does not match any entry of the encoding table
    #[error("Invalid value for {0}: {}", render_value(.1))]
    InvalidCategoricalValue(String, Value),

    /// Value cannot be coerced to a number
    #[error("Invalid value for {0}: {}", render_value(.1))]
    InvalidNumericValue(String, Value),
}

impl EncodingError {
    /// Name of the feature that failed to encode
    pub fn feature(&self) -> &str {
        match self {
            EncodingError::MissingFeature(name)
            | EncodingError::InvalidCategoricalValue(name, _)
            | EncodingError::InvalidNumericValue(name, _) => name,
        }
    }
}

// Strings are shown bare, everything else as JSON
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Model artifact and inference errors
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Model parse error: {0}")]
    Parse(String),

    /// Artifact parsed but is structurally unusable
    #[error("Invalid model artifact: {0}")]
    InvalidArtifact(String),

    /// Input row width differs from what the model was trained on
    #[error("X has {actual} features, but the model is expecting {expected} features as input")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("Model returned {0} outputs for a single input row")]
    UnexpectedOutput(usize),

    /// Decoded prediction is NaN or infinite
    #[error("prediction is not a finite number ({0})")]
    NonFinite(f64),

    #[error("{0}")]
    Internal(String),
}

/// Errors raised while loading the model configuration at startup
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("JSON parse error: {0}")]
    Parse(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid feature type for {feature}: {found}")]
    InvalidFeatureType { feature: String, found: String },

    #[error("Unsupported scaling type for {target}: {found}")]
    InvalidScaling { target: String, found: String },

    #[error("Invalid encoding code for {feature}: {code}")]
    InvalidEncodingCode { feature: String, code: String },

    #[error("Duplicate display value for {feature}: {value}")]
    DuplicateDisplayValue { feature: String, value: String },

    #[error("Duplicate feature name: {0}")]
    DuplicateFeature(String),

    #[error("Configuration declares no features")]
    NoFeatures,

    /// The model's input width disagrees with the declared features
    #[error("Model expects {model} features but configuration declares {configured}")]
    FeatureCountMismatch { model: usize, configured: usize },

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}
