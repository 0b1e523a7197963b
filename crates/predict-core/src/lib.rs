//! Predict Core - configuration-driven regression inference
//!
//! This crate holds everything between untyped client input and a trained
//! model's numeric contract:
//!
//! - **Config**: the model configuration document (feature order, encodings, scaling)
//! - **Codec**: encodes named raw values into the model's positional input vector
//! - **Decoder**: maps raw model output back to display units
//! - **Model**: the [`Regressor`] trait and JSON artifact adapters
//! - **Service**: the per-request pipeline tying these together
//!
//! # Pipeline
//!
//! ```text
//! {name: value} → FeatureCodec → [f64] → Regressor → f64 → OutputDecoder → f64
//! ```

pub mod codec;
pub mod config;
pub mod decoder;
pub mod error;
pub mod model;
pub mod scaling;
pub mod service;

pub use codec::{coerce_number, encode_value, FeatureCodec};
pub use config::{EncodingTable, FeatureKind, FeatureSpec, ModelConfig, ModelMetadata, OutputSpec};
pub use decoder::OutputDecoder;
pub use error::{ConfigError, EncodingError, ModelError, PredictError, Result};
pub use model::{load_model, model_from_json, LinearRegressor, Regressor, TreeEnsemble};
pub use scaling::MinMax;
pub use service::{PredictionResult, PredictionService};
