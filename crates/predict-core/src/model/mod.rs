//! Model adapters
//!
//! The prediction pipeline only sees the [`Regressor`] trait. Artifacts are
//! JSON documents tagged by `type`:
//!
//! ```json
//! { "type": "linear", "coefficients": [0.8, 0.3], "intercept": 0.05 }
//! ```
//!
//! ```json
//! {
//!   "type": "tree_ensemble",
//!   "n_features": 2,
//!   "aggregation": "mean",
//!   "trees": [
//!     { "nodes": [
//!       { "feature": 0, "threshold": 0.5, "left": 1, "right": 2 },
//!       { "value": 0.2 },
//!       { "value": 0.7 }
//!     ] }
//!   ]
//! }
//! ```

mod linear;
mod tree;

pub use linear::LinearRegressor;
pub use tree::{Aggregation, Node, Tree, TreeEnsemble};

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::ModelError;

/// A trained regression model with a fixed input width
pub trait Regressor: Send + Sync + fmt::Debug {
    /// Number of inputs every row must carry
    fn n_features(&self) -> usize;

    /// Predict one output per input row
    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError>;

    /// Predict a single row, extracting the sole output
    fn predict_one(&self, row: &[f64]) -> Result<f64, ModelError> {
        let outputs = self.predict(&[row.to_vec()])?;
        match outputs.as_slice() {
            [y] => Ok(*y),
            other => Err(ModelError::UnexpectedOutput(other.len())),
        }
    }
}

/// Reject rows whose width differs from the model's
pub(crate) fn check_width(expected: usize, row: &[f64]) -> Result<(), ModelError> {
    if row.len() != expected {
        return Err(ModelError::ShapeMismatch {
            expected,
            actual: row.len(),
        });
    }
    Ok(())
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Artifact {
    Linear(LinearRegressor),
    TreeEnsemble(TreeEnsemble),
}

impl Artifact {
    fn into_regressor(self) -> Arc<dyn Regressor> {
        match self {
            Artifact::Linear(model) => Arc::new(model),
            Artifact::TreeEnsemble(model) => Arc::new(model),
        }
    }
}

/// Parse a model artifact from a JSON string
pub fn model_from_json(json: &str) -> Result<Arc<dyn Regressor>, ModelError> {
    let artifact: Artifact =
        serde_json::from_str(json).map_err(|e| ModelError::Parse(e.to_string()))?;
    Ok(artifact.into_regressor())
}

/// Load a model artifact from disk
pub fn load_model(path: &Path) -> Result<Arc<dyn Regressor>, ModelError> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| ModelError::Io(format!("{}: {}", path.display(), e)))?;
    let model = model_from_json(&content)?;
    tracing::debug!(
        "Loaded model from {:?} with {} input features",
        path,
        model.n_features()
    );
    Ok(model)
}
