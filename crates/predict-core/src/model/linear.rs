//! Linear regression

use serde::Deserialize;

use super::{check_width, Regressor};
use crate::error::ModelError;

/// `y = coefficients · x + intercept`
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "RawLinear")]
pub struct LinearRegressor {
    coefficients: Vec<f64>,
    intercept: f64,
}

#[derive(Deserialize)]
struct RawLinear {
    coefficients: Vec<f64>,
    #[serde(default)]
    intercept: f64,
}

impl TryFrom<RawLinear> for LinearRegressor {
    type Error = ModelError;

    fn try_from(raw: RawLinear) -> Result<Self, Self::Error> {
        Self::new(raw.coefficients, raw.intercept)
    }
}

impl LinearRegressor {
    pub fn new(coefficients: Vec<f64>, intercept: f64) -> Result<Self, ModelError> {
        if coefficients.is_empty() {
            return Err(ModelError::InvalidArtifact(
                "linear model has no coefficients".to_string(),
            ));
        }
        Ok(Self {
            coefficients,
            intercept,
        })
    }
}

impl Regressor for LinearRegressor {
    fn n_features(&self) -> usize {
        self.coefficients.len()
    }

    fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>, ModelError> {
        rows.iter()
            .map(|row| {
                check_width(self.coefficients.len(), row)?;
                let dot: f64 = self
                    .coefficients
                    .iter()
                    .zip(row)
                    .map(|(w, x)| w * x)
                    .sum();
                Ok(dot + self.intercept)
            })
            .collect()
    }
}
