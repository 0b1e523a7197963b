//! Feature encoding
//!
//! Turns a map of named raw values into the positional vector the model was
//! trained on. Position `i` of the vector always holds feature `i` of the
//! configuration, whatever order the request keys arrive in.

use serde_json::{Map, Value};

use crate::config::{FeatureKind, FeatureSpec};
use crate::error::EncodingError;

/// Encoder bound to an ordered feature list
#[derive(Debug, Clone, Copy)]
pub struct FeatureCodec<'a> {
    features: &'a [FeatureSpec],
}

impl<'a> FeatureCodec<'a> {
    pub fn new(features: &'a [FeatureSpec]) -> Self {
        Self { features }
    }

    /// Length of every vector this codec produces
    pub fn width(&self) -> usize {
        self.features.len()
    }

    /// Encode a request into the model's input vector
    ///
    /// Stops at the first feature that fails; no partial vector is returned.
    /// Keys that do not name a configured feature are ignored.
    pub fn encode(&self, input: &Map<String, Value>) -> Result<Vec<f64>, EncodingError> {
        self.features
            .iter()
            .map(|spec| {
                let value = input
                    .get(&spec.name)
                    .ok_or_else(|| EncodingError::MissingFeature(spec.name.clone()))?;
                encode_value(spec, value)
            })
            .collect()
    }

    /// Map an encoded vector back to display values
    ///
    /// Returns `None` when the vector has the wrong width or holds a code
    /// that is not in a feature's table.
    pub fn decode(&self, vector: &[f64]) -> Option<Map<String, Value>> {
        if vector.len() != self.features.len() {
            return None;
        }

        let mut out = Map::with_capacity(vector.len());
        for (spec, &x) in self.features.iter().zip(vector) {
            let value = match &spec.kind {
                FeatureKind::Categorical(table) => {
                    if x < 0.0 || x.fract() != 0.0 || x > u32::MAX as f64 {
                        return None;
                    }
                    Value::String(table.value_for(x as u32)?.to_string())
                }
                FeatureKind::Numeric { scaling } => {
                    Value::from(scaling.map_or(x, |s| s.unscale(x)))
                }
            };
            out.insert(spec.name.clone(), value);
        }
        Some(out)
    }
}

/// Encode a single raw value according to its feature spec
pub fn encode_value(spec: &FeatureSpec, value: &Value) -> Result<f64, EncodingError> {
    match &spec.kind {
        FeatureKind::Categorical(table) => value
            .as_str()
            .and_then(|s| table.code_for(s))
            .map(f64::from)
            .ok_or_else(|| EncodingError::InvalidCategoricalValue(spec.name.clone(), value.clone())),
        FeatureKind::Numeric { scaling } => {
            let x = coerce_number(value)
                .ok_or_else(|| EncodingError::InvalidNumericValue(spec.name.clone(), value.clone()))?;
            Ok(scaling.map_or(x, |s| s.scale(x)))
        }
    }
}

/// Coerce a JSON value to a float
///
/// Accepts numbers, numeric strings (surrounding whitespace allowed) and
/// booleans. Null, arrays and objects are rejected, as are strings that
/// spell a non-finite value such as `"nan"` or `"inf"`.
pub fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|x| x.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}
