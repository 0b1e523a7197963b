//! Model configuration
//!
//! The configuration document is a JSON file with the following structure:
//!
//! ```json
//! {
//!   "model": {
//!     "name": "Salary Predictor",
//!     "version": "1.0",
//!     "model_file": "model.json"
//!   },
//!   "features": [
//!     {
//!       "name": "Age",
//!       "type": "numeric",
//!       "scaling": { "type": "minmax", "min_value": 18, "max_value": 70 }
//!     },
//!     {
//!       "name": "Level",
//!       "type": "categorical",
//!       "encoding": { "0": "Junior", "1": "Senior" }
//!     }
//!   ],
//!   "output": {
//!     "scaling": { "type": "minmax", "min_value": 30000, "max_value": 150000 },
//!     "unit": "USD"
//!   }
//! }
//! ```
//!
//! Feature order is the positional contract with the model. The document is
//! kept verbatim next to the parsed form so it can be served back unchanged,
//! including presentation fields this crate does not interpret.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::scaling::MinMax;

/// Identifying information about the served model
#[derive(Debug, Clone, PartialEq)]
pub struct ModelMetadata {
    pub name: String,
    pub version: String,
    /// Location of the model artifact
    pub model_file: PathBuf,
}

/// Mapping between integer codes and display values, in table order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodingTable {
    entries: Vec<(u32, String)>,
}

impl EncodingTable {
    pub fn new(entries: Vec<(u32, String)>) -> Self {
        Self { entries }
    }

    /// Code for a display value; the first entry in table order wins
    pub fn code_for(&self, value: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(_, display)| display == value)
            .map(|(code, _)| *code)
    }

    /// Display value for a code
    pub fn value_for(&self, code: u32) -> Option<&str> {
        self.entries
            .iter()
            .find(|(c, _)| *c == code)
            .map(|(_, display)| display.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.entries.iter().map(|(code, display)| (*code, display.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether the codes are exactly `0..len` in some order
    pub fn is_dense(&self) -> bool {
        let codes: HashSet<u32> = self.entries.iter().map(|(code, _)| *code).collect();
        codes.len() == self.entries.len() && (0..self.entries.len() as u32).all(|c| codes.contains(&c))
    }
}

/// How a feature's raw value becomes a number
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureKind {
    Categorical(EncodingTable),
    Numeric { scaling: Option<MinMax> },
}

/// One model input feature
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureSpec {
    pub name: String,
    pub kind: FeatureKind,
}

impl FeatureSpec {
    pub fn categorical<'a>(
        name: impl Into<String>,
        entries: impl IntoIterator<Item = (u32, &'a str)>,
    ) -> Self {
        Self {
            name: name.into(),
            kind: FeatureKind::Categorical(EncodingTable::new(
                entries
                    .into_iter()
                    .map(|(code, display)| (code, display.to_string()))
                    .collect(),
            )),
        }
    }

    pub fn numeric(name: impl Into<String>, scaling: Option<MinMax>) -> Self {
        Self {
            name: name.into(),
            kind: FeatureKind::Numeric { scaling },
        }
    }
}

/// How the model's raw output maps back to display units
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSpec {
    pub scaling: Option<MinMax>,
    pub unit: String,
}

/// Root configuration, immutable once loaded
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub metadata: ModelMetadata,
    pub features: Vec<FeatureSpec>,
    pub output: OutputSpec,
    document: Value,
}

impl ModelConfig {
    /// Load configuration from a JSON file
    ///
    /// A relative `model_file` is resolved against the directory holding
    /// the configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;

        let mut config = Self::from_json(&content)?;

        if config.metadata.model_file.is_relative() {
            if let Some(dir) = path.parent() {
                config.metadata.model_file = dir.join(&config.metadata.model_file);
            }
        }

        tracing::debug!(
            "Loaded configuration for {} v{} from {:?}",
            config.metadata.name,
            config.metadata.version,
            path
        );

        Ok(config)
    }

    /// Parse configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let document: Value =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        Self::from_value(document)
    }

    /// Parse configuration from an already decoded JSON document
    pub fn from_value(document: Value) -> Result<Self, ConfigError> {
        let raw: RawConfig = serde_json::from_value(document.clone())
            .map_err(|e| ConfigError::Parse(e.to_string()))?;

        if raw.features.is_empty() {
            return Err(ConfigError::NoFeatures);
        }

        let mut seen = HashSet::new();
        let mut features = Vec::with_capacity(raw.features.len());
        for feature in raw.features {
            if !seen.insert(feature.name.clone()) {
                return Err(ConfigError::DuplicateFeature(feature.name));
            }
            features.push(parse_feature(feature)?);
        }

        let output = OutputSpec {
            scaling: raw
                .output
                .scaling
                .map(|s| parse_scaling("output", s))
                .transpose()?,
            unit: raw.output.unit,
        };

        Ok(Self {
            metadata: ModelMetadata {
                name: raw.model.name,
                version: render_version(raw.model.version)?,
                model_file: PathBuf::from(raw.model.model_file),
            },
            features,
            output,
            document,
        })
    }

    /// The configuration document exactly as it was supplied
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Feature names in vector order
    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.name.as_str())
    }
}

#[derive(Debug, Deserialize)]
struct RawConfig {
    model: RawModel,
    features: Vec<RawFeature>,
    output: RawOutput,
}

#[derive(Debug, Deserialize)]
struct RawModel {
    name: String,
    /// A string, or a bare number such as `1.0`
    version: Value,
    model_file: String,
}

fn render_version(version: Value) -> Result<String, ConfigError> {
    match version {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        other => Err(ConfigError::Parse(format!(
            "model.version must be a string or a number, found {}",
            other
        ))),
    }
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    encoding: Option<Map<String, Value>>,
    #[serde(default)]
    scaling: Option<RawScaling>,
}

#[derive(Debug, Deserialize)]
struct RawScaling {
    #[serde(rename = "type")]
    kind: String,
    min_value: f64,
    max_value: f64,
}

#[derive(Debug, Deserialize)]
struct RawOutput {
    #[serde(default)]
    scaling: Option<RawScaling>,
    unit: String,
}

fn parse_feature(raw: RawFeature) -> Result<FeatureSpec, ConfigError> {
    let kind = match raw.kind.to_lowercase().as_str() {
        "categorical" => {
            let encoding = raw
                .encoding
                .ok_or_else(|| ConfigError::MissingField(format!("features.{}.encoding", raw.name)))?;
            FeatureKind::Categorical(parse_encoding(&raw.name, encoding)?)
        }
        "numeric" => FeatureKind::Numeric {
            scaling: raw
                .scaling
                .map(|s| parse_scaling(&raw.name, s))
                .transpose()?,
        },
        _ => {
            return Err(ConfigError::InvalidFeatureType {
                feature: raw.name,
                found: raw.kind,
            })
        }
    };

    Ok(FeatureSpec {
        name: raw.name,
        kind,
    })
}

fn parse_encoding(feature: &str, encoding: Map<String, Value>) -> Result<EncodingTable, ConfigError> {
    let mut entries = Vec::with_capacity(encoding.len());
    let mut displays = HashSet::new();

    for (code, display) in encoding {
        let parsed = code
            .trim()
            .parse::<u32>()
            .map_err(|_| ConfigError::InvalidEncodingCode {
                feature: feature.to_string(),
                code: code.clone(),
            })?;

        let display = match display {
            Value::String(s) => s,
            other => {
                return Err(ConfigError::Parse(format!(
                    "encoding value for {} code {} must be a string, found {}",
                    feature, code, other
                )))
            }
        };

        if !displays.insert(display.clone()) {
            return Err(ConfigError::DuplicateDisplayValue {
                feature: feature.to_string(),
                value: display,
            });
        }

        entries.push((parsed, display));
    }

    let table = EncodingTable::new(entries);
    if !table.is_dense() {
        tracing::warn!("Encoding codes for {} are not contiguous from 0", feature);
    }

    Ok(table)
}

fn parse_scaling(target: &str, raw: RawScaling) -> Result<MinMax, ConfigError> {
    match raw.kind.to_lowercase().as_str() {
        "minmax" => Ok(MinMax::new(raw.min_value, raw.max_value)),
        _ => Err(ConfigError::InvalidScaling {
            target: target.to_string(),
            found: raw.kind,
        }),
    }
}
