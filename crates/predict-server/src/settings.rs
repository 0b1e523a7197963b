//! Process settings

use std::path::PathBuf;

pub const DEFAULT_ADDR: &str = "0.0.0.0:5000";
pub const DEFAULT_CONFIG_PATH: &str = "model_config.json";

/// Where to listen and which model configuration to serve
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings {
    pub addr: String,
    pub config_path: PathBuf,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }
}

impl ServerSettings {
    /// Read `PREDICT_ADDR` and `PREDICT_CONFIG`, falling back to defaults
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            addr: lookup("PREDICT_ADDR").unwrap_or(defaults.addr),
            config_path: lookup("PREDICT_CONFIG")
                .map(PathBuf::from)
                .unwrap_or(defaults.config_path),
        }
    }
}
