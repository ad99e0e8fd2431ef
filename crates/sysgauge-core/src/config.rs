//! Sampler configuration.
//!
//! Keys follow the agent's `[plugin:macos:sysctl]` section names, so a JSON
//! file like the one below maps one-to-one:
//!
//! ```json
//! { "update every": 1, "enable load average": true, "system swap": true, "bandwidth": false }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// The file could not be read.
    Io(std::io::Error),
    /// The file is not valid configuration JSON.
    Parse(String),
    /// A value is out of range.
    Invalid(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "I/O error: {}", e),
            ConfigError::Parse(msg) => write!(f, "parse error: {}", msg),
            ConfigError::Invalid(msg) => write!(f, "invalid config: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

/// What to sample and how often the host agent ticks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Configured collection interval.
    #[serde(rename = "update every", with = "crate::sink::duration_secs")]
    pub update_every: Duration,
    #[serde(rename = "enable load average")]
    pub load_average: bool,
    #[serde(rename = "system swap")]
    pub swap: bool,
    #[serde(rename = "bandwidth")]
    pub bandwidth: bool,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            update_every: Duration::from_secs(1),
            load_average: true,
            swap: true,
            bandwidth: true,
        }
    }
}

impl SamplerConfig {
    /// Parses configuration from JSON; missing keys keep their defaults.
    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Rejects values the sampler cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.update_every.is_zero() {
            return Err(ConfigError::Invalid(
                "update every must be at least 1 second".to_string(),
            ));
        }
        Ok(())
    }
}
