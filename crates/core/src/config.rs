//! Configuration management for mission scoring.

use crate::criticality::CriticalityConfig;
use crate::importance::ImportanceConfig;
use crate::normalization::NormalizationConfig;
use crate::propagation::PropagationConfig;
use serde::{Deserialize, Serialize};
#[cfg(feature = "toml")]
use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[cfg(feature = "toml")]
    #[error("Failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Decimals written per CSV cell
    pub precision: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { precision: 4 }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub propagation: PropagationConfig,
    pub normalization: NormalizationConfig,
    pub criticality: CriticalityConfig,
    pub importance: ImportanceConfig,
    pub output: OutputConfig,
}

impl Config {
    #[cfg(feature = "toml")]
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    #[cfg(feature = "toml")]
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self::default()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.normalization
            .check_range()
            .map_err(|e| ConfigError::ValidationError(format!("normalization: {}", e)))?;
        if !(self.criticality.lower < self.criticality.upper) {
            return Err(ConfigError::ValidationError(format!(
                "criticality: lower ({}) must be below upper ({})",
                self.criticality.lower, self.criticality.upper
            )));
        }
        self.importance
            .validate()
            .map_err(|e| ConfigError::ValidationError(format!("importance: {}", e)))?;
        Ok(())
    }
}
