//! Engine configuration.
//!
//! Resolution order: CLI flags → environment (`HMM_*`) → TOML config file →
//! built-in defaults. Every table and field is optional:
//!
//! ```toml
//! [fit]
//! max_iterations = 200
//! tolerance = 1e-4
//! zero_occupancy = "uniform"
//!
//! [log]
//! level = "debug"
//! format = "jsonl"
//! ```

use crate::error::ConfigError;
use crate::inference::baum_welch::{FitConfig, ZeroOccupancyPolicy};
use crate::logging::LogConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const ENV_MAX_ITERATIONS: &str = "HMM_MAX_ITERATIONS";
pub const ENV_TOLERANCE: &str = "HMM_TOLERANCE";
pub const ENV_ZERO_OCCUPANCY: &str = "HMM_ZERO_OCCUPANCY";

/// Everything the `hmm` binary can be configured with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub fit: FitConfig,
    pub log: LogConfig,
}

impl EngineConfig {
    /// Parse a TOML document. Missing fields take their defaults.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// File (or defaults) plus process environment, validated.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `HMM_*` overrides read through `lookup`.
    ///
    /// A variable that is set but unparseable is an error, not ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_MAX_ITERATIONS) {
            self.fit.max_iterations = raw
                .trim()
                .parse::<usize>()
                .map_err(|e| invalid(ENV_MAX_ITERATIONS, &raw, e))?;
        }
        if let Some(raw) = lookup(ENV_TOLERANCE) {
            self.fit.tolerance = raw
                .trim()
                .parse::<f64>()
                .map_err(|e| invalid(ENV_TOLERANCE, &raw, e))?;
        }
        if let Some(raw) = lookup(ENV_ZERO_OCCUPANCY) {
            self.fit.zero_occupancy = raw
                .trim()
                .parse::<ZeroOccupancyPolicy>()
                .map_err(|e| invalid(ENV_ZERO_OCCUPANCY, &raw, e))?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.fit.validate()
    }
}

fn invalid(field: &str, raw: &str, err: impl std::fmt::Display) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        message: format!("{:?}: {}", raw, err),
    }
}
