//! Runtime configuration for the footprint session.
//!
//! Loaded from a JSON file, the `CYBOAIR_FOOTPRINT_CONFIG` environment variable, or the
//! builtin copy compiled into the crate.

use std::{
    env, fs, io,
    path::{Path, PathBuf},
    time::Duration,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::derive::{EmissionFactors, NumericPolicy};
use crate::record::EmissionsRecord;

pub const BUILTIN_FOOTPRINT_CONFIG: &str = include_str!("data/footprint_config.json");
pub const CONFIG_ENV_VAR: &str = "CYBOAIR_FOOTPRINT_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Simulated latencies, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DelayConfig {
    pub processing_ms: u64,
    pub export_ms: u64,
    pub redirect_ms: u64,
    pub downloaded_flag_ms: u64,
}

impl Default for DelayConfig {
    fn default() -> Self {
        Self {
            processing_ms: 1500,
            export_ms: 1500,
            redirect_ms: 2000,
            downloaded_flag_ms: 3000,
        }
    }
}

impl DelayConfig {
    /// All delays zeroed, for scripted runs.
    pub fn immediate() -> Self {
        Self {
            processing_ms: 0,
            export_ms: 0,
            redirect_ms: 0,
            downloaded_flag_ms: 0,
        }
    }

    pub fn processing(&self) -> Duration {
        Duration::from_millis(self.processing_ms)
    }

    pub fn export(&self) -> Duration {
        Duration::from_millis(self.export_ms)
    }

    pub fn redirect(&self) -> Duration {
        Duration::from_millis(self.redirect_ms)
    }

    pub fn downloaded_flag(&self) -> Duration {
        Duration::from_millis(self.downloaded_flag_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FootprintConfig {
    pub defaults: EmissionsRecord,
    pub factors: EmissionFactors,
    pub numeric_policy: NumericPolicy,
    pub delays: DelayConfig,
}

impl Default for FootprintConfig {
    fn default() -> Self {
        Self {
            defaults: EmissionsRecord::DEFAULT,
            factors: EmissionFactors::default(),
            numeric_policy: NumericPolicy::default(),
            delays: DelayConfig::default(),
        }
    }
}

impl FootprintConfig {
    pub fn builtin() -> Result<Self, ConfigError> {
        Self::from_json_str(BUILTIN_FOOTPRINT_CONFIG)
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&contents)
    }

    /// Explicit path first, then the environment override, then the builtin.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            debug!(path = %path.display(), "loading footprint config");
            return Self::from_file(path);
        }
        match env::var_os(CONFIG_ENV_VAR) {
            Some(value) if !value.is_empty() => {
                let path = PathBuf::from(value);
                debug!(path = %path.display(), "loading footprint config from environment");
                Self::from_file(&path)
            }
            _ => Self::builtin(),
        }
    }
}
