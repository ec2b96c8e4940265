use serde::{Deserialize, Serialize};
use std::path::Path;

use super::cache::CacheConfig;
use super::errors::ConfigError;
use super::logging::LoggingConfig;

/// Main configuration, loaded from an optional TOML file
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Command-line values that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub log_level: Option<String>,
    pub ttl_ms: Option<u64>,
    pub max_cache_size: Option<usize>,
    pub max_concurrent_operations: Option<usize>,
}

impl Config {
    /// Load from `path` (defaults when `None`) and apply CLI overrides.
    pub fn load(path: Option<&str>, overrides: CliOverrides) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(overrides);
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_toml(&raw)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        toml::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    pub fn apply_overrides(&mut self, overrides: CliOverrides) {
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
        if let Some(ttl_ms) = overrides.ttl_ms {
            self.cache.ttl_ms = ttl_ms;
        }
        if let Some(size) = overrides.max_cache_size {
            self.cache.max_cache_size = size;
        }
        if let Some(ops) = overrides.max_concurrent_operations {
            self.cache.max_concurrent_operations = ops;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.cache.validate()?;
        self.logging.validate().map_err(ConfigError::Validation)
    }
}
