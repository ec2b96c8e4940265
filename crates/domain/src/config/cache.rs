use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::compression::CompressionConfig;
use super::errors::ConfigError;
use super::monitoring::MonitoringConfig;
use super::retry::RetryConfig;
use super::scaling::ScalingConfig;

/// Validation-result cache configuration
///
/// Built once at construction and never mutated afterwards; runtime scaling works on
/// a factor applied on top of these base values.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    /// Entry lifetime measured from creation, in milliseconds (default: 300000)
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,

    /// Maximum number of live entries (default: 1000)
    #[serde(default = "default_max_cache_size")]
    pub max_cache_size: usize,

    /// Concurrent cache-miss computations (default: 5)
    #[serde(default = "default_max_concurrent_operations")]
    pub max_concurrent_operations: usize,

    /// Deadline for waiting on a slot plus running the operation, in milliseconds
    /// (default: 30000)
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_timeout_ms: u64,

    /// Minimum time between opportunistic cleanups, in milliseconds (default: 300000)
    #[serde(default = "default_cleanup_interval_ms")]
    pub cleanup_interval_ms: u64,

    /// Fill ratio cleanup evicts down to once expired entries are gone (default: 0.8)
    #[serde(default = "default_eviction_watermark")]
    pub eviction_watermark: f64,

    #[serde(default)]
    pub compression: CompressionConfig,

    #[serde(default)]
    pub retry: RetryConfig,

    #[serde(default)]
    pub monitoring: MonitoringConfig,

    #[serde(default)]
    pub scaling: ScalingConfig,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_ttl_ms(),
            max_cache_size: default_max_cache_size(),
            max_concurrent_operations: default_max_concurrent_operations(),
            operation_timeout_ms: default_operation_timeout_ms(),
            cleanup_interval_ms: default_cleanup_interval_ms(),
            eviction_watermark: default_eviction_watermark(),
            compression: CompressionConfig::default(),
            retry: RetryConfig::default(),
            monitoring: MonitoringConfig::default(),
            scaling: ScalingConfig::default(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms)
    }

    /// Fail fast on out-of-range values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ttl_ms == 0 {
            return Err(ConfigError::Validation("cache.ttl_ms must be positive".into()));
        }
        if self.max_cache_size == 0 {
            return Err(ConfigError::Validation(
                "cache.max_cache_size must be positive".into(),
            ));
        }
        if self.max_concurrent_operations == 0 {
            return Err(ConfigError::Validation(
                "cache.max_concurrent_operations must be positive".into(),
            ));
        }
        if self.operation_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "cache.operation_timeout_ms must be positive".into(),
            ));
        }
        if self.eviction_watermark <= 0.0 || self.eviction_watermark > 1.0 {
            return Err(ConfigError::Validation(format!(
                "cache.eviction_watermark must be within (0, 1], got {}",
                self.eviction_watermark
            )));
        }

        self.compression.validate().map_err(ConfigError::Validation)?;
        self.retry.validate().map_err(ConfigError::Validation)?;
        self.monitoring.validate().map_err(ConfigError::Validation)?;
        self.scaling.validate().map_err(ConfigError::Validation)?;
        Ok(())
    }
}

fn default_ttl_ms() -> u64 {
    5 * 60 * 1000
}

fn default_max_cache_size() -> usize {
    1000
}

fn default_max_concurrent_operations() -> usize {
    5
}

fn default_operation_timeout_ms() -> u64 {
    30_000
}

fn default_cleanup_interval_ms() -> u64 {
    5 * 60 * 1000
}

fn default_eviction_watermark() -> f64 {
    0.8
}
