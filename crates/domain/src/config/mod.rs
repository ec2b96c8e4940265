//! Configuration module for Valicache
//!
//! This module contains all configuration structures organized by concern:
//! - `root`: Main configuration, file loading and CLI overrides
//! - `cache`: TTL, capacity, concurrency and eviction settings
//! - `compression`: Adaptive payload compression
//! - `retry`: Retry attempts and backoff delays
//! - `monitoring`: Metrics history, health thresholds and weights
//! - `scaling`: Adaptive capacity feedback loop
//! - `logging`: Logging settings
//! - `errors`: Configuration errors

pub mod cache;
pub mod compression;
pub mod errors;
pub mod logging;
pub mod monitoring;
pub mod retry;
pub mod root;
pub mod scaling;

pub use cache::CacheConfig;
pub use compression::{CompressionAlgorithm, CompressionConfig};
pub use errors::ConfigError;
pub use logging::LoggingConfig;
pub use monitoring::{HealthWeights, MonitoringConfig};
pub use retry::RetryConfig;
pub use root::{CliOverrides, Config};
pub use scaling::ScalingConfig;
