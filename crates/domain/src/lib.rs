//! Valicache Domain Layer
pub mod config;
pub mod errors;
pub mod metrics;
pub mod rules;
pub mod validation;
pub mod validators;

pub use config::{CacheConfig, CliOverrides, CompressionAlgorithm, Config, ConfigError};
pub use errors::{CacheError, ErrorClass};
pub use metrics::{
    Alert, AlertKind, AlertSeverity, CompressionStats, HealthReport, LatencySummary,
    MaintenanceReport, MetricsSnapshot, ResolvedAlert, StrategyStats,
};
pub use rules::{Rule, RuleSet};
pub use validation::{ValidationError, ValidationMetadata, ValidationResult};
