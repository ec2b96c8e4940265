use async_trait::async_trait;
use valicache_domain::{CacheError, RuleSet, ValidationResult};

/// The rule evaluation the cache memoizes; only invoked on a cache miss.
#[async_trait]
pub trait ScoreValidator: Send + Sync {
    async fn validate(&self, value: f64, rules: &RuleSet) -> Result<ValidationResult, CacheError>;
}
