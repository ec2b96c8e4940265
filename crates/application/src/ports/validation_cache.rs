use async_trait::async_trait;
use valicache_domain::{CacheError, MetricsSnapshot, RuleSet, ValidationResult};

#[async_trait]
pub trait ValidationCachePort: Send + Sync {
    /// Cached result for `(value, rules)`, computing and storing it on a miss.
    async fn get(&self, value: f64, rules: &RuleSet) -> Result<ValidationResult, CacheError>;

    async fn set(
        &self,
        value: f64,
        rules: &RuleSet,
        result: ValidationResult,
    ) -> Result<(), CacheError>;

    async fn clear(&self) -> Result<(), CacheError>;

    fn metrics(&self) -> MetricsSnapshot;
}
