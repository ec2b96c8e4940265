use futures::future::join_all;
use std::sync::Arc;
use tracing::{debug, instrument, warn};
use valicache_domain::{CacheError, RuleSet, ValidationResult};

use crate::ports::{ScoreValidator, ValidationCachePort};

/// Validates exam scores through the cache without depending on it for correctness.
///
/// Any cache failure other than bad input falls back to running the validator
/// directly, so the cache can only ever cost performance.
pub struct ValidateScoreUseCase {
    cache: Arc<dyn ValidationCachePort>,
    validator: Arc<dyn ScoreValidator>,
}

impl ValidateScoreUseCase {
    pub fn new(cache: Arc<dyn ValidationCachePort>, validator: Arc<dyn ScoreValidator>) -> Self {
        Self { cache, validator }
    }

    #[instrument(skip(self, rules), fields(rules = rules.len()))]
    pub async fn execute(&self, value: f64, rules: &RuleSet) -> Result<ValidationResult, CacheError> {
        match self.cache.get(value, rules).await {
            Ok(result) => Ok(result),
            Err(e @ CacheError::InvalidParams(_)) => Err(e),
            Err(e) => {
                warn!(
                    value,
                    error = %e,
                    error_type = e.error_type(),
                    "Cache unavailable, validating directly"
                );
                self.validator.validate(value, rules).await
            }
        }
    }

    /// Validate a batch of scores against the same rules concurrently.
    ///
    /// Results come back in input order.
    pub async fn execute_many(
        &self,
        values: &[f64],
        rules: &RuleSet,
    ) -> Vec<Result<ValidationResult, CacheError>> {
        debug!(count = values.len(), "Validating score batch");
        join_all(values.iter().map(|value| self.execute(*value, rules))).await
    }
}
