#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use valicache_application::ports::ScoreValidator;
use valicache_domain::{CacheError, RuleSet, ValidationResult};
use valicache_infrastructure::RangeValidator;

/// `RangeValidator` with an optional artificial delay and a call counter.
#[derive(Clone, Default)]
pub struct CountingValidator {
    calls: Arc<AtomicUsize>,
    delay: Duration,
    failing: Arc<AtomicBool>,
}

impl CountingValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScoreValidator for CountingValidator {
    async fn validate(&self, value: f64, rules: &RuleSet) -> Result<ValidationResult, CacheError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(CacheError::Computation("rule engine unavailable".to_string()));
        }
        RangeValidator.validate(value, rules).await
    }
}
