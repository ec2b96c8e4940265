#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;
use valicache_application::ports::{ScoreValidator, ValidationCachePort};
use valicache_domain::{
    CacheError, CompressionStats, HealthReport, LatencySummary, MetricsSnapshot, RuleSet,
    ValidationError, ValidationResult,
};

// ============================================================================
// Mock ScoreValidator
// ============================================================================

/// Flags scores above 100 as invalid and counts invocations.
#[derive(Clone, Default)]
pub struct MockScoreValidator {
    calls: Arc<AtomicUsize>,
}

impl MockScoreValidator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ScoreValidator for MockScoreValidator {
    async fn validate(&self, value: f64, rules: &RuleSet) -> Result<ValidationResult, CacheError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let errors = if value > 100.0 {
            vec![ValidationError::new("max:100", "score above maximum")]
        } else {
            vec![]
        };
        Ok(ValidationResult::from_errors(errors, rules.names()))
    }
}

// ============================================================================
// Mock ValidationCachePort
// ============================================================================

#[derive(Clone, Default)]
pub struct MockValidationCache {
    stored: Arc<RwLock<HashMap<String, ValidationResult>>>,
    failure: Arc<RwLock<Option<CacheError>>>,
    get_calls: Arc<AtomicUsize>,
    clears: Arc<AtomicUsize>,
}

impl MockValidationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `get`/`clear` fail with `error`.
    pub async fn fail_with(&self, error: CacheError) {
        *self.failure.write().await = Some(error);
    }

    pub async fn preload(&self, value: f64, result: ValidationResult) {
        self.stored.write().await.insert(value.to_string(), result);
    }

    pub fn get_calls(&self) -> usize {
        self.get_calls.load(Ordering::SeqCst)
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ValidationCachePort for MockValidationCache {
    async fn get(&self, value: f64, rules: &RuleSet) -> Result<ValidationResult, CacheError> {
        self.get_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = self.failure.read().await.clone() {
            return Err(err);
        }
        if !value.is_finite() {
            return Err(CacheError::InvalidParams("score must be finite".into()));
        }
        if let Some(hit) = self.stored.read().await.get(&value.to_string()) {
            return Ok(hit.clone());
        }
        Ok(ValidationResult::valid(rules.names()))
    }

    async fn set(
        &self,
        value: f64,
        _rules: &RuleSet,
        result: ValidationResult,
    ) -> Result<(), CacheError> {
        self.stored.write().await.insert(value.to_string(), result);
        Ok(())
    }

    async fn clear(&self) -> Result<(), CacheError> {
        if let Some(err) = self.failure.read().await.clone() {
            return Err(err);
        }
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.stored.write().await.clear();
        Ok(())
    }

    fn metrics(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            hits: self.get_calls() as u64,
            misses: 0,
            coalesced: 0,
            sets: 0,
            computations: 0,
            evictions: 0,
            expirations: 0,
            clears: self.clears() as u64,
            retries: 0,
            retries_exhausted: 0,
            hit_rate: 1.0,
            entries: 0,
            max_entries: 1000,
            in_flight: 0,
            max_concurrent_operations: 5,
            scale_factor: 1.0,
            errors_by_type: Default::default(),
            latency: LatencySummary::default(),
            operation_latency: Default::default(),
            response_time_trend: vec![],
            throughput_trend: vec![],
            error_rate_trend: vec![],
            compression: CompressionStats::default(),
            health: HealthReport::default(),
            active_alerts: vec![],
            alert_history: vec![],
            taken_at: chrono::Utc::now(),
        }
    }
}
