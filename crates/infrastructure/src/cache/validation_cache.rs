use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};
use valicache_application::ports::{
    CacheMaintenancePort, ScoreValidator, StorageBackend, ValidationCachePort,
};
use valicache_domain::{
    CacheConfig, CacheError, ConfigError, MaintenanceReport, MetricsSnapshot, RuleSet,
    ValidationResult,
};

use super::compression::CompressionEngine;
use super::concurrency::ConcurrencyController;
use super::eviction::{CapacityDecision, CleanupReport, EntryStatus, EvictionManager};
use super::key::CacheKey;
use super::metrics::MetricsCollector;
use super::retry::RetryPolicy;
use super::scaling::{AdaptiveScaler, ScalingSample};

/// Memoizes score validation behind a pluggable storage backend.
///
/// Reads go storage first; misses run the validator once per key no matter how many
/// callers ask concurrently. Writes are compressed when it pays off, bounded by TTL
/// and capacity, and retried on transient backend failures. Storage is never required
/// for correctness: a failing backend degrades `get` to recomputation.
///
/// All index and capacity updates happen under `write_gate` and only after the
/// corresponding storage write succeeded.
pub struct ValidationCache {
    config: CacheConfig,
    backend: Arc<dyn StorageBackend>,
    validator: Arc<dyn ScoreValidator>,
    eviction: EvictionManager,
    compression: CompressionEngine,
    flights: ConcurrencyController<ValidationResult>,
    retry: RetryPolicy,
    scaler: AdaptiveScaler,
    metrics: Arc<MetricsCollector>,
    write_gate: Mutex<()>,
    // Bumped by `clear`; writes started under an older generation are dropped
    generation: AtomicU64,
}

impl ValidationCache {
    pub fn new(
        config: CacheConfig,
        backend: Arc<dyn StorageBackend>,
        validator: Arc<dyn ScoreValidator>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let metrics = Arc::new(MetricsCollector::new(config.monitoring.clone()));
        let eviction = EvictionManager::new(
            config.ttl(),
            config.max_cache_size,
            config.eviction_watermark,
            config.cleanup_interval(),
        );
        let compression = CompressionEngine::new(config.compression.clone(), metrics.clone());
        let flights = ConcurrencyController::new(
            config.max_concurrent_operations,
            config.operation_timeout(),
            metrics.clone(),
        );
        let retry = RetryPolicy::from_config(&config.retry, metrics.clone());
        let scaler = AdaptiveScaler::new(config.scaling.clone());

        metrics.set_capacity(0, eviction.max_entries());
        metrics.set_concurrency(0, flights.max_concurrency());

        info!(
            backend = backend.name(),
            ttl_ms = config.ttl_ms,
            max_cache_size = config.max_cache_size,
            max_concurrent_operations = config.max_concurrent_operations,
            compression = config.compression.enabled,
            adaptive_scaling = config.scaling.enabled,
            "Validation cache initialized"
        );

        Ok(Self {
            config,
            backend,
            validator,
            eviction,
            compression,
            flights,
            retry,
            scaler,
            metrics,
            write_gate: Mutex::new(()),
            generation: AtomicU64::new(0),
        })
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Entries currently indexed.
    pub fn len(&self) -> usize {
        self.eviction.len()
    }

    pub fn is_empty(&self) -> bool {
        self.eviction.is_empty()
    }

    pub fn max_entries(&self) -> usize {
        self.eviction.max_entries()
    }

    // ------------------------------------------------------------------
    // Public operations
    // ------------------------------------------------------------------

    /// Cached result for `(value, rules)`, computing it on a miss.
    pub async fn get(&self, value: f64, rules: &RuleSet) -> Result<ValidationResult, CacheError> {
        let started = Instant::now();
        let outcome = self.get_inner(value, rules).await;
        self.finish("get", started, &outcome);
        outcome
    }

    /// Store a result computed elsewhere.
    pub async fn set(
        &self,
        value: f64,
        rules: &RuleSet,
        result: ValidationResult,
    ) -> Result<(), CacheError> {
        let started = Instant::now();
        let outcome = self.set_inner(value, rules, result).await;
        self.finish("set", started, &outcome);
        outcome
    }

    /// Drop every entry. Operations already in flight still return their result but
    /// do not write it back.
    pub async fn clear(&self) -> Result<(), CacheError> {
        let started = Instant::now();
        let outcome = {
            let _gate = self.write_gate.lock().await;
            self.generation.fetch_add(1, Ordering::AcqRel);
            let removed = self.eviction.clear();
            let flushed = self
                .retry
                .with_retry("flush_all", "*", CacheError::class, || self.backend.flush_all())
                .await;
            self.metrics.record_clear();
            info!(removed, "Validation cache cleared");
            flushed
        };
        self.refresh_gauges();
        self.finish("clear", started, &outcome);
        outcome
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.refresh_gauges();
        self.metrics.snapshot()
    }

    /// Interval-independent cleanup, trend sampling and health evaluation.
    pub async fn run_maintenance(&self) -> MaintenanceReport {
        let now = Instant::now();
        let report = {
            let _gate = self.write_gate.lock().await;
            let report = self.eviction.cleanup(now);
            self.apply_cleanup(&report).await;
            report
        };
        self.refresh_gauges();
        self.metrics.sample_trends(now);
        let health = self.metrics.evaluate_health();

        MaintenanceReport {
            expired: report.expired.len(),
            evicted: report.evicted.len(),
            entries: self.eviction.len(),
            health_score: health.score,
            active_alerts: self.metrics.active_alert_count(),
        }
    }

    /// Feed current load into the adaptive scaler and apply any new factor to the
    /// concurrency limit and the entry capacity.
    pub async fn run_scaling_cycle(&self) -> Option<f64> {
        if !self.scaler.is_enabled() {
            return None;
        }
        let max_entries = self.eviction.max_entries();
        let sample = ScalingSample {
            cpu_proxy: self.flights.busy_ratio(),
            memory_pressure: self.eviction.len() as f64 / max_entries as f64,
            throughput: self.metrics.throughput(),
        };
        let factor = self.scaler.evaluate(sample, Instant::now())?;

        let base = self.config.max_concurrent_operations as f64;
        self.flights
            .set_max_concurrency((base * factor).round() as usize);
        self.eviction.set_scale(factor);
        self.metrics.set_scale_factor(factor);

        // A smaller capacity takes effect immediately
        if self.eviction.len() > self.eviction.max_entries() {
            let _gate = self.write_gate.lock().await;
            let report = self.eviction.cleanup(Instant::now());
            self.apply_cleanup(&report).await;
        }
        self.refresh_gauges();
        Some(factor)
    }

    // ------------------------------------------------------------------
    // Read path
    // ------------------------------------------------------------------

    async fn get_inner(&self, value: f64, rules: &RuleSet) -> Result<ValidationResult, CacheError> {
        let key = CacheKey::from_request(value, rules)?;
        self.maybe_cleanup().await;

        if let Some(result) = self.lookup(&key).await {
            self.metrics.record_hit();
            debug!(key = %key, "Cache hit");
            return Ok(result);
        }

        let key_ref = &key;
        self.flights
            .run_exclusive(key_ref, move || async move {
                // A flight that finished just before this one may have stored it
                if let Some(result) = self.lookup(key_ref).await {
                    self.metrics.record_hit();
                    return Ok(result);
                }
                self.metrics.record_miss();
                debug!(key = %key_ref, "Cache miss, computing");

                let generation = self.generation.load(Ordering::Acquire);
                let result = self
                    .retry
                    .with_retry("compute", key_ref.as_str(), CacheError::class, || {
                        self.metrics.record_computation();
                        self.validator.validate(value, rules)
                    })
                    .await?;

                if let Err(e) = self.store(key_ref, &result, generation).await {
                    warn!(
                        key = %key_ref,
                        error = %e,
                        "Could not cache computed result, returning it uncached"
                    );
                }
                Ok(result)
            })
            .await
    }

    /// Stored result for `key`, or `None` on any kind of miss.
    ///
    /// Storage failures and undecodable payloads count as misses.
    async fn lookup(&self, key: &CacheKey) -> Option<ValidationResult> {
        match self.eviction.status(key, Instant::now()) {
            EntryStatus::Live => {}
            EntryStatus::Unknown => return None,
            EntryStatus::Expired => {
                self.expire(key).await;
                return None;
            }
        }

        let fetched = self
            .retry
            .with_retry("get", key.as_str(), CacheError::class, || {
                self.backend.get(key.as_str())
            })
            .await;
        let bytes = match fetched {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                // Backend dropped it on its own
                self.eviction.remove(key);
                return None;
            }
            Err(e) => {
                warn!(key = %key, error = %e, "Storage read failed, treating as miss");
                return None;
            }
        };

        match self.decode(&bytes) {
            Ok(result) => {
                self.eviction.touch(key, Instant::now());
                Some(result)
            }
            Err(e) => {
                self.metrics.record_error(&e);
                warn!(key = %key, error = %e, "Dropping undecodable entry");
                let _gate = self.write_gate.lock().await;
                if self.eviction.remove(key) {
                    self.delete_from_backend(key).await;
                }
                None
            }
        }
    }

    fn decode(&self, framed: &[u8]) -> Result<ValidationResult, CacheError> {
        let payload = self.compression.decompress(framed)?;
        serde_json::from_slice(&payload).map_err(|e| CacheError::Serialization(e.to_string()))
    }

    async fn expire(&self, key: &CacheKey) {
        let _gate = self.write_gate.lock().await;
        // Someone may have rewritten it while we waited
        if self.eviction.status(key, Instant::now()) != EntryStatus::Expired {
            return;
        }
        self.eviction.remove(key);
        self.delete_from_backend(key).await;
        self.metrics.record_expirations(1);
        debug!(key = %key, "Entry expired");
    }

    async fn maybe_cleanup(&self) {
        if !self.eviction.should_cleanup(Instant::now()) {
            return;
        }
        let _gate = self.write_gate.lock().await;
        let now = Instant::now();
        if !self.eviction.should_cleanup(now) {
            return;
        }
        let report = self.eviction.cleanup(now);
        self.apply_cleanup(&report).await;
    }

    // ------------------------------------------------------------------
    // Write path
    // ------------------------------------------------------------------

    async fn set_inner(
        &self,
        value: f64,
        rules: &RuleSet,
        result: ValidationResult,
    ) -> Result<(), CacheError> {
        let key = CacheKey::from_request(value, rules)?;
        result.check_well_formed()?;

        let key_ref = &key;
        let result_ref = &result;
        self.flights
            .run_serialized(key_ref, move || async move {
                let generation = self.generation.load(Ordering::Acquire);
                self.store(key_ref, result_ref, generation).await?;
                Ok(result_ref.clone())
            })
            .await
            .map(|_| ())
    }

    /// Serialize, compress, make room, write, then index.
    async fn store(
        &self,
        key: &CacheKey,
        result: &ValidationResult,
        generation: u64,
    ) -> Result<(), CacheError> {
        let payload =
            serde_json::to_vec(result).map_err(|e| CacheError::Serialization(e.to_string()))?;
        let framed = self.compression.maybe_compress(&payload);

        let _gate = self.write_gate.lock().await;
        if self.generation.load(Ordering::Acquire) != generation {
            debug!(key = %key, "Cache cleared during operation, skipping write");
            return Ok(());
        }

        match self.eviction.ensure_capacity(key, Instant::now()) {
            CapacityDecision::Ready { report } => self.apply_cleanup(&report).await,
            CapacityDecision::ClearAll { removed } => {
                warn!(removed, "Cleanup could not free capacity, clearing cache");
                self.metrics.record_evictions(removed);
                self.retry
                    .with_retry("flush_all", key.as_str(), CacheError::class, || {
                        self.backend.flush_all()
                    })
                    .await?;
            }
        }

        let ttl = self.eviction.ttl();
        self.retry
            .with_retry("set", key.as_str(), CacheError::class, || {
                self.backend.set(key.as_str(), framed.bytes.clone(), ttl)
            })
            .await?;

        self.eviction
            .record(key.clone(), framed.bytes.len(), Instant::now());
        self.metrics.record_set();
        self.refresh_gauges();
        debug!(
            key = %key,
            bytes = framed.bytes.len(),
            compressed = framed.compressed,
            "Entry stored"
        );
        Ok(())
    }

    /// Remove index-evicted keys from storage. Caller holds the write gate.
    async fn apply_cleanup(&self, report: &CleanupReport) {
        if report.is_empty() {
            return;
        }
        for key in report.keys() {
            self.delete_from_backend(key).await;
        }
        self.metrics.record_expirations(report.expired.len());
        self.metrics.record_evictions(report.evicted.len());
        self.refresh_gauges();
    }

    async fn delete_from_backend(&self, key: &CacheKey) {
        if let Err(e) = self.backend.delete(key.as_str()).await {
            // The index no longer references it, so it can never be served
            self.metrics.record_error(&e);
            warn!(key = %key, error = %e, "Failed to delete entry from storage");
        }
    }

    // ------------------------------------------------------------------
    // Bookkeeping
    // ------------------------------------------------------------------

    fn finish<T>(&self, operation: &'static str, started: Instant, outcome: &Result<T, CacheError>) {
        if let Err(e) = outcome {
            // Everything else was counted where it happened
            if matches!(e, CacheError::InvalidParams(_) | CacheError::Timeout(_)) {
                self.metrics.record_error(e);
            }
            debug!(operation, error = %e, "Cache operation failed");
        }
        self.metrics.record_latency(operation, started.elapsed());
    }

    fn refresh_gauges(&self) {
        self.metrics
            .set_capacity(self.eviction.len(), self.eviction.max_entries());
        self.metrics
            .set_concurrency(self.flights.in_flight(), self.flights.max_concurrency());
    }
}

#[async_trait]
impl ValidationCachePort for ValidationCache {
    async fn get(&self, value: f64, rules: &RuleSet) -> Result<ValidationResult, CacheError> {
        ValidationCache::get(self, value, rules).await
    }

    async fn set(
        &self,
        value: f64,
        rules: &RuleSet,
        result: ValidationResult,
    ) -> Result<(), CacheError> {
        ValidationCache::set(self, value, rules, result).await
    }

    async fn clear(&self) -> Result<(), CacheError> {
        ValidationCache::clear(self).await
    }

    fn metrics(&self) -> MetricsSnapshot {
        ValidationCache::metrics(self)
    }
}

#[async_trait]
impl CacheMaintenancePort for ValidationCache {
    async fn run_maintenance(&self) -> MaintenanceReport {
        ValidationCache::run_maintenance(self).await
    }

    async fn run_scaling_cycle(&self) -> Option<f64> {
        ValidationCache::run_scaling_cycle(self).await
    }
}
