use super::alerts::AlertManager;
use super::health::{HealthInputs, HealthScorer};
use super::ring::RingBuffer;
use chrono::Utc;
use dashmap::DashMap;
use rustc_hash::FxBuildHasher;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use valicache_domain::config::MonitoringConfig;
use valicache_domain::{
    CacheError, CompressionStats, HealthReport, LatencySummary, MetricsSnapshot,
};

struct LatencyState {
    overall: RingBuffer,
    per_operation: BTreeMap<&'static str, RingBuffer>,
}

struct TrendState {
    response_time: RingBuffer,
    throughput: RingBuffer,
    error_rate: RingBuffer,
    last_sample_at: Instant,
    operations_at_last: u64,
    errors_at_last: u64,
}

struct HealthState {
    report: HealthReport,
    alerts: AlertManager,
}

/// Counters, latency rings, trends, compression tallies and health for one cache.
///
/// Shared behind an `Arc` by every component that reports into it. Counters are
/// relaxed atomics; the bounded rings sit behind short-lived mutexes.
pub struct MetricsCollector {
    config: MonitoringConfig,
    scorer: HealthScorer,

    hits: AtomicU64,
    misses: AtomicU64,
    coalesced: AtomicU64,
    sets: AtomicU64,
    computations: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
    clears: AtomicU64,
    retries: AtomicU64,
    retries_exhausted: AtomicU64,
    operations: AtomicU64,
    errors: AtomicU64,
    errors_by_type: DashMap<&'static str, u64, FxBuildHasher>,

    entries: AtomicUsize,
    max_entries: AtomicUsize,
    in_flight: AtomicUsize,
    max_concurrent_operations: AtomicUsize,
    scale_factor_bits: AtomicU64,

    latency: Mutex<LatencyState>,
    trends: Mutex<TrendState>,
    compression: Mutex<CompressionStats>,
    health: Mutex<HealthState>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl MetricsCollector {
    pub fn new(config: MonitoringConfig) -> Self {
        let history = config.history_size;
        Self {
            scorer: HealthScorer::new(config.clone()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            coalesced: AtomicU64::new(0),
            sets: AtomicU64::new(0),
            computations: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
            expirations: AtomicU64::new(0),
            clears: AtomicU64::new(0),
            retries: AtomicU64::new(0),
            retries_exhausted: AtomicU64::new(0),
            operations: AtomicU64::new(0),
            errors: AtomicU64::new(0),
            errors_by_type: DashMap::with_hasher(FxBuildHasher),
            entries: AtomicUsize::new(0),
            max_entries: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_concurrent_operations: AtomicUsize::new(0),
            scale_factor_bits: AtomicU64::new(1.0f64.to_bits()),
            latency: Mutex::new(LatencyState {
                overall: RingBuffer::new(history),
                per_operation: BTreeMap::new(),
            }),
            trends: Mutex::new(TrendState {
                response_time: RingBuffer::new(history),
                throughput: RingBuffer::new(history),
                error_rate: RingBuffer::new(history),
                last_sample_at: Instant::now(),
                operations_at_last: 0,
                errors_at_last: 0,
            }),
            compression: Mutex::new(CompressionStats::default()),
            health: Mutex::new(HealthState {
                report: HealthReport::default(),
                alerts: AlertManager::new(config.alert_history_size),
            }),
            config,
        }
    }

    // ------------------------------------------------------------------
    // Outcome counters
    // ------------------------------------------------------------------

    pub fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_coalesced(&self) {
        self.coalesced.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_set(&self) {
        self.sets.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_computation(&self) {
        self.computations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_evictions(&self, count: usize) {
        self.evictions.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_expirations(&self, count: usize) {
        self.expirations.fetch_add(count as u64, Ordering::Relaxed);
    }

    pub fn record_clear(&self) {
        self.clears.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_retry_exhausted(&self) {
        self.retries_exhausted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self, error: &CacheError) {
        self.errors.fetch_add(1, Ordering::Relaxed);
        *self.errors_by_type.entry(error.error_type()).or_insert(0) += 1;
    }

    /// One completed top-level operation (`get`, `set`, `clear`).
    pub fn record_latency(&self, operation: &'static str, elapsed: Duration) {
        self.operations.fetch_add(1, Ordering::Relaxed);
        let ms = elapsed.as_secs_f64() * 1000.0;
        let history = self.config.history_size;
        let mut latency = lock(&self.latency);
        latency.overall.push(ms);
        latency
            .per_operation
            .entry(operation)
            .or_insert_with(|| RingBuffer::new(history))
            .push(ms);
    }

    // ------------------------------------------------------------------
    // Compression
    // ------------------------------------------------------------------

    /// Payload stored raw without attempting any strategy.
    pub fn record_compression_skipped(&self) {
        lock(&self.compression).skipped += 1;
    }

    pub fn record_compression_attempt(&self, bytes_in: usize, bytes_out: usize, compressed: bool) {
        let mut stats = lock(&self.compression);
        stats.attempts += 1;
        stats.bytes_in += bytes_in as u64;
        stats.bytes_out += bytes_out as u64;
        if compressed {
            stats.compressed += 1;
        }
    }

    pub fn record_strategy_result(&self, strategy: &'static str, success: bool) {
        let mut stats = lock(&self.compression);
        let entry = stats.strategies.entry(strategy.to_string()).or_default();
        if success {
            entry.successes += 1;
        } else {
            entry.failures += 1;
            stats.failures += 1;
        }
    }

    pub fn record_strategy_selected(&self, strategy: &'static str) {
        lock(&self.compression)
            .strategies
            .entry(strategy.to_string())
            .or_default()
            .selected += 1;
    }

    pub fn set_adaptive_threshold(&self, threshold: usize) {
        lock(&self.compression).adaptive_threshold = threshold;
    }

    // ------------------------------------------------------------------
    // Gauges
    // ------------------------------------------------------------------

    pub fn set_capacity(&self, entries: usize, max_entries: usize) {
        self.entries.store(entries, Ordering::Relaxed);
        self.max_entries.store(max_entries, Ordering::Relaxed);
    }

    pub fn set_concurrency(&self, in_flight: usize, max_concurrent: usize) {
        self.in_flight.store(in_flight, Ordering::Relaxed);
        self.max_concurrent_operations
            .store(max_concurrent, Ordering::Relaxed);
    }

    pub fn set_scale_factor(&self, factor: f64) {
        self.scale_factor_bits
            .store(factor.to_bits(), Ordering::Relaxed);
    }

    pub fn scale_factor(&self) -> f64 {
        f64::from_bits(self.scale_factor_bits.load(Ordering::Relaxed))
    }

    // ------------------------------------------------------------------
    // Derived values
    // ------------------------------------------------------------------

    pub fn lookups(&self) -> u64 {
        self.hits.load(Ordering::Relaxed) + self.misses.load(Ordering::Relaxed)
    }

    pub fn hit_rate(&self) -> f64 {
        let lookups = self.lookups();
        if lookups == 0 {
            return 0.0;
        }
        self.hits.load(Ordering::Relaxed) as f64 / lookups as f64
    }

    pub fn memory_pressure(&self) -> f64 {
        let max = self.max_entries.load(Ordering::Relaxed);
        if max == 0 {
            return 0.0;
        }
        self.entries.load(Ordering::Relaxed) as f64 / max as f64
    }

    /// Latest error-rate sample, or the lifetime rate before the first sample.
    pub fn error_rate(&self) -> f64 {
        if let Some(rate) = lock(&self.trends).error_rate.last() {
            return rate;
        }
        let ops = self.operations.load(Ordering::Relaxed);
        if ops == 0 {
            return 0.0;
        }
        (self.errors.load(Ordering::Relaxed) as f64 / ops as f64).min(1.0)
    }

    /// Latest throughput sample in operations per second.
    pub fn throughput(&self) -> f64 {
        lock(&self.trends).throughput.last().unwrap_or(0.0)
    }

    pub fn average_response_ms(&self) -> f64 {
        lock(&self.latency).overall.average()
    }

    // ------------------------------------------------------------------
    // Periodic work
    // ------------------------------------------------------------------

    /// Push one response-time, throughput and error-rate sample.
    pub fn sample_trends(&self, now: Instant) {
        let avg_response = self.average_response_ms();
        let operations = self.operations.load(Ordering::Relaxed);
        let errors = self.errors.load(Ordering::Relaxed);

        let mut trends = lock(&self.trends);
        let elapsed = now.saturating_duration_since(trends.last_sample_at);
        let op_delta = operations.saturating_sub(trends.operations_at_last);
        let error_delta = errors.saturating_sub(trends.errors_at_last);

        let throughput = if elapsed.is_zero() {
            0.0
        } else {
            op_delta as f64 / elapsed.as_secs_f64()
        };
        let error_rate = if op_delta == 0 {
            0.0
        } else {
            (error_delta as f64 / op_delta as f64).min(1.0)
        };

        trends.response_time.push(avg_response);
        trends.throughput.push(throughput);
        trends.error_rate.push(error_rate);
        trends.last_sample_at = now;
        trends.operations_at_last = operations;
        trends.errors_at_last = errors;
    }

    /// Recompute the health score and raise or resolve alerts.
    pub fn evaluate_health(&self) -> HealthReport {
        let inputs = HealthInputs {
            avg_response_ms: self.average_response_ms(),
            error_rate: self.error_rate(),
            memory_pressure: self.memory_pressure(),
            hit_rate: self.hit_rate(),
            lookups: self.lookups(),
        };
        let report = self.scorer.score(&inputs);
        let now = Utc::now();

        let mut health = lock(&self.health);
        for (kind, value, severity) in self.scorer.breaches(&inputs) {
            health.alerts.observe(kind, value, severity, now);
        }
        health.report = report;
        report
    }

    pub fn active_alert_count(&self) -> usize {
        lock(&self.health).alerts.active_count()
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let (latency, operation_latency) = {
            let latency = lock(&self.latency);
            let per_op = latency
                .per_operation
                .iter()
                .map(|(op, ring)| (op.to_string(), summarize(ring)))
                .collect();
            (summarize(&latency.overall), per_op)
        };
        let (response_time_trend, throughput_trend, error_rate_trend) = {
            let trends = lock(&self.trends);
            (
                trends.response_time.to_vec(),
                trends.throughput.to_vec(),
                trends.error_rate.to_vec(),
            )
        };
        let compression = {
            let mut stats = lock(&self.compression).clone();
            stats.bytes_saved = stats.bytes_in.saturating_sub(stats.bytes_out);
            stats.ratio = if stats.bytes_in == 0 {
                1.0
            } else {
                stats.bytes_out as f64 / stats.bytes_in as f64
            };
            stats
        };
        let (health, active_alerts, alert_history) = {
            let health = lock(&self.health);
            (health.report, health.alerts.active(), health.alerts.history())
        };

        MetricsSnapshot {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            sets: self.sets.load(Ordering::Relaxed),
            computations: self.computations.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            clears: self.clears.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            retries_exhausted: self.retries_exhausted.load(Ordering::Relaxed),
            hit_rate: self.hit_rate(),
            entries: self.entries.load(Ordering::Relaxed),
            max_entries: self.max_entries.load(Ordering::Relaxed),
            in_flight: self.in_flight.load(Ordering::Relaxed),
            max_concurrent_operations: self.max_concurrent_operations.load(Ordering::Relaxed),
            scale_factor: self.scale_factor(),
            errors_by_type: self
                .errors_by_type
                .iter()
                .map(|e| (e.key().to_string(), *e.value()))
                .collect(),
            latency,
            operation_latency,
            response_time_trend,
            throughput_trend,
            error_rate_trend,
            compression,
            health,
            active_alerts,
            alert_history,
            taken_at: Utc::now(),
        }
    }
}

fn summarize(ring: &RingBuffer) -> LatencySummary {
    LatencySummary {
        samples: ring.len(),
        avg_ms: ring.average(),
        p50_ms: ring.percentile(0.5),
        p95_ms: ring.percentile(0.95),
        max_ms: ring.max(),
    }
}
