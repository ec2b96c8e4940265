use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    ResponseTime,
    ErrorRate,
    MemoryPressure,
    CacheEfficiency,
}

impl AlertKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ResponseTime => "response_time",
            Self::ErrorRate => "error_rate",
            Self::MemoryPressure => "memory_pressure",
            Self::CacheEfficiency => "cache_efficiency",
        }
    }
}

impl fmt::Display for AlertKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertSeverity {
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub kind: AlertKind,
    pub severity: AlertSeverity,
    pub message: String,
    pub value: f64,
    pub started_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAlert {
    #[serde(flatten)]
    pub alert: Alert,
    pub resolved_at: DateTime<Utc>,
    pub duration_ms: i64,
}

/// Weighted health score and the sub-scores it was built from, all in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub score: f64,
    pub response_time: f64,
    pub error_rate: f64,
    pub memory: f64,
    pub efficiency: f64,
}

impl Default for HealthReport {
    fn default() -> Self {
        Self {
            score: 100.0,
            response_time: 100.0,
            error_rate: 100.0,
            memory: 100.0,
            efficiency: 100.0,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LatencySummary {
    pub samples: usize,
    pub avg_ms: f64,
    pub p50_ms: f64,
    pub p95_ms: f64,
    pub max_ms: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyStats {
    pub successes: u64,
    pub failures: u64,
    pub selected: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompressionStats {
    pub attempts: u64,
    pub compressed: u64,
    pub skipped: u64,
    pub failures: u64,
    pub bytes_in: u64,
    pub bytes_out: u64,
    pub bytes_saved: u64,
    /// `bytes_out / bytes_in` over all attempts, 1.0 when nothing was attempted
    pub ratio: f64,
    pub adaptive_threshold: usize,
    pub strategies: BTreeMap<String, StrategyStats>,
}

/// Read-only view of the cache's counters, trends, health and alerts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub coalesced: u64,
    pub sets: u64,
    pub computations: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub clears: u64,
    pub retries: u64,
    pub retries_exhausted: u64,
    pub hit_rate: f64,
    pub entries: usize,
    pub max_entries: usize,
    pub in_flight: usize,
    pub max_concurrent_operations: usize,
    pub scale_factor: f64,
    pub errors_by_type: BTreeMap<String, u64>,
    pub latency: LatencySummary,
    pub operation_latency: BTreeMap<String, LatencySummary>,
    pub response_time_trend: Vec<f64>,
    pub throughput_trend: Vec<f64>,
    pub error_rate_trend: Vec<f64>,
    pub compression: CompressionStats,
    pub health: HealthReport,
    pub active_alerts: Vec<Alert>,
    pub alert_history: Vec<ResolvedAlert>,
    pub taken_at: DateTime<Utc>,
}

impl MetricsSnapshot {
    pub fn total_errors(&self) -> u64 {
        self.errors_by_type.values().sum()
    }
}

/// Outcome of one background maintenance pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceReport {
    pub expired: usize,
    pub evicted: usize,
    pub entries: usize,
    pub health_score: f64,
    pub active_alerts: usize,
}
