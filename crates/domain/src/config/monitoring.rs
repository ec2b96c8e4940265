use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Relative weight of each health sub-score
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct HealthWeights {
    #[serde(default = "default_response_time_weight")]
    pub response_time: f64,
    #[serde(default = "default_error_rate_weight")]
    pub error_rate: f64,
    #[serde(default = "default_memory_weight")]
    pub memory: f64,
    #[serde(default = "default_efficiency_weight")]
    pub efficiency: f64,
}

impl Default for HealthWeights {
    fn default() -> Self {
        Self {
            response_time: default_response_time_weight(),
            error_rate: default_error_rate_weight(),
            memory: default_memory_weight(),
            efficiency: default_efficiency_weight(),
        }
    }
}

impl HealthWeights {
    pub fn total(&self) -> f64 {
        self.response_time + self.error_rate + self.memory + self.efficiency
    }
}

/// Metrics history, health thresholds and alerting
///
/// Each health input has a warning and a critical threshold. For hit rate lower is
/// worse, so its warning threshold sits above its critical one.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MonitoringConfig {
    /// Samples kept per ring buffer (default: 100)
    #[serde(default = "default_history_size")]
    pub history_size: usize,

    /// Resolved alerts kept (default: 50)
    #[serde(default = "default_alert_history_size")]
    pub alert_history_size: usize,

    /// Interval between trend samples in milliseconds (default: 10000)
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,

    #[serde(default = "default_response_time_warning_ms")]
    pub response_time_warning_ms: f64,
    #[serde(default = "default_response_time_critical_ms")]
    pub response_time_critical_ms: f64,

    #[serde(default = "default_error_rate_warning")]
    pub error_rate_warning: f64,
    #[serde(default = "default_error_rate_critical")]
    pub error_rate_critical: f64,

    #[serde(default = "default_memory_warning")]
    pub memory_warning: f64,
    #[serde(default = "default_memory_critical")]
    pub memory_critical: f64,

    #[serde(default = "default_hit_rate_warning")]
    pub hit_rate_warning: f64,
    #[serde(default = "default_hit_rate_critical")]
    pub hit_rate_critical: f64,

    /// Lookups required before hit rate counts toward health (default: 20)
    #[serde(default = "default_min_lookups_for_efficiency")]
    pub min_lookups_for_efficiency: u64,

    #[serde(default)]
    pub weights: HealthWeights,
}

impl Default for MonitoringConfig {
    fn default() -> Self {
        Self {
            history_size: default_history_size(),
            alert_history_size: default_alert_history_size(),
            sample_interval_ms: default_sample_interval_ms(),
            response_time_warning_ms: default_response_time_warning_ms(),
            response_time_critical_ms: default_response_time_critical_ms(),
            error_rate_warning: default_error_rate_warning(),
            error_rate_critical: default_error_rate_critical(),
            memory_warning: default_memory_warning(),
            memory_critical: default_memory_critical(),
            hit_rate_warning: default_hit_rate_warning(),
            hit_rate_critical: default_hit_rate_critical(),
            min_lookups_for_efficiency: default_min_lookups_for_efficiency(),
            weights: HealthWeights::default(),
        }
    }
}

impl MonitoringConfig {
    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.history_size == 0 {
            return Err("monitoring.history_size must be positive".to_string());
        }
        if self.response_time_warning_ms >= self.response_time_critical_ms {
            return Err("monitoring.response_time_warning_ms must be below critical".to_string());
        }
        if self.error_rate_warning >= self.error_rate_critical {
            return Err("monitoring.error_rate_warning must be below critical".to_string());
        }
        if self.memory_warning >= self.memory_critical {
            return Err("monitoring.memory_warning must be below critical".to_string());
        }
        if self.hit_rate_warning <= self.hit_rate_critical {
            return Err("monitoring.hit_rate_warning must be above critical".to_string());
        }
        let w = &self.weights;
        if [w.response_time, w.error_rate, w.memory, w.efficiency]
            .iter()
            .any(|v| *v < 0.0)
            || w.total() <= 0.0
        {
            return Err("monitoring.weights must be non-negative and not all zero".to_string());
        }
        Ok(())
    }
}

fn default_history_size() -> usize {
    100
}

fn default_alert_history_size() -> usize {
    50
}

fn default_sample_interval_ms() -> u64 {
    10_000
}

fn default_response_time_warning_ms() -> f64 {
    100.0
}

fn default_response_time_critical_ms() -> f64 {
    1000.0
}

fn default_error_rate_warning() -> f64 {
    0.05
}

fn default_error_rate_critical() -> f64 {
    0.2
}

fn default_memory_warning() -> f64 {
    0.8
}

fn default_memory_critical() -> f64 {
    0.95
}

fn default_hit_rate_warning() -> f64 {
    0.5
}

fn default_hit_rate_critical() -> f64 {
    0.2
}

fn default_min_lookups_for_efficiency() -> u64 {
    20
}

fn default_response_time_weight() -> f64 {
    0.3
}

fn default_error_rate_weight() -> f64 {
    0.3
}

fn default_memory_weight() -> f64 {
    0.2
}

fn default_efficiency_weight() -> f64 {
    0.2
}
