use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Adaptive capacity feedback loop
///
/// When enabled, a background job periodically rescales `max_concurrent_operations`
/// and `max_cache_size` by a shared factor.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScalingConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Interval between evaluations in milliseconds (default: 30000)
    #[serde(default = "default_check_interval_ms")]
    pub check_interval_ms: u64,

    /// Minimum time between two adjustments in milliseconds (default: 60000)
    #[serde(default = "default_cooldown_ms")]
    pub cooldown_ms: u64,

    #[serde(default = "default_min_scale")]
    pub min_scale: f64,
    #[serde(default = "default_max_scale")]
    pub max_scale: f64,

    /// Factor added or removed per adjustment (default: 0.25)
    #[serde(default = "default_scale_step")]
    pub scale_step: f64,

    /// Busy-slot ratio considered saturated (default: 0.8)
    #[serde(default = "default_cpu_high")]
    pub cpu_high: f64,
    /// Busy-slot ratio considered idle (default: 0.2)
    #[serde(default = "default_cpu_low")]
    pub cpu_low: f64,

    /// Entry ratio that forbids growing and forces shrinking (default: 0.85)
    #[serde(default = "default_memory_high")]
    pub memory_high: f64,

    /// Operations per second below which the cache counts as quiet (default: 1.0)
    #[serde(default = "default_throughput_low")]
    pub throughput_low: f64,
}

impl Default for ScalingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            check_interval_ms: default_check_interval_ms(),
            cooldown_ms: default_cooldown_ms(),
            min_scale: default_min_scale(),
            max_scale: default_max_scale(),
            scale_step: default_scale_step(),
            cpu_high: default_cpu_high(),
            cpu_low: default_cpu_low(),
            memory_high: default_memory_high(),
            throughput_low: default_throughput_low(),
        }
    }
}

impl ScalingConfig {
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.min_scale <= 0.0 || self.min_scale > 1.0 || self.max_scale < 1.0 {
            return Err(format!(
                "scaling range [{}, {}] must contain 1.0 and stay positive",
                self.min_scale, self.max_scale
            ));
        }
        if self.scale_step <= 0.0 {
            return Err("scaling.scale_step must be positive".to_string());
        }
        if self.cpu_low >= self.cpu_high {
            return Err("scaling.cpu_low must be below cpu_high".to_string());
        }
        if self.check_interval_ms == 0 {
            return Err("scaling.check_interval_ms must be positive".to_string());
        }
        crate::validators::validate_ratio("scaling.memory_high", self.memory_high)
    }
}

fn default_check_interval_ms() -> u64 {
    30_000
}

fn default_cooldown_ms() -> u64 {
    60_000
}

fn default_min_scale() -> f64 {
    0.5
}

fn default_max_scale() -> f64 {
    2.0
}

fn default_scale_step() -> f64 {
    0.25
}

fn default_cpu_high() -> f64 {
    0.8
}

fn default_cpu_low() -> f64 {
    0.2
}

fn default_memory_high() -> f64 {
    0.85
}

fn default_throughput_low() -> f64 {
    1.0
}
