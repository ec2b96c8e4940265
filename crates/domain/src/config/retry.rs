use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Retry behaviour for transient backend and compression failures
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Retries after the first attempt (default: 3)
    #[serde(default = "default_max_retry_attempts")]
    pub max_retry_attempts: u32,

    /// Backoff before each retry in milliseconds; the last value repeats
    /// (default: [1000, 2000, 5000])
    #[serde(default = "default_delays_ms")]
    pub delays_ms: Vec<u64>,

    /// Random extra delay as a fraction of the base delay (default: 0.0)
    #[serde(default)]
    pub jitter_fraction: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retry_attempts: default_max_retry_attempts(),
            delays_ms: default_delays_ms(),
            jitter_fraction: 0.0,
        }
    }
}

impl RetryConfig {
    pub fn delays(&self) -> Vec<Duration> {
        self.delays_ms.iter().copied().map(Duration::from_millis).collect()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.max_retry_attempts > 0 && self.delays_ms.is_empty() {
            return Err("retry.delays_ms cannot be empty when retries are enabled".to_string());
        }
        crate::validators::validate_ratio("retry.jitter_fraction", self.jitter_fraction)
    }
}

fn default_max_retry_attempts() -> u32 {
    3
}

fn default_delays_ms() -> Vec<u64> {
    vec![1000, 2000, 5000]
}
