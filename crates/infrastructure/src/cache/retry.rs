use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use valicache_domain::config::RetryConfig;
use valicache_domain::{CacheError, ErrorClass};

use super::metrics::MetricsCollector;

/// Bounded retry with a fixed delay schedule.
///
/// `max_retries` counts retries after the first attempt. Delays come from the
/// configured schedule; past its end the last delay repeats.
pub struct RetryPolicy {
    max_retries: u32,
    delays: Vec<Duration>,
    jitter_fraction: f64,
    metrics: Arc<MetricsCollector>,
}

impl RetryPolicy {
    pub fn from_config(config: &RetryConfig, metrics: Arc<MetricsCollector>) -> Self {
        Self {
            max_retries: config.max_retry_attempts,
            delays: config.delays(),
            jitter_fraction: config.jitter_fraction,
            metrics,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let base = match self.delays.len() {
            0 => Duration::ZERO,
            len => self.delays[(retry.saturating_sub(1) as usize).min(len - 1)],
        };
        if self.jitter_fraction <= 0.0 || base.is_zero() {
            return base;
        }
        let jitter_ms = base.as_millis() as f64 * self.jitter_fraction * fastrand::f64();
        base + Duration::from_millis(jitter_ms as u64)
    }

    /// Run `op`, retrying failures that `classify` marks transient.
    ///
    /// Every failed attempt is counted under its error type. A transient failure that
    /// outlives the schedule comes back as [`CacheError::RetriesExhausted`]; a fatal one
    /// is returned as is.
    pub async fn with_retry<T, F, Fut, C>(
        &self,
        operation: &'static str,
        key: &str,
        classify: C,
        mut op: F,
    ) -> Result<T, CacheError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, CacheError>>,
        C: Fn(&CacheError) -> ErrorClass,
    {
        let mut retries = 0u32;
        loop {
            let error = match op().await {
                Ok(value) => return Ok(value),
                Err(error) => error,
            };
            self.metrics.record_error(&error);

            if classify(&error) == ErrorClass::Fatal {
                return Err(error);
            }

            if retries >= self.max_retries {
                self.metrics.record_retry_exhausted();
                warn!(
                    operation,
                    key,
                    attempts = retries + 1,
                    error_type = error.error_type(),
                    error = %error,
                    "Retries exhausted"
                );
                return Err(CacheError::RetriesExhausted {
                    operation,
                    key: key.to_string(),
                    attempts: retries + 1,
                    last: Box::new(error),
                });
            }

            retries += 1;
            let delay = self.delay_for(retries);
            self.metrics.record_retry();
            debug!(
                operation,
                key,
                retry = retries,
                delay_ms = delay.as_millis() as u64,
                error_type = error.error_type(),
                "Retrying after transient failure"
            );
            tokio::time::sleep(delay).await;
        }
    }
}
