use std::sync::{Mutex, PoisonError};
use tokio::time::Instant;
use tracing::info;
use valicache_domain::config::ScalingConfig;

/// Load signals the scaler decides from.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalingSample {
    /// Fraction of concurrency slots in use
    pub cpu_proxy: f64,
    /// Indexed entries over capacity
    pub memory_pressure: f64,
    /// Operations per second
    pub throughput: f64,
}

struct ScalerState {
    factor: f64,
    last_adjusted: Option<Instant>,
}

/// Feedback loop over a single scale factor applied to concurrency and capacity.
pub struct AdaptiveScaler {
    config: ScalingConfig,
    state: Mutex<ScalerState>,
}

impl AdaptiveScaler {
    pub fn new(config: ScalingConfig) -> Self {
        Self {
            config,
            state: Mutex::new(ScalerState {
                factor: 1.0,
                last_adjusted: None,
            }),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    pub fn factor(&self) -> f64 {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .factor
    }

    /// Returns the new factor when this sample moved it.
    pub fn evaluate(&self, sample: ScalingSample, now: Instant) -> Option<f64> {
        if !self.config.enabled {
            return None;
        }
        let c = &self.config;
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(last) = state.last_adjusted {
            if now.saturating_duration_since(last) < c.cooldown() {
                return None;
            }
        }

        let scale_up = sample.cpu_proxy >= c.cpu_high
            && sample.memory_pressure < c.memory_high
            && sample.throughput >= c.throughput_low;
        let scale_down = sample.memory_pressure >= c.memory_high
            || (sample.cpu_proxy <= c.cpu_low && sample.throughput < c.throughput_low);

        let target = if scale_up {
            state.factor + c.scale_step
        } else if scale_down {
            state.factor - c.scale_step
        } else {
            return None;
        };
        let target = target.clamp(c.min_scale, c.max_scale);
        if (target - state.factor).abs() < f64::EPSILON {
            return None;
        }

        info!(
            from = state.factor,
            to = target,
            cpu_proxy = sample.cpu_proxy,
            memory_pressure = sample.memory_pressure,
            throughput = sample.throughput,
            "Adaptive scale factor changed"
        );
        state.factor = target;
        state.last_adjusted = Some(now);
        Some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn scaler() -> AdaptiveScaler {
        AdaptiveScaler::new(ScalingConfig {
            enabled: true,
            ..Default::default()
        })
    }

    fn busy() -> ScalingSample {
        ScalingSample {
            cpu_proxy: 0.9,
            memory_pressure: 0.3,
            throughput: 50.0,
        }
    }

    fn idle() -> ScalingSample {
        ScalingSample {
            cpu_proxy: 0.0,
            memory_pressure: 0.1,
            throughput: 0.0,
        }
    }

    #[test]
    fn test_disabled_scaler_never_moves() {
        let scaler = AdaptiveScaler::new(ScalingConfig::default());
        assert_eq!(scaler.evaluate(busy(), Instant::now()), None);
        assert_eq!(scaler.factor(), 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scale_up_then_cooldown() {
        let scaler = scaler();
        assert_eq!(scaler.evaluate(busy(), Instant::now()), Some(1.25));

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(scaler.evaluate(busy(), Instant::now()), None);

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(scaler.evaluate(busy(), Instant::now()), Some(1.5));
    }

    #[tokio::test(start_paused = true)]
    async fn test_factor_is_clamped() {
        let scaler = scaler();
        let mut factors = Vec::new();
        for _ in 0..6 {
            if let Some(f) = scaler.evaluate(idle(), Instant::now()) {
                factors.push(f);
            }
            tokio::time::advance(Duration::from_secs(61)).await;
        }
        assert_eq!(factors, vec![0.75, 0.5]);
        assert_eq!(scaler.factor(), 0.5);
    }

    #[test]
    fn test_memory_pressure_forces_scale_down() {
        let scaler = scaler();
        let sample = ScalingSample {
            memory_pressure: 0.9,
            ..busy()
        };
        assert_eq!(scaler.evaluate(sample, Instant::now()), Some(0.75));
    }

    #[test]
    fn test_steady_load_holds_factor() {
        let scaler = scaler();
        let sample = ScalingSample {
            cpu_proxy: 0.5,
            memory_pressure: 0.5,
            throughput: 10.0,
        };
        assert_eq!(scaler.evaluate(sample, Instant::now()), None);
    }
}
