use valicache_domain::config::MonitoringConfig;
use valicache_domain::{AlertKind, AlertSeverity, HealthReport};

/// Raw measurements the health score is derived from.
#[derive(Debug, Clone, Copy, Default)]
pub struct HealthInputs {
    pub avg_response_ms: f64,
    pub error_rate: f64,
    pub memory_pressure: f64,
    pub hit_rate: f64,
    pub lookups: u64,
}

/// Linear sub-score: 100 at or better than `warning`, 0 at or worse than `critical`.
///
/// Direction follows the thresholds: `warning < critical` means higher is worse,
/// `warning > critical` means lower is worse.
pub fn sub_score(value: f64, warning: f64, critical: f64) -> f64 {
    let score = if warning <= critical {
        if value <= warning {
            100.0
        } else if value >= critical {
            0.0
        } else {
            100.0 * (critical - value) / (critical - warning)
        }
    } else if value >= warning {
        100.0
    } else if value <= critical {
        0.0
    } else {
        100.0 * (value - critical) / (warning - critical)
    };
    score.clamp(0.0, 100.0)
}

/// Severity of `value` against the same threshold pair, `None` when healthy.
pub fn severity(value: f64, warning: f64, critical: f64) -> Option<AlertSeverity> {
    let (breaches_critical, breaches_warning) = if warning <= critical {
        (value >= critical, value > warning)
    } else {
        (value <= critical, value < warning)
    };
    if breaches_critical {
        Some(AlertSeverity::Critical)
    } else if breaches_warning {
        Some(AlertSeverity::Warning)
    } else {
        None
    }
}

pub struct HealthScorer {
    config: MonitoringConfig,
}

impl HealthScorer {
    pub fn new(config: MonitoringConfig) -> Self {
        Self { config }
    }

    pub fn score(&self, inputs: &HealthInputs) -> HealthReport {
        let c = &self.config;
        let response_time = sub_score(
            inputs.avg_response_ms,
            c.response_time_warning_ms,
            c.response_time_critical_ms,
        );
        let error_rate = sub_score(inputs.error_rate, c.error_rate_warning, c.error_rate_critical);
        let memory = sub_score(inputs.memory_pressure, c.memory_warning, c.memory_critical);
        let efficiency = if self.efficiency_applies(inputs) {
            sub_score(inputs.hit_rate, c.hit_rate_warning, c.hit_rate_critical)
        } else {
            100.0
        };

        let w = &c.weights;
        let score = (response_time * w.response_time
            + error_rate * w.error_rate
            + memory * w.memory
            + efficiency * w.efficiency)
            / w.total();

        HealthReport {
            score: score.clamp(0.0, 100.0),
            response_time,
            error_rate,
            memory,
            efficiency,
        }
    }

    /// Per-metric severities, in a fixed order.
    pub fn breaches(&self, inputs: &HealthInputs) -> [(AlertKind, f64, Option<AlertSeverity>); 4] {
        let c = &self.config;
        let efficiency = if self.efficiency_applies(inputs) {
            severity(inputs.hit_rate, c.hit_rate_warning, c.hit_rate_critical)
        } else {
            None
        };
        [
            (
                AlertKind::ResponseTime,
                inputs.avg_response_ms,
                severity(
                    inputs.avg_response_ms,
                    c.response_time_warning_ms,
                    c.response_time_critical_ms,
                ),
            ),
            (
                AlertKind::ErrorRate,
                inputs.error_rate,
                severity(inputs.error_rate, c.error_rate_warning, c.error_rate_critical),
            ),
            (
                AlertKind::MemoryPressure,
                inputs.memory_pressure,
                severity(inputs.memory_pressure, c.memory_warning, c.memory_critical),
            ),
            (AlertKind::CacheEfficiency, inputs.hit_rate, efficiency),
        ]
    }

    // A cold cache has a 0% hit rate by definition
    fn efficiency_applies(&self, inputs: &HealthInputs) -> bool {
        inputs.lookups >= self.config.min_lookups_for_efficiency
    }
}
