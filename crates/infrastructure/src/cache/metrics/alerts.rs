use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, VecDeque};
use tracing::{info, warn};
use valicache_domain::{Alert, AlertKind, AlertSeverity, ResolvedAlert};

/// Active alerts keyed by metric, plus a bounded history of resolved ones.
pub struct AlertManager {
    active: BTreeMap<AlertKind, Alert>,
    history: VecDeque<ResolvedAlert>,
    history_size: usize,
}

impl AlertManager {
    pub fn new(history_size: usize) -> Self {
        Self {
            active: BTreeMap::new(),
            history: VecDeque::with_capacity(history_size.min(64)),
            history_size,
        }
    }

    /// Apply one evaluation of a metric: raise, re-grade, or resolve its alert.
    pub fn observe(
        &mut self,
        kind: AlertKind,
        value: f64,
        severity: Option<AlertSeverity>,
        now: DateTime<Utc>,
    ) {
        match (severity, self.active.get_mut(&kind)) {
            (Some(severity), Some(alert)) => {
                alert.value = value;
                if alert.severity != severity {
                    warn!(
                        alert = %kind,
                        from = ?alert.severity,
                        to = ?severity,
                        value,
                        "Alert severity changed"
                    );
                    alert.severity = severity;
                    alert.message = describe(kind, severity, value);
                }
            }
            (Some(severity), None) => {
                warn!(alert = %kind, ?severity, value, "Alert raised");
                self.active.insert(
                    kind,
                    Alert {
                        kind,
                        severity,
                        message: describe(kind, severity, value),
                        value,
                        started_at: now,
                    },
                );
            }
            (None, Some(_)) => {
                if let Some(alert) = self.active.remove(&kind) {
                    let duration_ms = (now - alert.started_at).num_milliseconds().max(0);
                    info!(alert = %kind, duration_ms, "Alert resolved");
                    self.push_history(ResolvedAlert {
                        alert,
                        resolved_at: now,
                        duration_ms,
                    });
                }
            }
            (None, None) => {}
        }
    }

    pub fn active(&self) -> Vec<Alert> {
        self.active.values().cloned().collect()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn history(&self) -> Vec<ResolvedAlert> {
        self.history.iter().cloned().collect()
    }

    fn push_history(&mut self, resolved: ResolvedAlert) {
        if self.history_size == 0 {
            return;
        }
        if self.history.len() == self.history_size {
            self.history.pop_front();
        }
        self.history.push_back(resolved);
    }
}

fn describe(kind: AlertKind, severity: AlertSeverity, value: f64) -> String {
    let level = match severity {
        AlertSeverity::Warning => "warning",
        AlertSeverity::Critical => "critical",
    };
    match kind {
        AlertKind::ResponseTime => format!("average response time {value:.1}ms is {level}"),
        AlertKind::ErrorRate => format!("error rate {:.1}% is {level}", value * 100.0),
        AlertKind::MemoryPressure => format!("cache is {:.0}% full ({level})", value * 100.0),
        AlertKind::CacheEfficiency => format!("hit rate {:.1}% is {level}", value * 100.0),
    }
}
