use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use valicache_application::ports::CacheMaintenancePort;

/// Periodic sweep of expired and over-capacity entries, plus trend sampling and
/// health evaluation.
pub struct CacheMaintenanceJob {
    cache: Arc<dyn CacheMaintenancePort>,
    interval_ms: u64,
    shutdown: CancellationToken,
}

impl CacheMaintenanceJob {
    pub fn new(cache: Arc<dyn CacheMaintenancePort>) -> Self {
        Self {
            cache,
            interval_ms: 10_000,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn with_interval(mut self, interval_ms: u64) -> Self {
        self.interval_ms = interval_ms.max(1);
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.shutdown = token;
        self
    }

    pub async fn start(self: Arc<Self>) -> JoinHandle<()> {
        info!(interval_ms = self.interval_ms, "Starting cache maintenance job");

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(self.interval_ms));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; nothing to sweep yet
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("CacheMaintenanceJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        let report = self.cache.run_maintenance().await;
                        if report.active_alerts > 0 {
                            warn!(
                                health_score = report.health_score,
                                active_alerts = report.active_alerts,
                                entries = report.entries,
                                "Cache health degraded"
                            );
                        } else if report.expired + report.evicted > 0 {
                            info!(
                                expired = report.expired,
                                evicted = report.evicted,
                                entries = report.entries,
                                health_score = report.health_score,
                                "Cache maintenance completed"
                            );
                        } else {
                            debug!(
                                entries = report.entries,
                                health_score = report.health_score,
                                "Cache maintenance found nothing to do"
                            );
                        }
                    }
                }
            }
        })
    }
}
