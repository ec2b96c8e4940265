use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};
use valicache_application::ports::CacheMaintenancePort;

/// Re-evaluates the adaptive scale factor on a fixed cadence.
pub struct AdaptiveScalingJob {
    cache: Arc<dyn CacheMaintenancePort>,
    interval_ms: u64,
    shutdown: CancellationToken,
}

impl AdaptiveScalingJob {
    pub fn new(cache: Arc<dyn CacheMaintenancePort>) -> Self {
        Self {
            cache,
            interval_ms: 30_000,
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
        info!(interval_ms = self.interval_ms, "Starting adaptive scaling job");

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_millis(self.interval_ms));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = self.shutdown.cancelled() => {
                        info!("AdaptiveScalingJob: shutting down");
                        break;
                    }
                    _ = interval.tick() => {
                        match self.cache.run_scaling_cycle().await {
                            Some(factor) => info!(factor, "Cache rescaled"),
                            None => debug!("Scale factor unchanged"),
                        }
                    }
                }
            }
        })
    }
}
