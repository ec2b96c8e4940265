use crate::{AdaptiveScalingJob, CacheMaintenanceJob};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Central orchestrator for all background jobs.
///
/// Use the builder pattern to register jobs, then call `.start()` once. Every job is
/// bound to the runner's cancellation token.
///
/// # Example
///
/// ```rust,ignore
/// let handles = JobRunner::new(shutdown.clone())
///     .with_maintenance(CacheMaintenanceJob::new(cache.clone()).with_interval(10_000))
///     .with_scaling(AdaptiveScalingJob::new(cache).with_interval(30_000))
///     .start()
///     .await;
/// ```
pub struct JobRunner {
    shutdown: CancellationToken,
    maintenance: Option<CacheMaintenanceJob>,
    scaling: Option<AdaptiveScalingJob>,
}

impl JobRunner {
    pub fn new(shutdown: CancellationToken) -> Self {
        Self {
            shutdown,
            maintenance: None,
            scaling: None,
        }
    }

    pub fn with_maintenance(mut self, job: CacheMaintenanceJob) -> Self {
        self.maintenance = Some(job.with_cancellation(self.shutdown.child_token()));
        self
    }

    pub fn with_scaling(mut self, job: AdaptiveScalingJob) -> Self {
        self.scaling = Some(job.with_cancellation(self.shutdown.child_token()));
        self
    }

    /// Start all registered background jobs.
    pub async fn start(self) -> RunningJobs {
        info!("Starting background job runner");
        let mut handles = Vec::new();

        if let Some(job) = self.maintenance {
            handles.push(Arc::new(job).start().await);
        }

        if let Some(job) = self.scaling {
            handles.push(Arc::new(job).start().await);
        }

        info!(jobs = handles.len(), "All background jobs started");
        RunningJobs {
            shutdown: self.shutdown,
            handles,
        }
    }
}

/// Handles to the spawned jobs.
pub struct RunningJobs {
    shutdown: CancellationToken,
    handles: Vec<JoinHandle<()>>,
}

impl RunningJobs {
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Cancel every job and wait for them to exit.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "Background job ended abnormally");
            }
        }
        info!("Background jobs stopped");
    }
}
