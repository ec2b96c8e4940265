#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use valicache_application::ports::CacheMaintenancePort;
use valicache_domain::MaintenanceReport;

/// Records how often each hook ran; scaling answers come from a script.
#[derive(Clone, Default)]
pub struct MockMaintenance {
    maintenance_runs: Arc<AtomicUsize>,
    scaling_runs: Arc<AtomicUsize>,
    scaling_script: Arc<Mutex<VecDeque<Option<f64>>>>,
    report: Arc<Mutex<MaintenanceReport>>,
}

impl MockMaintenance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_scaling_script(factors: Vec<Option<f64>>) -> Self {
        let mock = Self::default();
        *mock.scaling_script.lock().unwrap() = factors.into();
        mock
    }

    pub fn with_report(report: MaintenanceReport) -> Self {
        let mock = Self::default();
        *mock.report.lock().unwrap() = report;
        mock
    }

    pub fn maintenance_runs(&self) -> usize {
        self.maintenance_runs.load(Ordering::SeqCst)
    }

    pub fn scaling_runs(&self) -> usize {
        self.scaling_runs.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CacheMaintenancePort for MockMaintenance {
    async fn run_maintenance(&self) -> MaintenanceReport {
        self.maintenance_runs.fetch_add(1, Ordering::SeqCst);
        *self.report.lock().unwrap()
    }

    async fn run_scaling_cycle(&self) -> Option<f64> {
        self.scaling_runs.fetch_add(1, Ordering::SeqCst);
        self.scaling_script.lock().unwrap().pop_front().flatten()
    }
}
