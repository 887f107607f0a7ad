use std::sync::Mutex;

use serde::Serialize;

/// Thread-safe ray counters, shareable between per-channel locators.
pub struct MetricsRecorder {
    inner: Mutex<Metrics>,
}

/// Point-in-time copy of the counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    pub rays_processed: usize,
    pub rays_skipped: usize,
    pub gates_flagged: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Metrics::default()),
        }
    }

    pub fn record_processed(&self, gates_flagged: usize) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.rays_processed += 1;
            metrics.gates_flagged += gates_flagged;
        }
    }

    /// Ray too short for the kernel, or with no fields loaded.
    pub fn record_skipped(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.rays_skipped += 1;
        }
    }

    pub fn snapshot(&self) -> Metrics {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            Metrics::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
