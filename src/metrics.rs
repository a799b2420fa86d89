use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Counters shared between the producer-facing handle and the worker.
#[derive(Debug, Clone, Default)]
pub struct UploadMetrics {
    submitted: Arc<AtomicU64>,
    rejected: Arc<AtomicU64>,
    drained: Arc<AtomicU64>,
    delivered: Arc<AtomicU64>,
    delivery_failures: Arc<AtomicU64>,
    encode_failures: Arc<AtomicU64>,
    worker_starts: Arc<AtomicU64>,
}

impl UploadMetrics {
    pub(crate) fn record_submit(&self, accepted: bool) {
        let counter = if accepted {
            &self.submitted
        } else {
            &self.rejected
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_drain(&self) {
        self.drained.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_delivery(&self, delivered: bool) {
        let counter = if delivered {
            &self.delivered
        } else {
            &self.delivery_failures
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_encode_failure(&self) {
        self.encode_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_worker_start(&self) {
        self.worker_starts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn submitted(&self) -> u64 {
        self.submitted.load(Ordering::Relaxed)
    }

    pub fn rejected(&self) -> u64 {
        self.rejected.load(Ordering::Relaxed)
    }

    /// Drain cycles completed, whatever their delivery outcome.
    pub fn drained(&self) -> u64 {
        self.drained.load(Ordering::Relaxed)
    }

    pub fn delivered(&self) -> u64 {
        self.delivered.load(Ordering::Relaxed)
    }

    pub fn delivery_failures(&self) -> u64 {
        self.delivery_failures.load(Ordering::Relaxed)
    }

    pub fn encode_failures(&self) -> u64 {
        self.encode_failures.load(Ordering::Relaxed)
    }

    pub fn worker_starts(&self) -> u64 {
        self.worker_starts.load(Ordering::Relaxed)
    }

    pub fn snapshot(&self) -> UploadMetricsSnapshot {
        UploadMetricsSnapshot {
            submitted: self.submitted(),
            rejected: self.rejected(),
            drained: self.drained(),
            delivered: self.delivered(),
            delivery_failures: self.delivery_failures(),
            encode_failures: self.encode_failures(),
            worker_starts: self.worker_starts(),
        }
    }
}

/// Point-in-time copy of [`UploadMetrics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UploadMetricsSnapshot {
    pub submitted: u64,
    pub rejected: u64,
    pub drained: u64,
    pub delivered: u64,
    pub delivery_failures: u64,
    pub encode_failures: u64,
    pub worker_starts: u64,
}
