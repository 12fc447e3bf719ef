//! Pipeline metrics
//!
//! Atomic counters tracking what ingress saw and what the queue did with
//! it. Backpressure drops are only visible here; the client always gets
//! its 204.

use std::sync::atomic::{AtomicU64, Ordering};

/// Counters for one pipeline instance
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    requests_received: AtomicU64,
    reports_decoded: AtomicU64,
    batches_enqueued: AtomicU64,
    batches_dropped: AtomicU64,
    protocol_errors: AtomicU64,
}

impl PipelineMetrics {
    #[inline]
    pub const fn new() -> Self {
        Self {
            requests_received: AtomicU64::new(0),
            reports_decoded: AtomicU64::new(0),
            batches_enqueued: AtomicU64::new(0),
            batches_dropped: AtomicU64::new(0),
            protocol_errors: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn request_received(&self) {
        self.requests_received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn reports_decoded(&self, count: u64) {
        self.reports_decoded.fetch_add(count, Ordering::Relaxed);
    }

    #[inline]
    pub fn batch_enqueued(&self) {
        self.batches_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn batch_dropped(&self) {
        self.batches_dropped.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn protocol_error(&self) {
        self.protocol_errors.fetch_add(1, Ordering::Relaxed);
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_received: self.requests_received.load(Ordering::Relaxed),
            reports_decoded: self.reports_decoded.load(Ordering::Relaxed),
            batches_enqueued: self.batches_enqueued.load(Ordering::Relaxed),
            batches_dropped: self.batches_dropped.load(Ordering::Relaxed),
            protocol_errors: self.protocol_errors.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time snapshot of pipeline metrics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub requests_received: u64,
    pub reports_decoded: u64,
    pub batches_enqueued: u64,
    pub batches_dropped: u64,
    pub protocol_errors: u64,
}
