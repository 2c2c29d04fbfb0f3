//! Worker pool metrics for observability

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

/// Metrics shared by the worker pool and its delivery observer
#[derive(Debug, Default)]
pub struct PoolMetrics {
    /// Workers that have started and not yet exited
    live_workers: AtomicUsize,
    /// Batches pulled off the dispatch channel
    batches_received: AtomicU64,
    /// Successful bulk calls
    batches_delivered: AtomicU64,
    /// Entries carried by successful bulk calls
    entries_delivered: AtomicU64,
    /// Failed bulk calls (batch discarded)
    batches_failed: AtomicU64,
    /// Entries discarded with failed bulk calls
    entries_failed: AtomicU64,
}

impl PoolMetrics {
    /// Create new metrics instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Get live worker count
    pub fn live_workers(&self) -> usize {
        self.live_workers.load(Ordering::Acquire)
    }

    pub(crate) fn worker_started(&self) {
        self.live_workers.fetch_add(1, Ordering::AcqRel);
    }

    pub(crate) fn worker_stopped(&self) -> usize {
        self.live_workers.fetch_sub(1, Ordering::AcqRel) - 1
    }

    /// Get batches received
    pub fn batches_received(&self) -> u64 {
        self.batches_received.load(Ordering::Relaxed)
    }

    pub(crate) fn inc_batches_received(&self) {
        self.batches_received.fetch_add(1, Ordering::Relaxed);
    }

    /// Get batches delivered
    pub fn batches_delivered(&self) -> u64 {
        self.batches_delivered.load(Ordering::Relaxed)
    }

    /// Get entries delivered
    pub fn entries_delivered(&self) -> u64 {
        self.entries_delivered.load(Ordering::Relaxed)
    }

    /// Record a successful bulk call
    pub fn record_delivered(&self, entries: usize) {
        self.batches_delivered.fetch_add(1, Ordering::Relaxed);
        self.entries_delivered
            .fetch_add(entries as u64, Ordering::Relaxed);
    }

    /// Get batches failed
    pub fn batches_failed(&self) -> u64 {
        self.batches_failed.load(Ordering::Relaxed)
    }

    /// Get entries failed
    pub fn entries_failed(&self) -> u64 {
        self.entries_failed.load(Ordering::Relaxed)
    }

    /// Record a failed bulk call
    pub fn record_failed(&self, entries: usize) {
        self.batches_failed.fetch_add(1, Ordering::Relaxed);
        self.entries_failed
            .fetch_add(entries as u64, Ordering::Relaxed);
    }

    /// Get snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            live_workers: self.live_workers(),
            batches_received: self.batches_received(),
            batches_delivered: self.batches_delivered(),
            entries_delivered: self.entries_delivered(),
            batches_failed: self.batches_failed(),
            entries_failed: self.entries_failed(),
        }
    }
}

/// Snapshot of pool metrics (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub live_workers: usize,
    pub batches_received: u64,
    pub batches_delivered: u64,
    pub entries_delivered: u64,
    pub batches_failed: u64,
    pub entries_failed: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters() {
        let metrics = PoolMetrics::new();
        metrics.worker_started();
        metrics.worker_started();
        metrics.record_delivered(10);
        metrics.record_failed(3);
        assert_eq!(metrics.worker_stopped(), 1);

        let snap = metrics.snapshot();
        assert_eq!(snap.live_workers, 1);
        assert_eq!(snap.batches_delivered, 1);
        assert_eq!(snap.entries_delivered, 10);
        assert_eq!(snap.batches_failed, 1);
        assert_eq!(snap.entries_failed, 3);
    }
}
