//! Bulk engine metric recording
//!
//! Thin wrappers over the `metrics` facade so metric names live in one place.

use metrics::{counter, gauge, histogram};

/// Reason label for a record that never reached a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Index rendering or serialization failed
    Encode,
    /// Emitted after shutdown began
    Shutdown,
    /// Hand-off failed because the dispatch channel was closed
    ChannelClosed,
}

impl DropReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Encode => "encode",
            Self::Shutdown => "shutdown",
            Self::ChannelClosed => "channel_closed",
        }
    }
}

/// What caused a batch hand-off
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandOffTrigger {
    /// Open batch reached `batch_size`
    Size,
    /// Flush interval elapsed
    Timer,
    /// Final flush during shutdown
    Shutdown,
}

impl HandOffTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Size => "size",
            Self::Timer => "timer",
            Self::Shutdown => "shutdown",
        }
    }
}

/// Record a record accepted into the open batch
pub fn record_record_emitted() {
    counter!("bulk_relay_records_emitted_total").increment(1);
}

/// Record dropped records
pub fn record_record_dropped(reason: DropReason, count: u64) {
    counter!(
        "bulk_relay_records_dropped_total",
        "reason" => reason.as_str()
    )
    .increment(count);
}

/// Record a batch placed on the dispatch channel
pub fn record_batch_handed_off(trigger: HandOffTrigger, size: usize) {
    counter!(
        "bulk_relay_batches_handed_off_total",
        "trigger" => trigger.as_str()
    )
    .increment(1);
    histogram!("bulk_relay_batch_size").record(size as f64);
}

/// Record a successful bulk call
pub fn record_batch_delivered(endpoint: &str, size: usize) {
    counter!(
        "bulk_relay_batches_delivered_total",
        "endpoint" => endpoint.to_string()
    )
    .increment(1);
    counter!(
        "bulk_relay_entries_delivered_total",
        "endpoint" => endpoint.to_string()
    )
    .increment(size as u64);
}

/// Record a failed bulk call
pub fn record_batch_failed(endpoint: &str, size: usize) {
    counter!(
        "bulk_relay_batches_failed_total",
        "endpoint" => endpoint.to_string()
    )
    .increment(1);
    counter!(
        "bulk_relay_entries_failed_total",
        "endpoint" => endpoint.to_string()
    )
    .increment(size as u64);
}

/// Record bulk call latency
pub fn record_delivery_latency_ms(latency_ms: f64) {
    histogram!("bulk_relay_delivery_latency_ms").record(latency_ms);
}

/// Record the number of running workers
pub fn record_live_workers(count: usize) {
    gauge!("bulk_relay_live_workers").set(count as f64);
}

/// Record dispatch channel depth
pub fn record_queue_depth(depth: usize) {
    gauge!("bulk_relay_dispatch_queue_depth").set(depth as f64);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels() {
        assert_eq!(DropReason::Encode.as_str(), "encode");
        assert_eq!(DropReason::Shutdown.as_str(), "shutdown");
        assert_eq!(HandOffTrigger::Timer.as_str(), "timer");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        // No global recorder installed: calls must not panic
        record_record_emitted();
        record_record_dropped(DropReason::ChannelClosed, 3);
        record_batch_handed_off(HandOffTrigger::Size, 100);
        record_batch_delivered("http://a:4080", 100);
        record_batch_failed("http://a:4080", 100);
        record_delivery_latency_ms(12.5);
        record_live_workers(4);
        record_queue_depth(0);
    }
}
