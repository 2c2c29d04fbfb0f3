//! Fire-and-forget delivery policy
//!
//! One bulk call per batch to one randomly selected endpoint. The outcome
//! goes to a `DeliveryObserver`; a failed batch is dropped, never retried.

use std::sync::Arc;
use std::time::{Duration, Instant};

use contracts::{
    Batch, BatchDelivery, BulkSender, ContractError, DeliveryObserver, DeliveryReport,
};
use tracing::{error, info};

use crate::metrics::PoolMetrics;
use crate::selector::EndpointSelector;

/// Single-attempt delivery over a `BulkSender`
pub struct FireAndForget<S> {
    sender: S,
    selector: EndpointSelector,
    observer: Arc<dyn DeliveryObserver>,
}

impl<S: BulkSender> FireAndForget<S> {
    /// Create a delivery policy
    pub fn new(sender: S, selector: EndpointSelector, observer: Arc<dyn DeliveryObserver>) -> Self {
        Self {
            sender,
            selector,
            observer,
        }
    }

    /// Endpoint selector in use
    pub fn selector(&self) -> &EndpointSelector {
        &self.selector
    }
}

impl<S: BulkSender + Sync> BatchDelivery for FireAndForget<S> {
    async fn deliver(&self, batch: Batch) {
        let endpoint = self.selector.select();
        let payload = batch.to_bulk_payload();
        let mut report = DeliveryReport {
            endpoint: endpoint.to_string(),
            entries: batch.len(),
            bytes: payload.len(),
            elapsed: Duration::ZERO,
        };

        let started = Instant::now();
        let result = self.sender.send_bulk(endpoint, payload).await;
        report.elapsed = started.elapsed();

        match result {
            Ok(()) => self.observer.on_delivered(&report),
            Err(e) => self.observer.on_failed(&report, &e),
        }
    }
}

/// Default observer: logs each outcome and records metrics
#[derive(Debug, Clone)]
pub struct LogObserver {
    metrics: Arc<PoolMetrics>,
}

impl LogObserver {
    pub fn new(metrics: Arc<PoolMetrics>) -> Self {
        Self { metrics }
    }
}

impl DeliveryObserver for LogObserver {
    fn on_delivered(&self, report: &DeliveryReport) {
        self.metrics.record_delivered(report.entries);
        observability::record_batch_delivered(&report.endpoint, report.entries);
        observability::record_delivery_latency_ms(report.elapsed.as_secs_f64() * 1000.0);
        info!(
            endpoint = %report.endpoint,
            size = report.entries,
            bytes = report.bytes,
            elapsed_ms = report.elapsed.as_millis() as u64,
            "Bulk write succeeded"
        );
    }

    fn on_failed(&self, report: &DeliveryReport, error: &ContractError) {
        self.metrics.record_failed(report.entries);
        observability::record_batch_failed(&report.endpoint, report.entries);
        error!(
            endpoint = %report.endpoint,
            size = report.entries,
            error = %error,
            "Bulk write failed, batch dropped"
        );
    }
}
