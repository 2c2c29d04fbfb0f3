//! Delivery traits - Dispatcher output interface
//!
//! Three seams separate the dispatch core from outbound I/O:
//! - `BulkSender` issues one bulk call to one endpoint
//! - `BatchDelivery` is what a worker runs for each batch
//! - `DeliveryObserver` receives the outcome of each call

use std::time::Duration;

use bytes::Bytes;

use crate::{Batch, ContractError};

/// Issues one bulk write request
#[trait_variant::make(BulkSender: Send)]
pub trait LocalBulkSender {
    /// POST `payload` to the bulk API of `endpoint`
    ///
    /// # Errors
    /// Transport failures and non-success responses
    async fn send_bulk(&self, endpoint: &str, payload: Bytes) -> Result<(), ContractError>;
}

/// Per-batch delivery policy run by every worker
///
/// Implementations own the outcome: the worker does not observe it.
#[trait_variant::make(BatchDelivery: Send)]
pub trait LocalBatchDelivery {
    /// Deliver one non-empty batch
    async fn deliver(&self, batch: Batch);
}

/// Summary of one bulk call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Endpoint the batch was sent to
    pub endpoint: String,
    /// Entries in the batch
    pub entries: usize,
    /// Payload size in bytes
    pub bytes: usize,
    /// Wall time of the call
    pub elapsed: Duration,
}

/// Outcome callback for bulk calls
pub trait DeliveryObserver: Send + Sync {
    /// Called after a successful call
    fn on_delivered(&self, report: &DeliveryReport);

    /// Called after a failed call; the batch has been discarded
    fn on_failed(&self, report: &DeliveryReport, error: &ContractError);
}
