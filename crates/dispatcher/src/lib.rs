//! # Dispatcher
//!
//! Outbound side of the bulk engine.
//!
//! Responsibilities:
//! - Consume batches from the bounded dispatch channel with N workers
//! - Pick an endpoint per call, POST the bulk payload
//! - Report outcomes; failed batches are dropped, not retried
//! - Terminate every worker exactly once at shutdown

pub mod delivery;
pub mod error;
pub mod metrics;
pub mod pool;
pub mod selector;
pub mod transport;

pub use contracts::{Batch, BatchDelivery, BulkSender, DeliveryObserver, DispatchMessage};
pub use delivery::{FireAndForget, LogObserver};
pub use error::DispatcherError;
pub use metrics::{MetricsSnapshot, PoolMetrics};
pub use pool::{dispatch_channel, ShutdownReport, WorkerPool};
pub use selector::{bulk_url, EndpointSelector, BULK_PATH};
pub use transport::HttpBulkSender;
