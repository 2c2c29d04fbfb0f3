//! # Contracts
//!
//! Interface contracts shared by every crate: the data units that flow
//! through the engine and the traits at its I/O seams.
//! Business crates depend on this crate, never the other way round.
//!
//! ## Data Flow
//! `Record` -> `RecordEncoder` -> `EncodedEntry` -> `Batch` -> `DispatchMessage`
//! -> `BatchDelivery` -> `BulkSender`

mod batch;
mod config;
mod delivery;
mod encoder;
mod error;

pub use batch::*;
pub use config::*;
pub use delivery::{
    BatchDelivery, BulkSender, DeliveryObserver, DeliveryReport, LocalBatchDelivery,
    LocalBulkSender,
};
pub use encoder::RecordEncoder;
pub use error::*;
