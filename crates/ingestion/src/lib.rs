//! # Ingestion
//!
//! Record encoding for the bulk engine.
//!
//! Responsibilities:
//! - Compute the destination index of a record from a pattern
//! - Serialize a record into a two-line bulk entry
//! - Parse entries and payloads back (diagnostics, tests)
//!
//! ## Usage Example
//!
//! ```ignore
//! use ingestion::JsonRecordEncoder;
//! use contracts::RecordEncoder;
//!
//! let encoder = JsonRecordEncoder::from_pattern("nginx-%{+%Y.%m.%d}")?;
//! let entry = encoder.encode(&record)?;
//! ```

mod encoder;
mod error;
mod template;
pub mod wire;

// Re-exports
pub use contracts::{EncodedEntry, Record, RecordEncoder};
pub use encoder::JsonRecordEncoder;
pub use error::{IngestionError, Result};
pub use template::IndexTemplate;
