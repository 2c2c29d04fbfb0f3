//! Batch engine
//!
//! Accumulates encoded records into batches and hands them to a bounded
//! worker pool, either when a batch fills or when the flush timer fires.
//!
//! # Example
//!
//! ```ignore
//! use batch_engine::BulkOutput;
//! use contracts::OutputConfig;
//!
//! let config = OutputConfig::new(vec!["http://zinc:4080".into()], "admin", "pw", "logs");
//! let output = BulkOutput::connect(config)?;
//! output.emit(&record).await;
//! output.shutdown().await;
//! ```

pub mod accumulator;
pub mod engine;
pub mod error;
pub mod trigger;

pub use accumulator::Accumulator;
pub use engine::{BulkOutput, BulkOutputBuilder, EngineStats};
pub use error::{EngineError, Result};
pub use trigger::FlushTrigger;

pub use dispatcher::ShutdownReport;
