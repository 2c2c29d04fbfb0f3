//! Relay of NDJSON input into the bulk output.

mod input;
mod summary;

pub use input::{open_input, pump, Input, PumpStats};
pub use summary::RunSummary;
