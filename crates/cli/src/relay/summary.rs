//! Run summary.

use std::time::Duration;

use batch_engine::{EngineStats, ShutdownReport};
use serde::Serialize;

use super::PumpStats;

/// Statistics from a relay run
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub input: String,
    pub lines_read: u64,
    pub invalid_lines: u64,
    pub emitted: u64,
    pub encode_failed: u64,
    pub rejected: u64,
    pub batches_delivered: u64,
    pub entries_delivered: u64,
    pub batches_failed: u64,
    pub entries_failed: u64,
    pub workers_joined: usize,
    pub interrupted: bool,
    pub duration_secs: f64,
}

impl RunSummary {
    pub fn new(
        input: impl Into<String>,
        pump: PumpStats,
        engine: EngineStats,
        shutdown: Option<ShutdownReport>,
        duration: Duration,
    ) -> Self {
        Self {
            input: input.into(),
            lines_read: pump.lines_read,
            invalid_lines: pump.invalid_lines,
            emitted: engine.emitted,
            encode_failed: engine.encode_failed,
            rejected: engine.rejected,
            batches_delivered: engine.pool.batches_delivered,
            entries_delivered: engine.pool.entries_delivered,
            batches_failed: engine.pool.batches_failed,
            entries_failed: engine.pool.entries_failed,
            workers_joined: shutdown.map(|r| r.workers_joined).unwrap_or_default(),
            interrupted: pump.interrupted,
            duration_secs: duration.as_secs_f64(),
        }
    }

    /// Records accepted per second
    pub fn records_per_sec(&self) -> f64 {
        if self.duration_secs > 0.0 {
            self.emitted as f64 / self.duration_secs
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                      Relay Statistics                        ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        println!("📥 Input ({})", self.input);
        println!("   ├─ Lines read: {}", self.lines_read);
        println!("   ├─ Invalid lines: {}", self.invalid_lines);
        println!("   └─ Interrupted: {}", self.interrupted);

        println!("\n📦 Records");
        println!("   ├─ Emitted: {}", self.emitted);
        println!("   ├─ Encode failures: {}", self.encode_failed);
        println!("   ├─ Rejected after shutdown: {}", self.rejected);
        println!("   └─ Rate: {:.2}/s", self.records_per_sec());

        println!("\n📤 Delivery");
        println!(
            "   ├─ Delivered: {} batches ({} entries)",
            self.batches_delivered, self.entries_delivered
        );
        println!(
            "   ├─ Failed: {} batches ({} entries)",
            self.batches_failed, self.entries_failed
        );
        println!("   ├─ Workers joined: {}", self.workers_joined);
        println!("   └─ Duration: {:.2}s", self.duration_secs);

        println!();
    }
}
