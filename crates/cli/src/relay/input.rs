//! Input streaming: one JSON object per line into `BulkOutput::emit`.

use std::future::Future;
use std::path::Path;

use batch_engine::BulkOutput;
use contracts::Record;
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};

use crate::error::{CliError, Result};

/// An opened input stream
pub struct Input {
    /// Display name (`stdin` or the file path)
    pub name: String,
    pub reader: Box<dyn AsyncBufRead + Unpin + Send>,
}

/// Counters collected while pumping input
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PumpStats {
    /// Lines read, blank ones included
    pub lines_read: u64,
    /// Lines handed to the engine
    pub records: u64,
    /// Lines skipped because they were not a JSON object
    pub invalid_lines: u64,
    /// True if a shutdown signal stopped reading before EOF
    pub interrupted: bool,
}

/// Open `path`, or stdin when no path is given
pub async fn open_input(path: Option<&Path>) -> Result<Input> {
    match path {
        Some(path) => {
            let name = path.display().to_string();
            let file = tokio::fs::File::open(path)
                .await
                .map_err(|e| CliError::input(&name, e))?;
            info!(input = %name, "Reading records from file");
            Ok(Input {
                name,
                reader: Box::new(BufReader::new(file)),
            })
        }
        None => {
            info!("Reading records from stdin");
            Ok(Input {
                name: "stdin".to_string(),
                reader: Box::new(BufReader::new(tokio::io::stdin())),
            })
        }
    }
}

/// Feed every line of `reader` into `output` until EOF or `shutdown` resolves
///
/// Blank lines are ignored; lines that are not a JSON object are logged
/// and skipped.
pub async fn pump<R, F>(
    reader: R,
    output: &BulkOutput,
    source_name: &str,
    shutdown: F,
) -> Result<PumpStats>
where
    R: AsyncBufRead + Unpin,
    F: Future<Output = ()>,
{
    let mut lines = reader.lines();
    let mut stats = PumpStats::default();
    tokio::pin!(shutdown);

    loop {
        let line = tokio::select! {
            biased;
            _ = &mut shutdown => {
                stats.interrupted = true;
                break;
            }
            line = lines.next_line() => line.map_err(|e| CliError::input(source_name, e))?,
        };
        let Some(line) = line else {
            debug!(input = source_name, "End of input");
            break;
        };
        stats.lines_read += 1;

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match parse_record(line) {
            Ok(record) => {
                output.emit(&record).await;
                stats.records += 1;
            }
            Err(reason) => {
                stats.invalid_lines += 1;
                warn!(line = stats.lines_read, reason = %reason, "Skipping invalid input line");
            }
        }
    }

    Ok(stats)
}

fn parse_record(line: &str) -> std::result::Result<Record, String> {
    match serde_json::from_str::<Value>(line) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(_) => Err("expected a JSON object".to_string()),
        Err(e) => Err(e.to_string()),
    }
}
