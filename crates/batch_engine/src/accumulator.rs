//! Accumulator - the open batch and its hand-off
//!
//! Append and swap happen under one guard acquisition, and the send onto
//! the dispatch channel completes before the guard is released. A full
//! channel therefore blocks producers (backpressure) and hand-offs reach
//! the channel in the order they were cut.

use std::fmt;

use async_channel::Sender;
use contracts::{Batch, ContractError, DispatchMessage, EncodedEntry};
use observability::{DropReason, HandOffTrigger};
use tokio::sync::Mutex;
use tracing::{debug, error};

/// Guarded open batch feeding the dispatch channel
pub struct Accumulator {
    batch_size: usize,
    open: Mutex<Vec<EncodedEntry>>,
    tx: Sender<DispatchMessage>,
}

impl fmt::Debug for Accumulator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Accumulator")
            .field("batch_size", &self.batch_size)
            .field("queued", &self.tx.len())
            .finish()
    }
}

impl Accumulator {
    /// Create an empty accumulator
    ///
    /// # Errors
    /// `batch_size` must be > 0.
    pub fn new(batch_size: usize, tx: Sender<DispatchMessage>) -> Result<Self, ContractError> {
        if batch_size == 0 {
            return Err(ContractError::config_validation(
                "batch_size",
                "batch_size must be > 0",
            ));
        }
        Ok(Self {
            batch_size,
            open: Mutex::new(Vec::with_capacity(batch_size)),
            tx,
        })
    }

    /// Hand-off threshold
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Append one entry; hands off the open batch if it reached `batch_size`
    ///
    /// Returns the size of the batch handed off, if any.
    pub async fn append(&self, entry: EncodedEntry) -> Option<usize> {
        let mut open = self.open.lock().await;
        open.push(entry);
        if open.len() < self.batch_size {
            return None;
        }

        let full = std::mem::replace(&mut *open, Vec::with_capacity(self.batch_size));
        let size = self.hand_off(full, HandOffTrigger::Size).await;
        drop(open);
        Some(size)
    }

    /// Hand off the open batch if it is non-empty
    ///
    /// Returns the number of entries handed off (0 when nothing was open).
    pub async fn flush(&self, trigger: HandOffTrigger) -> usize {
        let mut open = self.open.lock().await;
        if open.is_empty() {
            return 0;
        }

        let entries = std::mem::replace(&mut *open, Vec::with_capacity(self.batch_size));
        let size = self.hand_off(entries, trigger).await;
        drop(open);
        size
    }

    /// Entries in the open batch
    pub async fn pending(&self) -> usize {
        self.open.lock().await.len()
    }

    /// Push a cut batch onto the channel; caller holds the guard
    async fn hand_off(&self, entries: Vec<EncodedEntry>, trigger: HandOffTrigger) -> usize {
        let Some(batch) = Batch::from_entries(entries) else {
            return 0;
        };
        let size = batch.len();

        match self.tx.send(DispatchMessage::Data(batch)).await {
            Ok(()) => {
                observability::record_batch_handed_off(trigger, size);
                observability::record_queue_depth(self.tx.len());
                debug!(size, trigger = trigger.as_str(), "Batch handed off");
            }
            Err(_) => {
                observability::record_record_dropped(DropReason::ChannelClosed, size as u64);
                error!(
                    size,
                    trigger = trigger.as_str(),
                    "Dispatch channel closed, batch dropped"
                );
            }
        }
        size
    }
}
