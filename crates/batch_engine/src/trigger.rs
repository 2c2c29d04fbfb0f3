//! FlushTrigger - periodic hand-off of the open batch
//!
//! Bounds how long an entry can sit in the accumulator when traffic is low.

use std::sync::Arc;
use std::time::Duration;

use observability::HandOffTrigger;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, error, instrument};

use crate::accumulator::Accumulator;

/// Handle to the running timer task
pub struct FlushTrigger {
    interval: Duration,
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<()>,
}

impl FlushTrigger {
    /// Start ticking; the first tick fires one `interval` from now
    pub fn spawn(accumulator: Arc<Accumulator>, interval: Duration) -> Self {
        let (stop_tx, stop_rx) = oneshot::channel();
        let handle = tokio::spawn(async move {
            run_trigger(accumulator, interval, stop_rx).await;
        });

        Self {
            interval,
            stop_tx,
            handle,
        }
    }

    /// Tick period
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Stop the timer and wait for the task to exit
    ///
    /// A flush already in progress completes first.
    #[instrument(name = "flush_trigger_stop", skip(self))]
    pub async fn stop(self) {
        let _ = self.stop_tx.send(());
        if let Err(e) = self.handle.await {
            error!(error = ?e, "Flush trigger task panicked");
        }
    }
}

#[instrument(name = "flush_trigger_loop", skip(accumulator, stop_rx))]
async fn run_trigger(
    accumulator: Arc<Accumulator>,
    interval: Duration,
    mut stop_rx: oneshot::Receiver<()>,
) {
    let mut ticker = interval_at(Instant::now() + interval, interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    debug!("Flush trigger started");

    loop {
        tokio::select! {
            _ = &mut stop_rx => break,
            _ = ticker.tick() => {
                let flushed = accumulator.flush(HandOffTrigger::Timer).await;
                if flushed > 0 {
                    debug!(size = flushed, "Timer flush");
                }
            }
        }
    }

    debug!("Flush trigger stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{DispatchMessage, EncodedEntry};
    use tokio::time::sleep;

    fn entry(id: usize) -> EncodedEntry {
        EncodedEntry::new("idx", format!("h\n{id}"))
    }

    #[tokio::test]
    async fn test_tick_hands_off_open_batch() {
        let (tx, rx) = async_channel::bounded(8);
        let acc = Arc::new(Accumulator::new(100, tx).unwrap());
        acc.append(entry(0)).await;
        acc.append(entry(1)).await;

        let trigger = FlushTrigger::spawn(Arc::clone(&acc), Duration::from_millis(30));

        let msg = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .expect("timer flush")
            .unwrap();
        match msg {
            DispatchMessage::Data(batch) => {
                assert_eq!(batch.into_entries(), vec![entry(0), entry(1)]);
            }
            DispatchMessage::Terminate => panic!("unexpected terminate"),
        }
        assert_eq!(acc.pending().await, 0);

        trigger.stop().await;
    }

    #[tokio::test]
    async fn test_ticks_on_empty_batch_send_nothing() {
        let (tx, rx) = async_channel::bounded(8);
        let acc = Arc::new(Accumulator::new(100, tx).unwrap());

        let trigger = FlushTrigger::spawn(Arc::clone(&acc), Duration::from_millis(10));
        sleep(Duration::from_millis(80)).await;
        trigger.stop().await;

        assert!(rx.is_empty());
    }

    #[tokio::test]
    async fn test_no_flush_after_stop() {
        let (tx, rx) = async_channel::bounded(8);
        let acc = Arc::new(Accumulator::new(100, tx).unwrap());

        let trigger = FlushTrigger::spawn(Arc::clone(&acc), Duration::from_millis(20));
        trigger.stop().await;

        acc.append(entry(0)).await;
        sleep(Duration::from_millis(80)).await;

        assert!(rx.is_empty());
        assert_eq!(acc.pending().await, 1);
    }
}
