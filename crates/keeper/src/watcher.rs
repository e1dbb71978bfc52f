//! Block watcher: turns periodic height polls into a strictly increasing
//! stream of newly observed heights.

use rebalancer_domain::Height;
use rebalancer_ledger::LedgerClient;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Configuration for the block watcher.
#[derive(Debug, Clone, Copy)]
pub struct WatcherConfig {
    /// Height poll interval.
    pub poll_interval: Duration,
    /// Backoff after a failed poll; doubles up to `max_backoff`.
    pub initial_backoff: Duration,
    /// Backoff ceiling.
    pub max_backoff: Duration,
    /// Channel capacity for emitted heights.
    pub channel_capacity: usize,
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(400),
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(30),
            channel_capacity: 64,
        }
    }
}

/// Polls the ledger height and emits each new running maximum.
///
/// Multiple blocks produced within one poll interval collapse into a single
/// emission of the latest height. Poll failures back off and retry; the
/// watcher never terminates on connectivity loss, only when the consumer
/// drops the receiver.
pub struct BlockWatcher {
    client: Arc<dyn LedgerClient>,
    config: WatcherConfig,
    last_emitted: Option<Height>,
}

impl BlockWatcher {
    pub fn new(client: Arc<dyn LedgerClient>, config: WatcherConfig) -> Self {
        Self {
            client,
            config,
            last_emitted: None,
        }
    }

    /// Observation kernel: returns the height to emit for one polled value,
    /// or `None` when it does not advance the running maximum.
    pub fn observe(&mut self, polled: Height) -> Option<Height> {
        match self.last_emitted {
            Some(last) if polled <= last => None,
            _ => {
                self.last_emitted = Some(polled);
                Some(polled)
            }
        }
    }

    /// Spawns the polling task and returns the height stream.
    pub fn spawn(self) -> mpsc::Receiver<Height> {
        let (tx, rx) = mpsc::channel(self.config.channel_capacity);
        tokio::spawn(self.run(tx));
        rx
    }

    /// Polling loop. Runs until the receiver is dropped.
    pub async fn run(mut self, tx: mpsc::Sender<Height>) {
        info!(
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            "Starting block watcher"
        );

        let mut backoff = self.config.initial_backoff;
        loop {
            match self.client.current_height().await {
                Ok(polled) => {
                    backoff = self.config.initial_backoff;
                    if let Some(height) = self.observe(polled) {
                        debug!(height = height, "New height observed");
                        if tx.send(height).await.is_err() {
                            break;
                        }
                    }
                    tokio::time::sleep(self.config.poll_interval).await;
                }
                Err(err) => {
                    warn!(
                        error = %err,
                        backoff_ms = backoff.as_millis() as u64,
                        "Height poll failed, backing off"
                    );
                    tokio::time::sleep(backoff).await;
                    backoff = (backoff * 2).min(self.config.max_backoff);
                }
            }
        }

        info!("Block watcher stopped");
    }
}
