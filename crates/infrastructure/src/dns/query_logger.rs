//! Passive DNS log writer.
//!
//! Answer records flow through a bounded channel into a single consumer
//! task that writes one pipe-delimited line per record to standard output.
//! When the channel is full the batch is dropped and counted; the response
//! path never blocks on the log.

use split_dns_application::ports::AnswerLog;
use split_dns_domain::PassiveRecord;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tracing::{debug, warn};

const CHANNEL_CAPACITY: usize = 4096;

/// Producer half, handed to the dispatcher as its `AnswerLog`.
pub struct PassiveLogHandle {
    tx: mpsc::Sender<Vec<PassiveRecord>>,
    dropped: Arc<AtomicU64>,
}

impl PassiveLogHandle {
    /// Records dropped so far because the channel was saturated or closed.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl AnswerLog for PassiveLogHandle {
    fn record(&self, records: Vec<PassiveRecord>) {
        if records.is_empty() {
            return;
        }
        if let Err(e) = self.tx.try_send(records) {
            let lost = match &e {
                mpsc::error::TrySendError::Full(batch)
                | mpsc::error::TrySendError::Closed(batch) => batch.len() as u64,
            };
            let total = self.dropped.fetch_add(lost, Ordering::Relaxed) + lost;
            warn!(lost, dropped_total = total, "Passive log saturated, dropping records");
        }
    }
}

pub struct PassiveLogWriter;

impl PassiveLogWriter {
    /// Spawn the consumer task writing to standard output.
    pub fn start() -> PassiveLogHandle {
        let (handle, _task) = Self::start_with_writer(tokio::io::stdout(), CHANNEL_CAPACITY);
        handle
    }

    /// Spawn the consumer against an arbitrary writer. Exposed for tests.
    pub fn start_with_writer<W>(
        mut writer: W,
        capacity: usize,
    ) -> (PassiveLogHandle, tokio::task::JoinHandle<()>)
    where
        W: tokio::io::AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, mut rx) = mpsc::channel::<Vec<PassiveRecord>>(capacity);
        let task = tokio::spawn(async move {
            let mut written = 0u64;
            while let Some(batch) = rx.recv().await {
                let mut lines = String::with_capacity(batch.len() * 96);
                for record in &batch {
                    lines.push_str(&record.to_string());
                    lines.push('\n');
                }
                if let Err(e) = writer.write_all(lines.as_bytes()).await {
                    warn!(error = %e, "Passive log write failed (non-critical)");
                    continue;
                }
                let _ = writer.flush().await;
                written += batch.len() as u64;
            }
            debug!(written, "Passive log writer shutting down");
        });
        (
            PassiveLogHandle {
                tx,
                dropped: Arc::new(AtomicU64::new(0)),
            },
            task,
        )
    }
}
