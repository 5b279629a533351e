//! Headless dashboard poller.
//!
//! Mirrors the page's refresh loop: request a snapshot, render it, wait the
//! full delay, repeat. There is never more than one request in flight, and a
//! slow response pushes the next poll back instead of stacking requests.

mod client;

use async_trait::async_trait;
use std::future::Future;
use std::time::Duration;

pub use client::SnapshotClient;

use crate::routes::snapshot::SnapshotResponse;
use crate::series::{outlet_is_active, Field};

#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("No readings recorded yet")]
    EmptyStore,

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Decode error: {0}")]
    Decode(String),
}

pub type PollOutcome = Result<SnapshotResponse, PollError>;

#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch(&self) -> PollOutcome;
}

/// Receives each poll outcome, success or failure.
pub trait SnapshotSink: Send {
    fn render(&mut self, outcome: &PollOutcome);
}

pub struct Poller<S, K> {
    source: S,
    sink: K,
    delay: Duration,
}

impl<S, K> Poller<S, K>
where
    S: SnapshotSource,
    K: SnapshotSink,
{
    pub fn new(source: S, sink: K, delay: Duration) -> Self {
        Self {
            source,
            sink,
            delay,
        }
    }

    /// Poll until `shutdown` resolves, then hand back the sink.
    ///
    /// Shutdown is only observed while waiting between polls; a request that
    /// is already in flight runs to completion and is rendered first.
    pub async fn run<F>(mut self, shutdown: F) -> K
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut polls: u64 = 0;

        loop {
            let outcome = self.source.fetch().await;
            polls += 1;
            self.sink.render(&outcome);

            tokio::select! {
                () = &mut shutdown => {
                    tracing::info!(polls, "Poller stopping");
                    break;
                }
                () = tokio::time::sleep(self.delay) => {}
            }
        }

        self.sink
    }
}

/// Sink that writes each outcome to the log.
#[derive(Debug, Default)]
pub struct LogSink;

impl SnapshotSink for LogSink {
    fn render(&mut self, outcome: &PollOutcome) {
        match outcome {
            Ok(snapshot) => {
                let outlets: Vec<&str> = snapshot
                    .latest_outlets()
                    .iter()
                    .map(|state| match state {
                        Some(v) if outlet_is_active(*v) => "active",
                        Some(_) => "inactive",
                        None => "-",
                    })
                    .collect();

                tracing::info!(
                    latestts = %snapshot.latestts,
                    ph = snapshot.latestph.as_deref().unwrap_or("-"),
                    temp = snapshot.latesttemp.as_deref().unwrap_or("-"),
                    outlets = ?outlets,
                    ph_points = snapshot.series(Field::Ph).map_or(0, <[_]>::len),
                    temp_points = snapshot.series(Field::Temperature).map_or(0, <[_]>::len),
                    "Snapshot received"
                );
            }
            Err(PollError::EmptyStore) => tracing::info!("No readings recorded yet"),
            Err(e) => tracing::warn!(error = %e, "Snapshot poll failed"),
        }
    }
}
