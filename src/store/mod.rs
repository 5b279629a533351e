//! Narrow read interface over the persisted reading collection.
//!
//! The snapshot path only ever needs two queries: the most recent `N` readings
//! (newest first) and the single newest reading. Everything else about the
//! storage engine stays behind [`ReadingStore`].

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::future::Future;
use std::time::Duration;

pub use memory::MemoryReadingStore;
pub use postgres::PostgresReadingStore;

/// Number of relay/outlet channels a reading can report.
pub const OUTLET_COUNT: usize = 4;

/// One raw sensor sample as stored.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reading {
    /// `None` marks a malformed record that cannot be bucketed.
    pub timestamp: Option<DateTime<Utc>>,
    pub ph: Option<f64>,
    pub temperature: Option<f64>,
    /// Relay states for outlets 1..=4; booleans are stored as 0/1.
    pub outlets: [Option<f64>; OUTLET_COUNT],
}

impl Reading {
    #[must_use]
    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp: Some(timestamp),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_ph(mut self, ph: f64) -> Self {
        self.ph = Some(ph);
        self
    }

    #[must_use]
    pub fn with_temperature(mut self, temperature: f64) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Set outlet `channel` (1-based).
    #[must_use]
    pub fn with_outlet(mut self, channel: usize, state: f64) -> Self {
        if let Some(slot) = channel.checked_sub(1).and_then(|i| self.outlets.get_mut(i)) {
            *slot = Some(state);
        }
        self
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Store query timed out after {0:?}")]
    Timeout(Duration),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ReadingStore: Send + Sync {
    /// Up to `limit` readings ordered newest first.
    ///
    /// Readings without a timestamp may be included; they sort after all
    /// timestamped ones.
    async fn fetch_recent_readings(&self, limit: u64) -> StoreResult<Vec<Reading>>;

    /// The reading with the greatest timestamp, or `None` for an empty store.
    async fn fetch_latest_reading(&self) -> StoreResult<Option<Reading>>;
}

/// Bound a store query with a request-scoped deadline.
///
/// # Errors
///
/// Returns `StoreError::Timeout` when `deadline` elapses first, otherwise the
/// query's own result.
pub async fn with_deadline<T, F>(deadline: Duration, query: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    tokio::time::timeout(deadline, query)
        .await
        .map_err(|_| StoreError::Timeout(deadline))?
}
