use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use std::cmp::Ordering;
use std::sync::Arc;

use tokio::sync::RwLock;

use super::{Reading, ReadingStore, StoreResult};

/// In-process [`ReadingStore`] holding readings in a shared vector.
///
/// Clones share the same readings. Used by tests and `STORE_BACKEND=memory`.
#[derive(Clone, Default)]
pub struct MemoryReadingStore {
    inner: Arc<RwLock<Vec<Reading>>>,
}

impl MemoryReadingStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_readings(readings: impl IntoIterator<Item = Reading>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(readings.into_iter().collect())),
        }
    }

    /// Demo data: one synthetic reading per minute for the `minutes` minutes
    /// ending at `end`, with gently drifting pH and temperature and outlet 1
    /// toggling every quarter hour.
    pub fn seeded(end: DateTime<Utc>, minutes: u32) -> Self {
        Self::with_readings((0..minutes).map(|i| {
            let phase = f64::from(i);
            Reading::at(end - TimeDelta::minutes(i64::from(i)))
                .with_ph(8.1 + 0.1 * (phase / 30.0).sin())
                .with_temperature(25.5 + 0.3 * (phase / 45.0).cos())
                .with_outlet(1, if (i / 15) % 2 == 0 { 1.0 } else { 0.0 })
                .with_outlet(2, 1.0)
        }))
    }

    pub async fn insert(&self, reading: Reading) {
        self.inner.write().await.push(reading);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }
}

/// Newest first, readings without a timestamp last.
fn newest_first(a: &Reading, b: &Reading) -> Ordering {
    match (a.timestamp, b.timestamp) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[async_trait]
impl ReadingStore for MemoryReadingStore {
    async fn fetch_recent_readings(&self, limit: u64) -> StoreResult<Vec<Reading>> {
        let mut readings = self.inner.read().await.clone();
        readings.sort_by(newest_first);
        readings.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        Ok(readings)
    }

    async fn fetch_latest_reading(&self) -> StoreResult<Option<Reading>> {
        Ok(self
            .inner
            .read()
            .await
            .iter()
            .filter(|r| r.timestamp.is_some())
            .max_by_key(|r| r.timestamp)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at(secs: i64) -> Reading {
        Reading::at(Utc.timestamp_opt(secs, 0).unwrap())
    }

    #[tokio::test]
    async fn empty_store_has_no_latest() {
        let store = MemoryReadingStore::new();
        assert!(store.is_empty().await);
        assert!(store.fetch_latest_reading().await.unwrap().is_none());
        assert!(store.fetch_recent_readings(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn recent_readings_are_newest_first_and_limited() {
        let store = MemoryReadingStore::with_readings([at(10), at(30), Reading::default(), at(20)]);

        let recent = store.fetch_recent_readings(3).await.unwrap();
        let times: Vec<_> = recent.iter().map(|r| r.timestamp.unwrap().timestamp()).collect();
        assert_eq!(times, vec![30, 20, 10]);

        let all = store.fetch_recent_readings(10).await.unwrap();
        assert_eq!(all.len(), 4);
        assert!(all[3].timestamp.is_none());
    }

    #[tokio::test]
    async fn seeded_store_ends_at_requested_time() {
        let end = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let store = MemoryReadingStore::seeded(end, 90);

        assert_eq!(store.len().await, 90);
        let latest = store.fetch_latest_reading().await.unwrap().unwrap();
        assert_eq!(latest.timestamp, Some(end));
        assert!(latest.ph.is_some_and(|ph| (8.0..=8.2).contains(&ph)));
        assert_eq!(latest.outlets[1], Some(1.0));

        let oldest = store.fetch_recent_readings(90).await.unwrap().pop().unwrap();
        assert_eq!(oldest.timestamp, Some(end - TimeDelta::minutes(89)));
        assert!(MemoryReadingStore::seeded(end, 0).is_empty().await);
    }

    #[tokio::test]
    async fn latest_ignores_untimestamped_rows() {
        let store = MemoryReadingStore::with_readings([at(5).with_ph(7.9), Reading::default()]);
        store.insert(at(50).with_ph(8.1)).await;

        let latest = store.fetch_latest_reading().await.unwrap().unwrap();
        assert_eq!(latest.ph, Some(8.1));
        assert_eq!(store.len().await, 3);
    }
}
