//! Fixed-width time bucketing of raw readings.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use super::metric::Metric;
use crate::store::Reading;

/// Bucket width in seconds (one minute).
pub const BUCKET_SECONDS: i64 = 60;

/// Truncate `ts` to the start of its bucket. Sub-bucket components are dropped;
/// the result stays in UTC.
#[must_use]
pub fn bucket_key(ts: DateTime<Utc>) -> Option<DateTime<Utc>> {
    let start = ts.timestamp().div_euclid(BUCKET_SECONDS) * BUCKET_SECONDS;
    DateTime::from_timestamp(start, 0)
}

/// Running sum and count for one metric in one bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulator {
    pub sum: f64,
    pub count: u32,
}

impl Accumulator {
    pub fn push(&mut self, value: f64) {
        self.sum += value;
        self.count += 1;
    }

    /// Arithmetic mean, `None` when nothing was pushed.
    #[must_use]
    pub fn mean(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum / f64::from(self.count))
    }
}

/// Accumulators for one bucket, one per averaged metric in aggregation order.
#[derive(Debug, Clone, PartialEq)]
pub struct Bucket {
    accumulators: Vec<Accumulator>,
}

impl Bucket {
    fn new(metric_count: usize) -> Self {
        Self {
            accumulators: vec![Accumulator::default(); metric_count],
        }
    }

    #[must_use]
    pub fn accumulator(&self, metric_index: usize) -> Option<&Accumulator> {
        self.accumulators.get(metric_index)
    }

    #[must_use]
    pub fn mean(&self, metric_index: usize) -> Option<f64> {
        self.accumulator(metric_index).and_then(Accumulator::mean)
    }
}

/// Result of bucketing a window of readings.
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    /// Averaged metrics, indexing each bucket's accumulators.
    pub metrics: Vec<Metric>,
    /// Buckets keyed by bucket start.
    pub buckets: BTreeMap<DateTime<Utc>, Bucket>,
    /// Readings dropped because they had no usable timestamp.
    pub skipped: usize,
}

impl Aggregation {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    #[must_use]
    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }
}

/// Group `readings` into one-minute buckets and accumulate every averaged
/// metric in `metrics`.
///
/// Input order does not matter. A reading missing a metric contributes nothing
/// to that metric; a reading with no timestamp is skipped entirely.
#[must_use]
pub fn aggregate(readings: &[Reading], metrics: &[Metric]) -> Aggregation {
    let metrics: Vec<Metric> = metrics.iter().filter(|m| m.averaged).copied().collect();
    let mut buckets: BTreeMap<DateTime<Utc>, Bucket> = BTreeMap::new();
    let mut skipped = 0;

    for reading in readings {
        let Some(key) = reading.timestamp.and_then(bucket_key) else {
            skipped += 1;
            continue;
        };

        let bucket = buckets
            .entry(key)
            .or_insert_with(|| Bucket::new(metrics.len()));

        for (index, metric) in metrics.iter().enumerate() {
            if let Some(value) = metric.field.value(reading) {
                bucket.accumulators[index].push(value);
            }
        }
    }

    if skipped > 0 {
        tracing::warn!(skipped, "readings_without_timestamp_skipped");
    }

    Aggregation {
        metrics,
        buckets,
        skipped,
    }
}
