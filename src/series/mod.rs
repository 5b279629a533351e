//! Time-bucketed aggregation engine behind the snapshot endpoint.
//!
//! Raw readings flow `store -> aggregate -> assemble`; the latest reading is
//! resolved separately. Nothing here is cached: each call recomputes from the
//! store.

pub mod aggregate;
pub mod assemble;
pub mod latest;
pub mod metric;

use std::time::Duration;

pub use aggregate::{aggregate, bucket_key, Aggregation, BUCKET_SECONDS};
pub use assemble::{assemble, MetricSeries, SeriesPoint};
pub use latest::{outlet_is_active, LatestReading};
pub use metric::{Field, Metric, MetricProfile};

use crate::error::AppResult;
use crate::store::{with_deadline, ReadingStore};

/// Fetch the newest `limit` readings and turn them into chart series.
///
/// # Errors
///
/// Returns `AppError::StoreUnavailable` if the store query fails or outlives
/// `deadline`.
pub async fn recent_series(
    store: &dyn ReadingStore,
    profile: &MetricProfile,
    limit: u64,
    deadline: Duration,
) -> AppResult<Vec<MetricSeries>> {
    let readings = with_deadline(deadline, store.fetch_recent_readings(limit)).await?;
    let aggregation = aggregate(&readings, profile.metrics());

    tracing::debug!(
        readings = readings.len(),
        bucket_count = aggregation.bucket_count(),
        skipped = aggregation.skipped,
        "readings_aggregated"
    );

    Ok(assemble(&aggregation))
}

/// Resolve the single newest reading.
///
/// # Errors
///
/// `AppError::EmptyStore` for an empty store, `AppError::StoreUnavailable` on
/// store failure or timeout.
pub async fn latest_reading(
    store: &dyn ReadingStore,
    deadline: Duration,
) -> AppResult<LatestReading> {
    let reading = with_deadline(deadline, store.fetch_latest_reading()).await?;
    LatestReading::resolve(reading)
}
