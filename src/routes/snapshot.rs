use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::common::AppState;
use crate::error::AppResult;
use crate::series::{self, Field, LatestReading, MetricSeries, SeriesPoint};

/// One dashboard refresh: per-minute series for each charted metric plus the
/// newest raw reading.
///
/// Series for metrics the deployment does not chart are left out entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct SnapshotResponse {
    /// pH minute averages as `[epochMillis, value|null]`, ascending
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Vec<f64>>>)]
    pub phvalues: Option<Vec<SeriesPoint>>,
    /// Temperature minute averages, same shape as `phvalues`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Vec<f64>>>)]
    pub tempvalues: Option<Vec<SeriesPoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Vec<f64>>>)]
    pub outlet1: Option<Vec<SeriesPoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Vec<f64>>>)]
    pub outlet2: Option<Vec<SeriesPoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Vec<f64>>>)]
    pub outlet3: Option<Vec<SeriesPoint>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Vec<Vec<f64>>>)]
    pub outlet4: Option<Vec<SeriesPoint>>,
    /// Latest pH, one decimal place
    pub latestph: Option<String>,
    /// Latest temperature, one decimal place
    pub latesttemp: Option<String>,
    pub latestoutlet1: Option<f64>,
    pub latestoutlet2: Option<f64>,
    pub latestoutlet3: Option<f64>,
    pub latestoutlet4: Option<f64>,
    /// Latest reading time, `YYYY-MM-DDTHH:MM:SS` (UTC, no suffix)
    pub latestts: String,
}

impl SnapshotResponse {
    /// Merge both halves of a snapshot.
    #[must_use]
    pub fn compose(series: Vec<MetricSeries>, latest: &LatestReading) -> Self {
        let [latestoutlet1, latestoutlet2, latestoutlet3, latestoutlet4] = latest.outlets;
        let mut response = Self {
            latestph: latest.formatted_ph(),
            latesttemp: latest.formatted_temperature(),
            latestoutlet1,
            latestoutlet2,
            latestoutlet3,
            latestoutlet4,
            latestts: latest.formatted_timestamp(),
            ..Self::default()
        };

        for s in series {
            if let Some(slot) = response.series_slot(s.metric.field) {
                *slot = Some(s.points);
            }
        }
        response
    }

    fn series_slot(&mut self, field: Field) -> Option<&mut Option<Vec<SeriesPoint>>> {
        match field {
            Field::Ph => Some(&mut self.phvalues),
            Field::Temperature => Some(&mut self.tempvalues),
            Field::Outlet(channel) => match channel.get() {
                1 => Some(&mut self.outlet1),
                2 => Some(&mut self.outlet2),
                3 => Some(&mut self.outlet3),
                4 => Some(&mut self.outlet4),
                _ => None,
            },
        }
    }

    /// Points charted for `field`, if the deployment tracks it.
    #[must_use]
    pub fn series(&self, field: Field) -> Option<&[SeriesPoint]> {
        let points = match field {
            Field::Ph => &self.phvalues,
            Field::Temperature => &self.tempvalues,
            Field::Outlet(channel) => match channel.get() {
                1 => &self.outlet1,
                2 => &self.outlet2,
                3 => &self.outlet3,
                4 => &self.outlet4,
                _ => return None,
            },
        };
        points.as_deref()
    }

    #[must_use]
    pub fn latest_outlets(&self) -> [Option<f64>; 4] {
        [
            self.latestoutlet1,
            self.latestoutlet2,
            self.latestoutlet3,
            self.latestoutlet4,
        ]
    }
}

/// Compute a fresh snapshot from the store.
///
/// Both halves query the store concurrently; if either fails the whole
/// snapshot fails.
///
/// # Errors
///
/// `AppError::EmptyStore` when nothing has been recorded yet, and
/// `AppError::StoreUnavailable` on store failure or timeout.
pub async fn build_snapshot(state: &AppState) -> AppResult<SnapshotResponse> {
    let deadline = state.store_deadline();
    let store = state.store.as_ref();

    let (series, latest) = futures::try_join!(
        series::recent_series(
            store,
            &state.config.metrics,
            state.config.reading_limit,
            deadline,
        ),
        series::latest_reading(store, deadline),
    )?;

    tracing::debug!(
        series = series.len(),
        points = series.first().map_or(0, |s| s.points.len()),
        latest = %latest.timestamp,
        "snapshot_built"
    );

    Ok(SnapshotResponse::compose(series, &latest))
}

/// Dashboard snapshot
///
/// Per-minute averages over the most recent readings plus the newest reading.
/// Recomputed on every call.
#[utoipa::path(
    get,
    path = "/data",
    responses(
        (status = 200, description = "Snapshot computed", body = SnapshotResponse),
        (status = 503, description = "No readings yet (code `empty_store`) or store unavailable (code `store_unavailable`)"),
        (status = 500, description = "Newest reading is malformed"),
    ),
    tag = "snapshot"
)]
pub async fn get_snapshot(State(state): State<AppState>) -> AppResult<Response> {
    let snapshot = build_snapshot(&state).await?;
    Ok(([(header::CACHE_CONTROL, "no-store")], Json(snapshot)).into_response())
}
