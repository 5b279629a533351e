use serde::{Deserialize, Serialize};

use super::aggregate::Aggregation;
use super::metric::Metric;

/// `(epoch milliseconds, value)`; serializes as `[ms, value|null]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint(pub i64, pub Option<f64>);

impl SeriesPoint {
    #[must_use]
    pub fn epoch_millis(&self) -> i64 {
        self.0
    }

    #[must_use]
    pub fn value(&self) -> Option<f64> {
        self.1
    }
}

/// Chart-ready points for one metric, ascending by time.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricSeries {
    pub metric: Metric,
    pub points: Vec<SeriesPoint>,
}

/// Turn an aggregation into one ascending series per averaged metric.
///
/// Every series has one point per bucket, with `None` where the bucket held no
/// valid sample for that metric.
#[must_use]
pub fn assemble(aggregation: &Aggregation) -> Vec<MetricSeries> {
    // BTreeMap iterates by ascending bucket start, whatever order the store
    // returned the raw readings in.
    let bucket_times: Vec<i64> = aggregation
        .buckets
        .keys()
        .map(|key| key.timestamp_millis())
        .collect();

    aggregation
        .metrics
        .iter()
        .enumerate()
        .map(|(index, metric)| {
            let points = aggregation
                .buckets
                .values()
                .zip(&bucket_times)
                .map(|(bucket, &millis)| SeriesPoint(millis, bucket.mean(index)))
                .collect();
            MetricSeries {
                metric: *metric,
                points,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};

    use super::*;
    use crate::series::aggregate::aggregate;
    use crate::series::metric::MetricProfile;
    use crate::store::Reading;

    #[test]
    fn newest_first_input_comes_out_ascending() {
        let readings: Vec<Reading> = (0..10)
            .rev()
            .map(|m| {
                Reading::at(Utc.with_ymd_and_hms(2026, 1, 1, 12, m, 30).unwrap()).with_ph(7.0)
            })
            .collect();

        let series = assemble(&aggregate(&readings, MetricProfile::default().metrics()));
        assert_eq!(series.len(), 2);
        for s in &series {
            assert_eq!(s.points.len(), 10);
            assert!(s.points.windows(2).all(|w| w[0].epoch_millis() < w[1].epoch_millis()));
        }
        // No temperature anywhere: every temperature point is null
        assert!(series[1].points.iter().all(|p| p.value().is_none()));
    }

    #[test]
    fn point_serializes_as_pair() {
        let points = vec![SeriesPoint(60_000, Some(7.2)), SeriesPoint(120_000, None)];
        let json = serde_json::to_string(&points).unwrap();
        assert_eq!(json, "[[60000,7.2],[120000,null]]");
    }
}
