use chrono::{DateTime, Utc};

use crate::error::{AppError, AppResult};
use crate::store::{Reading, OUTLET_COUNT};

/// `strftime` layout of `latestts`: no fractional seconds, no zone suffix.
pub const LATEST_TS_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// The newest raw reading, for "current status" display.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestReading {
    pub timestamp: DateTime<Utc>,
    pub ph: Option<f64>,
    pub temperature: Option<f64>,
    pub outlets: [Option<f64>; OUTLET_COUNT],
}

impl LatestReading {
    /// Project the store's newest reading.
    ///
    /// # Errors
    ///
    /// `AppError::EmptyStore` when the store has no reading, and
    /// `AppError::MalformedReading` when the newest one lacks a timestamp.
    pub fn resolve(reading: Option<Reading>) -> AppResult<Self> {
        let reading = reading.ok_or(AppError::EmptyStore)?;
        let timestamp = reading.timestamp.ok_or_else(|| {
            AppError::MalformedReading("latest reading has no timestamp".to_string())
        })?;

        Ok(Self {
            timestamp,
            ph: finite(reading.ph),
            temperature: finite(reading.temperature),
            outlets: reading.outlets.map(finite),
        })
    }

    #[must_use]
    pub fn formatted_ph(&self) -> Option<String> {
        self.ph.map(format_one_decimal)
    }

    #[must_use]
    pub fn formatted_temperature(&self) -> Option<String> {
        self.temperature.map(format_one_decimal)
    }

    #[must_use]
    pub fn formatted_timestamp(&self) -> String {
        self.timestamp.format(LATEST_TS_FORMAT).to_string()
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

#[must_use]
pub fn format_one_decimal(value: f64) -> String {
    format!("{value:.1}")
}

/// An outlet counts as active when its raw state is above zero.
#[must_use]
pub fn outlet_is_active(state: f64) -> bool {
    state > 0.0
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn empty_store_is_distinct_error() {
        assert!(matches!(LatestReading::resolve(None), Err(AppError::EmptyStore)));
        assert!(matches!(
            LatestReading::resolve(Some(Reading::default())),
            Err(AppError::MalformedReading(_))
        ));
    }

    #[test]
    fn display_fields_are_rounded_and_unzoned() {
        let ts = Utc.with_ymd_and_hms(2026, 7, 4, 9, 5, 7).unwrap()
            + chrono::TimeDelta::milliseconds(640);
        let latest = LatestReading::resolve(Some(
            Reading::at(ts).with_ph(8.16).with_temperature(25.04).with_outlet(2, 1.0),
        ))
        .unwrap();

        assert_eq!(latest.formatted_ph().as_deref(), Some("8.2"));
        assert_eq!(latest.formatted_temperature().as_deref(), Some("25.0"));
        assert_eq!(latest.formatted_timestamp(), "2026-07-04T09:05:07");
        assert_eq!(latest.outlets, [None, Some(1.0), None, None]);
    }

    #[test]
    fn non_finite_latest_values_are_absent() {
        let ts = Utc.with_ymd_and_hms(2026, 7, 4, 9, 5, 7).unwrap();
        let latest = LatestReading::resolve(Some(
            Reading::at(ts)
                .with_ph(f64::NAN)
                .with_temperature(f64::INFINITY)
                .with_outlet(1, f64::NEG_INFINITY)
                .with_outlet(2, 0.0),
        ))
        .unwrap();

        assert_eq!(latest.formatted_ph(), None);
        assert_eq!(latest.formatted_temperature(), None);
        assert_eq!(latest.outlets, [None, Some(0.0), None, None]);
    }

    #[test]
    fn outlet_activity_threshold() {
        assert!(outlet_is_active(1.0));
        assert!(outlet_is_active(0.5));
        assert!(!outlet_is_active(0.0));
        assert!(!outlet_is_active(-1.0));
    }
}
