//! Which reading fields a deployment tracks, and which of those are charted.

use crate::store::{Reading, OUTLET_COUNT};

/// Number of outlet channels addressable by `Field::Outlet`.
pub const OUTLET_CHANNELS: u8 = 4;

const _: () = assert!(OUTLET_CHANNELS as usize == OUTLET_COUNT);

const OUTLET_KEYS: [&str; OUTLET_COUNT] = ["outlet1", "outlet2", "outlet3", "outlet4"];

/// A validated 1-based outlet channel in `1..=OUTLET_CHANNELS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct OutletChannel(u8);

impl OutletChannel {
    #[must_use]
    pub fn new(channel: u8) -> Option<Self> {
        (1..=OUTLET_CHANNELS).contains(&channel).then_some(Self(channel))
    }

    /// Every channel, in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (1..=OUTLET_CHANNELS).map(Self)
    }

    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// 0-based position in `Reading::outlets`.
    #[must_use]
    pub fn index(self) -> usize {
        usize::from(self.0 - 1)
    }
}

/// A numeric field of a [`Reading`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Ph,
    Temperature,
    Outlet(OutletChannel),
}

impl Field {
    /// Outlet field for a 1-based channel, `None` outside `1..=OUTLET_CHANNELS`.
    #[must_use]
    pub fn outlet(channel: u8) -> Option<Self> {
        OutletChannel::new(channel).map(Self::Outlet)
    }

    /// The field's value in `reading`; non-finite values count as absent.
    #[must_use]
    pub fn value(self, reading: &Reading) -> Option<f64> {
        let raw = match self {
            Self::Ph => reading.ph,
            Self::Temperature => reading.temperature,
            Self::Outlet(channel) => reading.outlets.get(channel.index()).copied().flatten(),
        };
        raw.filter(|v| v.is_finite())
    }

    /// JSON key of this field's series in a snapshot.
    #[must_use]
    pub fn series_key(self) -> &'static str {
        match self {
            Self::Ph => "phvalues",
            Self::Temperature => "tempvalues",
            Self::Outlet(channel) => OUTLET_KEYS[channel.index()],
        }
    }

    /// Human label used by the dashboard legend and poller logs.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            Self::Ph => "pH".to_string(),
            Self::Temperature => "temp".to_string(),
            Self::Outlet(channel) => format!("outlet {}", channel.get()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Metric {
    pub field: Field,
    /// Averaged metrics are bucketed and emitted as a series; the rest are only
    /// reported raw through the latest reading.
    pub averaged: bool,
}

impl Metric {
    #[must_use]
    pub fn averaged(field: Field) -> Self {
        Self { field, averaged: true }
    }

    #[must_use]
    pub fn raw(field: Field) -> Self {
        Self { field, averaged: false }
    }

    #[must_use]
    pub fn key(&self) -> &'static str {
        self.field.series_key()
    }
}

/// Ordered metric list for one deployment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricProfile {
    metrics: Vec<Metric>,
}

impl MetricProfile {
    /// Build a profile tracking pH and temperature (optionally), plus all four
    /// outlets, averaging only the outlet channels listed in `averaged_outlets`.
    /// Channels outside `1..=OUTLET_CHANNELS` are ignored.
    #[must_use]
    pub fn new(track_ph: bool, track_temperature: bool, averaged_outlets: &[u8]) -> Self {
        let mut metrics = Vec::with_capacity(2 + usize::from(OUTLET_CHANNELS));
        if track_ph {
            metrics.push(Metric::averaged(Field::Ph));
        }
        if track_temperature {
            metrics.push(Metric::averaged(Field::Temperature));
        }
        for channel in OutletChannel::all() {
            let field = Field::Outlet(channel);
            metrics.push(if averaged_outlets.contains(&channel.get()) {
                Metric::averaged(field)
            } else {
                Metric::raw(field)
            });
        }
        Self { metrics }
    }

    #[must_use]
    pub fn metrics(&self) -> &[Metric] {
        &self.metrics
    }

    /// Metrics that produce a chart series, in profile order.
    pub fn averaged(&self) -> impl Iterator<Item = &Metric> {
        self.metrics.iter().filter(|m| m.averaged)
    }
}

impl Default for MetricProfile {
    fn default() -> Self {
        Self::new(true, true, &[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_profile_charts_ph_and_temperature_only() {
        let profile = MetricProfile::default();
        let keys: Vec<_> = profile.averaged().map(Metric::key).collect();
        assert_eq!(keys, vec!["phvalues", "tempvalues"]);
        assert_eq!(profile.metrics().len(), 6);
    }

    #[test]
    fn averaged_outlets_add_series() {
        let profile = MetricProfile::new(true, false, &[2, 4]);
        let keys: Vec<_> = profile.averaged().map(Metric::key).collect();
        assert_eq!(keys, vec!["phvalues", "outlet2", "outlet4"]);
    }

    #[test]
    fn non_finite_values_are_absent() {
        let reading = Reading::default().with_ph(f64::NAN).with_outlet(3, 1.0);
        assert_eq!(Field::Ph.value(&reading), None);
        assert_eq!(Field::outlet(3).unwrap().value(&reading), Some(1.0));
    }

    #[test]
    fn outlet_channels_are_validated() {
        assert!(Field::outlet(0).is_none());
        assert!(Field::outlet(5).is_none());
        assert!(Field::outlet(9).is_none());
        assert_eq!(Field::outlet(4).unwrap().series_key(), "outlet4");
        assert_eq!(Field::outlet(1).unwrap().label(), "outlet 1");
    }

    #[test]
    fn unknown_averaged_channel_does_not_shadow_outlet4() {
        let profile = MetricProfile::new(false, false, &[4, 9]);
        let keys: Vec<_> = profile.averaged().map(Metric::key).collect();
        assert_eq!(keys, vec!["outlet4"]);
    }
}
