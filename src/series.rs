//! Validated hourly time series shared by prices and solar generation.

use chrono::{Duration, NaiveDate, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use serde::Serialize;

use crate::error::{Error, Result};

/// One hourly sample: local wall-clock timestamp and value.
///
/// For price series the value is $/MWh, for generation series MWh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HourlyPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

impl HourlyPoint {
    pub fn new(timestamp: NaiveDateTime, value: f64) -> Self {
        Self { timestamp, value }
    }

    /// Calendar day the sample belongs to.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// Time-ordered sequence of hourly samples.
///
/// Timestamps are strictly increasing (hence unique) and every value is
/// finite. The only way to obtain one is through [`HourlySeries::new`], so
/// downstream code never re-checks ordering.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HourlySeries {
    points: Vec<HourlyPoint>,
}

impl HourlySeries {
    /// Wraps samples after checking ordering and finiteness.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if a timestamp is not strictly greater
    /// than its predecessor or a value is NaN/infinite.
    pub fn new(points: Vec<HourlyPoint>) -> Result<Self> {
        if let Some(p) = points.iter().find(|p| !p.value.is_finite()) {
            return Err(Error::InvalidInput(format!(
                "non-finite value {} at {}",
                p.value, p.timestamp
            )));
        }
        if let Some(pair) = points
            .windows(2)
            .find(|w| w[1].timestamp <= w[0].timestamp)
        {
            let kind = if pair[1].timestamp == pair[0].timestamp {
                "duplicate"
            } else {
                "out-of-order"
            };
            return Err(Error::InvalidInput(format!(
                "{kind} timestamp {} after {}",
                pair[1].timestamp, pair[0].timestamp
            )));
        }
        Ok(Self { points })
    }

    /// Builds a series from parallel timestamp and value iterators.
    ///
    /// # Errors
    ///
    /// Same as [`HourlySeries::new`].
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (NaiveDateTime, f64)>,
    ) -> Result<Self> {
        Self::new(
            pairs
                .into_iter()
                .map(|(timestamp, value)| HourlyPoint::new(timestamp, value))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, HourlyPoint> {
        self.points.iter()
    }

    pub fn values(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().map(|p| p.value)
    }

    pub fn first(&self) -> Option<&HourlyPoint> {
        self.points.first()
    }
}

impl<'a> IntoIterator for &'a HourlySeries {
    type Item = &'a HourlyPoint;
    type IntoIter = std::slice::Iter<'a, HourlyPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Every wall-clock hour of `year` that exists in `tz`.
///
/// The spring-forward hour is skipped; the repeated fall-back hour appears
/// once, since timestamps are naive local times. Years chrono cannot
/// represent give an empty grid.
pub fn hourly_grid(year: i32, tz: Tz) -> Vec<NaiveDateTime> {
    let bounds = NaiveDate::from_ymd_opt(year, 1, 1)
        .zip(year.checked_add(1).and_then(|next| NaiveDate::from_ymd_opt(next, 1, 1)))
        .and_then(|(a, b)| a.and_hms_opt(0, 0, 0).zip(b.and_hms_opt(0, 0, 0)));
    let Some((start, end)) = bounds else {
        return Vec::new();
    };

    let mut grid = Vec::with_capacity(8784);
    let mut t = start;
    while t < end {
        if tz.from_local_datetime(&t).earliest().is_some() {
            grid.push(t);
        }
        t += Duration::hours(1);
    }
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .expect("valid timestamp")
    }

    #[test]
    fn accepts_strictly_increasing() {
        let s = HourlySeries::from_pairs([(ts(1, 0), 10.0), (ts(1, 1), 12.0), (ts(2, 0), 8.0)]);
        assert_eq!(s.map(|s| s.len()).ok(), Some(3));
    }

    #[test]
    fn rejects_duplicate_timestamp() {
        let err = HourlySeries::from_pairs([(ts(1, 0), 10.0), (ts(1, 0), 12.0)]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(ref m) if m.contains("duplicate")));
    }

    #[test]
    fn rejects_out_of_order_timestamp() {
        let err = HourlySeries::from_pairs([(ts(1, 5), 10.0), (ts(1, 4), 12.0)]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(ref m) if m.contains("out-of-order")));
    }

    #[test]
    fn rejects_nan_value() {
        let err = HourlySeries::from_pairs([(ts(1, 0), f64::NAN)]).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn empty_series_is_valid() {
        let s = HourlySeries::new(Vec::new()).expect("empty is ordered");
        assert!(s.is_empty());
        assert!(s.first().is_none());
    }

    #[test]
    fn grid_skips_spring_forward_hour() {
        let grid = hourly_grid(2024, chrono_tz::America::New_York);
        assert_eq!(grid.len(), 8784 - 1);
        assert!(!grid.contains(&ts_on(3, 10, 2)));
        assert!(grid.contains(&ts_on(3, 10, 3)));
        // Fall-back hour is present once.
        assert_eq!(grid.iter().filter(|t| **t == ts_on(11, 3, 1)).count(), 1);
    }

    #[test]
    fn utc_grid_has_every_hour() {
        assert_eq!(hourly_grid(2023, Tz::UTC).len(), 8760);
        assert_eq!(hourly_grid(2024, Tz::UTC).len(), 8784);
    }

    #[test]
    fn unrepresentable_year_gives_empty_grid() {
        assert!(hourly_grid(i32::MAX, Tz::UTC).is_empty());
        assert!(hourly_grid(i32::MIN, Tz::UTC).is_empty());
    }

    fn ts_on(month: u32, day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, month, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .expect("valid timestamp")
    }
}
