//! Charge/discharge price thresholds derived from price quantiles.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::series::HourlySeries;

/// Whether thresholds are computed once for the whole series or per calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdMode {
    #[default]
    Global,
    Daily,
}

/// Price band: charge at or below `low`, discharge at or above `high` ($/MWh).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceBand {
    pub low: f64,
    pub high: f64,
}

impl PriceBand {
    /// A band whose low threshold exceeds its high threshold.
    pub fn is_inverted(&self) -> bool {
        self.low > self.high
    }
}

/// Thresholds applicable to every hour of a series.
#[derive(Debug, Clone, PartialEq)]
pub enum ThresholdSet {
    /// One band for the entire series.
    Global(PriceBand),
    /// One band per calendar day.
    Daily(BTreeMap<NaiveDate, PriceBand>),
}

impl ThresholdSet {
    /// Computes thresholds from the series' own prices.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the series has no samples.
    pub fn compute(
        series: &HourlySeries,
        low_quantile: f64,
        high_quantile: f64,
        mode: ThresholdMode,
    ) -> Result<Self> {
        if series.is_empty() {
            return Err(Error::InvalidInput(
                "cannot derive thresholds from an empty price series".to_string(),
            ));
        }

        match mode {
            ThresholdMode::Global => {
                let mut prices: Vec<f64> = series.values().collect();
                Ok(Self::Global(band(&mut prices, low_quantile, high_quantile)))
            }
            ThresholdMode::Daily => {
                let mut by_day: BTreeMap<NaiveDate, Vec<f64>> = BTreeMap::new();
                for point in series {
                    by_day.entry(point.date()).or_default().push(point.value);
                }
                let bands = by_day
                    .into_iter()
                    .map(|(day, mut prices)| (day, band(&mut prices, low_quantile, high_quantile)))
                    .collect();
                Ok(Self::Daily(bands))
            }
        }
    }

    /// Returns the band that applies on `date`, if any.
    pub fn band_for(&self, date: NaiveDate) -> Option<PriceBand> {
        match self {
            Self::Global(band) => Some(*band),
            Self::Daily(bands) => bands.get(&date).copied(),
        }
    }

    /// Days (or the single global band, keyed by `None`) whose low threshold
    /// exceeds the high threshold.
    pub fn inverted(&self) -> Vec<Option<NaiveDate>> {
        match self {
            Self::Global(band) if band.is_inverted() => vec![None],
            Self::Global(_) => Vec::new(),
            Self::Daily(bands) => bands
                .iter()
                .filter(|(_, b)| b.is_inverted())
                .map(|(day, _)| Some(*day))
                .collect(),
        }
    }

    pub fn mode(&self) -> ThresholdMode {
        match self {
            Self::Global(_) => ThresholdMode::Global,
            Self::Daily(_) => ThresholdMode::Daily,
        }
    }
}

/// Sorts `prices` in place and returns the two quantiles.
fn band(prices: &mut [f64], low_quantile: f64, high_quantile: f64) -> PriceBand {
    prices.sort_by(f64::total_cmp);
    PriceBand {
        low: quantile_sorted(prices, low_quantile),
        high: quantile_sorted(prices, high_quantile),
    }
}

/// Linear-interpolation quantile of already sorted values.
///
/// Position `q * (n - 1)` is interpolated between its floor and ceiling
/// ranks. Returns NaN for an empty slice; `q` is clamped to `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    let Some(last) = sorted.len().checked_sub(1) else {
        return f64::NAN;
    };
    let pos = q.clamp(0.0, 1.0) * last as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use chrono::NaiveDateTime;

    use super::*;

    fn ts(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .expect("valid timestamp")
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).expect("valid date")
    }

    fn quantile(values: &[f64], q: f64) -> f64 {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);
        quantile_sorted(&sorted, q)
    }

    #[test]
    fn quantile_interpolates_between_ranks() {
        // pos = 0.25 * 3 = 0.75 -> 10 + (20 - 10) * 0.75
        assert_relative_eq!(quantile(&[40.0, 10.0, 30.0, 20.0], 0.25), 17.5);
        assert_relative_eq!(quantile(&[40.0, 10.0, 30.0, 20.0], 0.75), 32.5);
    }

    #[test]
    fn quantile_endpoints_are_min_and_max() {
        let v = [5.0, -3.0, 12.0, 7.0];
        assert_eq!(quantile(&v, 0.0), -3.0);
        assert_eq!(quantile(&v, 1.0), 12.0);
    }

    #[test]
    fn quantile_of_single_value() {
        assert_eq!(quantile(&[42.0], 0.3), 42.0);
    }

    #[test]
    fn quantile_of_empty_is_nan() {
        assert!(quantile(&[], 0.5).is_nan());
    }

    #[test]
    fn global_band_uses_whole_series() {
        let series = HourlySeries::from_pairs([
            (ts(1, 0), 10.0),
            (ts(1, 1), 20.0),
            (ts(2, 0), 30.0),
            (ts(2, 1), 40.0),
        ])
        .expect("valid series");
        let set = ThresholdSet::compute(&series, 0.25, 0.75, ThresholdMode::Global)
            .expect("non-empty");
        let band = set.band_for(day(2)).expect("global band");
        assert_relative_eq!(band.low, 17.5);
        assert_relative_eq!(band.high, 32.5);
        assert_eq!(set.band_for(day(1)), Some(band));
    }

    #[test]
    fn daily_bands_use_only_that_days_prices() {
        let series = HourlySeries::from_pairs([
            (ts(1, 0), 10.0),
            (ts(1, 1), 20.0),
            (ts(1, 2), 30.0),
            (ts(2, 0), 100.0),
            (ts(2, 1), 300.0),
        ])
        .expect("valid series");
        let set =
            ThresholdSet::compute(&series, 0.5, 1.0, ThresholdMode::Daily).expect("non-empty");

        let first = set.band_for(day(1)).expect("day 1 present");
        assert_relative_eq!(first.low, 20.0);
        assert_relative_eq!(first.high, 30.0);

        // Partial day with two samples still yields valid quantiles.
        let second = set.band_for(day(2)).expect("day 2 present");
        assert_relative_eq!(second.low, 200.0);
        assert_relative_eq!(second.high, 300.0);

        assert_eq!(set.band_for(day(3)), None);
        assert_eq!(set.mode(), ThresholdMode::Daily);
    }

    #[test]
    fn empty_series_is_rejected() {
        let series = HourlySeries::default();
        let err = ThresholdSet::compute(&series, 0.25, 0.75, ThresholdMode::Global).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
    }

    #[test]
    fn inverted_bands_are_reported() {
        let mut bands = BTreeMap::new();
        bands.insert(day(1), PriceBand { low: 10.0, high: 20.0 });
        bands.insert(day(2), PriceBand { low: 25.0, high: 20.0 });
        let set = ThresholdSet::Daily(bands);
        assert_eq!(set.inverted(), vec![Some(day(2))]);

        let global = ThresholdSet::Global(PriceBand { low: 5.0, high: 1.0 });
        assert_eq!(global.inverted(), vec![None]);
    }
}
