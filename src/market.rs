//! Price statistics, day-ahead vs real-time comparison and solar revenue /
//! capture price analysis.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::series::HourlySeries;
use crate::sim::types::HourlyRecord;

/// Hours in a non-leap year, the capacity factor denominator.
pub const HOURS_PER_YEAR: f64 = 8760.0;

/// Descriptive statistics of a price series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceStats {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (0 for fewer than two samples).
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
    /// `(month, mean)` for months with data, January = 1.
    pub monthly_means: Vec<(u32, f64)>,
    /// `(month, sample std)` for months with data, the monthly volatility.
    pub monthly_std_devs: Vec<(u32, f64)>,
    /// `(hour, mean)` for hours of day with data.
    pub hourly_means: Vec<(u32, f64)>,
}

impl PriceStats {
    /// Returns `None` for an empty series.
    pub fn from_series(series: &HourlySeries) -> Option<Self> {
        let n = series.len();
        if n == 0 {
            return None;
        }

        let values: Vec<f64> = series.values().collect();
        let (mean, std_dev) = mean_and_std(&values);
        let min = values.iter().copied().fold(f64::INFINITY, f64::min);
        let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

        let mut by_month: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        let mut by_hour: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
        for p in series {
            by_month.entry(p.timestamp.month()).or_default().push(p.value);
            by_hour.entry(p.timestamp.hour()).or_default().push(p.value);
        }
        let monthly: Vec<(u32, (f64, f64))> = by_month
            .into_iter()
            .map(|(m, v)| (m, mean_and_std(&v)))
            .collect();

        Some(Self {
            count: n,
            mean,
            std_dev,
            min,
            max,
            monthly_means: monthly.iter().map(|&(m, (mean, _))| (m, mean)).collect(),
            monthly_std_devs: monthly.iter().map(|&(m, (_, std))| (m, std)).collect(),
            hourly_means: by_hour
                .into_iter()
                .map(|(h, v)| (h, mean_and_std(&v).0))
                .collect(),
        })
    }
}

/// Mean and sample standard deviation; the deviation is 0 below two values.
fn mean_and_std(values: &[f64]) -> (f64, f64) {
    let n = values.len();
    if n == 0 {
        return (f64::NAN, 0.0);
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    if n < 2 {
        return (mean, 0.0);
    }
    let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
    (mean, (ss / (n - 1) as f64).sqrt())
}

/// Pearson correlation of two equally long samples.
///
/// Returns `None` for mismatched lengths, fewer than two pairs, or a
/// constant input.
pub fn pearson(xs: &[f64], ys: &[f64]) -> Option<f64> {
    let n = xs.len();
    if n != ys.len() || n < 2 {
        return None;
    }
    let mx = xs.iter().sum::<f64>() / n as f64;
    let my = ys.iter().sum::<f64>() / n as f64;
    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (x, y) in xs.iter().zip(ys) {
        let (dx, dy) = (x - mx, y - my);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    let denom = (sxx * syy).sqrt();
    (denom > 0.0).then(|| sxy / denom)
}

impl fmt::Display for PriceStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} hours, mean {:.2} $/MWh (std {:.2}, min {:.2}, max {:.2})",
            self.count, self.mean, self.std_dev, self.min, self.max
        )
    }
}

/// Day-ahead and real-time price of one hour present in both series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PriceComparisonHour {
    pub timestamp: NaiveDateTime,
    #[serde(rename = "DAM_LBMP")]
    pub day_ahead: f64,
    #[serde(rename = "RTD_LBMP")]
    pub real_time: f64,
    /// Real-time minus day-ahead ($/MWh).
    #[serde(rename = "RTD_minus_DAM")]
    pub spread: f64,
}

/// Joins day-ahead and real-time prices on timestamp.
///
/// Hours missing from either series are dropped.
pub fn compare_prices(
    day_ahead: &HourlySeries,
    real_time: &HourlySeries,
) -> Vec<PriceComparisonHour> {
    let rt_at: BTreeMap<NaiveDateTime, f64> =
        real_time.iter().map(|p| (p.timestamp, p.value)).collect();
    day_ahead
        .iter()
        .filter_map(|d| {
            rt_at.get(&d.timestamp).map(|&rt| PriceComparisonHour {
                timestamp: d.timestamp,
                day_ahead: d.value,
                real_time: rt,
                spread: rt - d.value,
            })
        })
        .collect()
}

/// Correlation between the day-ahead and real-time columns of a comparison.
pub fn day_ahead_real_time_correlation(hours: &[PriceComparisonHour]) -> Option<f64> {
    let dam: Vec<f64> = hours.iter().map(|h| h.day_ahead).collect();
    let rtd: Vec<f64> = hours.iter().map(|h| h.real_time).collect();
    pearson(&dam, &rtd)
}

/// One-row digest of the price series, written as `lbmp_summary.csv`.
///
/// Each statistic is averaged over the supplied series (day-ahead and, when
/// loaded, real-time).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LbmpSummary {
    /// Mean of the monthly mean prices.
    #[serde(rename = "Monthly_Mean_$MWh")]
    pub monthly_mean: f64,
    /// Standard deviation of the hour-of-day mean profile.
    #[serde(rename = "Hourly_Std_$MWh")]
    pub hourly_std: f64,
    #[serde(rename = "Annual_Mean_$MWh")]
    pub annual_mean: f64,
    #[serde(rename = "Annual_Std_$MWh")]
    pub annual_std: f64,
    #[serde(rename = "Correlation_DAM_RTD")]
    pub correlation: Option<f64>,
}

impl LbmpSummary {
    /// Returns `None` when `stats` is empty.
    pub fn new(stats: &[&PriceStats], correlation: Option<f64>) -> Option<Self> {
        if stats.is_empty() {
            return None;
        }
        let n = stats.len() as f64;
        let (mut monthly_mean, mut hourly_std, mut annual_mean, mut annual_std) =
            (0.0, 0.0, 0.0, 0.0);
        for s in stats {
            let monthly: Vec<f64> = s.monthly_means.iter().map(|&(_, v)| v).collect();
            let hourly: Vec<f64> = s.hourly_means.iter().map(|&(_, v)| v).collect();
            monthly_mean += mean_and_std(&monthly).0 / n;
            hourly_std += mean_and_std(&hourly).1 / n;
            annual_mean += s.mean / n;
            annual_std += s.std_dev / n;
        }
        Some(Self {
            monthly_mean,
            hourly_std,
            annual_mean,
            annual_std,
            correlation,
        })
    }
}

impl fmt::Display for LbmpSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- LBMP Summary ---")?;
        writeln!(f, "Monthly mean:          {:.2} $/MWh", self.monthly_mean)?;
        writeln!(f, "Hourly profile std:    {:.2} $/MWh", self.hourly_std)?;
        writeln!(f, "Annual mean:           {:.2} $/MWh", self.annual_mean)?;
        write!(f, "Annual std:            {:.2} $/MWh", self.annual_std)?;
        if let Some(r) = self.correlation {
            write!(f, "\nDAM/RTD correlation:   {r:.3}")?;
        }
        Ok(())
    }
}

/// Solar output and revenue for one hour present in both series.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolarRevenueHour {
    pub timestamp: NaiveDateTime,
    pub generation_mwh: f64,
    pub price: f64,
    pub revenue: f64,
}

/// Joins generation and prices on timestamp and prices every hour.
///
/// Hours missing from either series are dropped.
pub fn solar_revenue(prices: &HourlySeries, generation: &HourlySeries) -> Vec<SolarRevenueHour> {
    let price_at: BTreeMap<NaiveDateTime, f64> =
        prices.iter().map(|p| (p.timestamp, p.value)).collect();
    generation
        .iter()
        .filter_map(|g| {
            price_at.get(&g.timestamp).map(|&price| SolarRevenueHour {
                timestamp: g.timestamp,
                generation_mwh: g.value,
                price,
                revenue: g.value * price,
            })
        })
        .collect()
}

/// Solar revenue summed per calendar day.
pub fn solar_daily_revenue(hours: &[SolarRevenueHour]) -> Vec<(NaiveDate, f64)> {
    let mut days: Vec<(NaiveDate, f64)> = Vec::new();
    for h in hours {
        let day = h.timestamp.date();
        match days.last_mut() {
            Some((d, total)) if *d == day => *total += h.revenue,
            _ => days.push((day, h.revenue)),
        }
    }
    days
}

/// Solar revenue summed per calendar month, keyed by the first of the month.
pub fn solar_monthly_revenue(hours: &[SolarRevenueHour]) -> Vec<(NaiveDate, f64)> {
    let mut months: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    for h in hours {
        *months
            .entry((h.timestamp.year(), h.timestamp.month()))
            .or_default() += h.revenue;
    }
    months
        .into_iter()
        .filter_map(|((y, m), total)| NaiveDate::from_ymd_opt(y, m, 1).map(|d| (d, total)))
        .collect()
}

/// Yearly solar economics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarketSummary {
    #[serde(rename = "Total Generation (MWh)")]
    pub total_generation_mwh: f64,
    #[serde(rename = "Total Revenue ($)")]
    pub total_revenue: f64,
    /// Revenue-weighted average price, 0 without generation.
    #[serde(rename = "Capture Price ($/MWh)")]
    pub capture_price: f64,
    #[serde(rename = "Capacity Factor")]
    pub capacity_factor: f64,
}

impl MarketSummary {
    pub fn from_hours(hours: &[SolarRevenueHour], capacity_mw: f64) -> Self {
        let total_generation_mwh: f64 = hours.iter().map(|h| h.generation_mwh).sum();
        let total_revenue: f64 = hours.iter().map(|h| h.revenue).sum();
        let capture_price = if total_generation_mwh > 0.0 {
            total_revenue / total_generation_mwh
        } else {
            0.0
        };
        let capacity_factor = if capacity_mw > 0.0 {
            total_generation_mwh / (capacity_mw * HOURS_PER_YEAR)
        } else {
            0.0
        };
        Self {
            total_generation_mwh,
            total_revenue,
            capture_price,
            capacity_factor,
        }
    }
}

impl fmt::Display for MarketSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Solar Market Summary ---")?;
        writeln!(f, "Total generation:      {:.2} MWh", self.total_generation_mwh)?;
        writeln!(f, "Total revenue:         {:.2} $", self.total_revenue)?;
        writeln!(f, "Capture price:         {:.2} $/MWh", self.capture_price)?;
        write!(f, "Capacity factor:       {:.2}%", self.capacity_factor * 100.0)
    }
}

/// Solar and storage revenue of one calendar year.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnnualRevenue {
    pub year: i32,
    pub solar_revenue: f64,
    pub bess_revenue: f64,
    pub total_revenue: f64,
}

/// Sums solar revenue and battery net revenue per calendar year over the
/// hours present in both tables.
pub fn annual_revenue(solar: &[SolarRevenueHour], bess: &[HourlyRecord]) -> Vec<AnnualRevenue> {
    let bess_at: BTreeMap<NaiveDateTime, f64> =
        bess.iter().map(|r| (r.timestamp, r.net_revenue)).collect();

    let mut years: BTreeMap<i32, (f64, f64)> = BTreeMap::new();
    for h in solar {
        if let Some(&bess_rev) = bess_at.get(&h.timestamp) {
            let y = years.entry(h.timestamp.year()).or_insert((0.0, 0.0));
            y.0 += h.revenue;
            y.1 += bess_rev;
        }
    }

    years
        .into_iter()
        .map(|(year, (solar_revenue, bess_revenue))| AnnualRevenue {
            year,
            solar_revenue,
            bess_revenue,
            total_revenue: solar_revenue + bess_revenue,
        })
        .collect()
}
