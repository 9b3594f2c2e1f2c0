//! End-to-end dispatch run: validate, threshold, simulate, summarize.

use chrono::NaiveDate;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::series::HourlySeries;
use crate::sim::dispatch::{self, DispatchParameters};
use crate::sim::summary::{DailyRevenue, DispatchSummary, daily_revenue};
use crate::sim::threshold::ThresholdSet;
use crate::sim::types::HourlyRecord;

/// Default lower bound on the number of hourly prices for a full-year run.
pub const DEFAULT_MIN_HOURS: usize = 8000;

/// Everything produced by one dispatch run.
#[derive(Debug, Clone)]
pub struct BessRun {
    pub parameters: DispatchParameters,
    pub thresholds: ThresholdSet,
    /// One record per input hour.
    pub records: Vec<HourlyRecord>,
    pub final_soc_mwh: f64,
    pub summary: DispatchSummary,
    /// Bands with `low > high`; `None` stands for the global band.
    pub inverted_bands: Vec<Option<NaiveDate>>,
}

impl BessRun {
    /// Per-day net revenue with running total.
    pub fn daily_revenue(&self) -> Vec<DailyRevenue> {
        daily_revenue(&self.records)
    }
}

/// Runs the battery model over a full year of prices.
///
/// # Arguments
///
/// * `prices` - Cleaned hourly price series
/// * `params` - Validated battery and policy parameters
/// * `min_hours` - Minimum accepted series length
///
/// # Errors
///
/// Returns [`Error::InsufficientData`] when the series is shorter than
/// `min_hours`, or any error from threshold computation and dispatch.
pub fn run_bess(
    prices: &HourlySeries,
    params: &DispatchParameters,
    min_hours: usize,
) -> Result<BessRun> {
    let rows = prices.len();
    if rows < min_hours {
        return Err(Error::InsufficientData {
            rows,
            required: min_hours,
        });
    }
    info!(hours = rows, "hours in price series");

    let thresholds = params.thresholds(prices)?;
    let inverted_bands = thresholds.inverted();
    for day in &inverted_bands {
        match day {
            Some(day) => warn!(%day, "daily price band is inverted (low > high)"),
            None => warn!("global price band is inverted (low > high)"),
        }
    }

    let outcome = dispatch::simulate(prices, params, &thresholds)?;
    let summary = DispatchSummary::from_records(&outcome.records, params.capacity_mwh());

    let report = summary.report();
    info!(
        total_net_revenue = report.total_net_revenue,
        full_cycles = report.full_cycles,
        average_soc_mwh = report.average_soc_mwh,
        days_active = report.days_active,
        average_daily_net_revenue = report.average_daily_net_revenue,
        "BESS simulation complete"
    );

    Ok(BessRun {
        parameters: params.clone(),
        thresholds,
        records: outcome.records,
        final_soc_mwh: outcome.final_soc_mwh,
        summary,
        inverted_bands,
    })
}
