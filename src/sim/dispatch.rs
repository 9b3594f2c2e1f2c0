//! Price-threshold battery dispatch.
//!
//! A greedy state machine: each hour the battery charges when the price is at
//! or below the low threshold, discharges when it is at or above the high
//! threshold, and idles otherwise. The only state is the state of charge,
//! carried from one hour to the next.

use chrono::NaiveDate;
use serde::Serialize;

use crate::config::ConfigError;
use crate::error::{Error, Result};
use crate::series::{HourlyPoint, HourlySeries};

use super::threshold::{PriceBand, ThresholdMode, ThresholdSet};
use super::types::{DispatchMode, HourlyRecord};

/// Immutable battery and policy parameters for one run.
///
/// Capacity is always `power_mw * duration_hours`; both are fixed for the run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchParameters {
    /// Energy capacity (MWh).
    capacity_mwh: f64,
    /// Power rating bounding both charge and discharge per hour (MW).
    power_mw: f64,
    /// Grid-to-cell efficiency, in (0, 1].
    charge_efficiency: f64,
    /// Cell-to-grid efficiency, in (0, 1].
    discharge_efficiency: f64,
    low_quantile: f64,
    high_quantile: f64,
    threshold_mode: ThresholdMode,
}

impl DispatchParameters {
    /// Validates and builds the parameter set.
    ///
    /// # Arguments
    ///
    /// * `power_mw` - Power rating (MW, > 0)
    /// * `duration_hours` - Hours at rated power from empty to full (> 0)
    /// * `charge_efficiency` - Grid-to-cell efficiency in (0, 1]
    /// * `discharge_efficiency` - Cell-to-grid efficiency in (0, 1]
    /// * `low_quantile` - Charge threshold quantile, `0 <= low < high`
    /// * `high_quantile` - Discharge threshold quantile, `high <= 1`
    /// * `threshold_mode` - Global or per-day thresholds
    ///
    /// # Errors
    ///
    /// Returns the first violated constraint as a [`ConfigError`].
    pub fn new(
        power_mw: f64,
        duration_hours: f64,
        charge_efficiency: f64,
        discharge_efficiency: f64,
        low_quantile: f64,
        high_quantile: f64,
        threshold_mode: ThresholdMode,
    ) -> Result<Self, ConfigError> {
        let positive = |field: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::new(field, format!("must be > 0, got {v}")))
            }
        };
        let efficiency = |field: &str, v: f64| {
            if v > 0.0 && v <= 1.0 {
                Ok(())
            } else {
                Err(ConfigError::new(field, format!("must be in (0, 1], got {v}")))
            }
        };

        positive("project.capacity_mw", power_mw)?;
        positive("bess.duration_hours", duration_hours)?;
        efficiency("bess.charge_efficiency", charge_efficiency)?;
        efficiency("bess.discharge_efficiency", discharge_efficiency)?;
        if !(0.0..=1.0).contains(&low_quantile) {
            return Err(ConfigError::new(
                "dispatch.low_quantile",
                format!("must be in [0, 1], got {low_quantile}"),
            ));
        }
        if !(0.0..=1.0).contains(&high_quantile) {
            return Err(ConfigError::new(
                "dispatch.high_quantile",
                format!("must be in [0, 1], got {high_quantile}"),
            ));
        }
        if low_quantile >= high_quantile {
            return Err(ConfigError::new(
                "dispatch.low_quantile",
                format!("must be < dispatch.high_quantile ({low_quantile} >= {high_quantile})"),
            ));
        }

        Ok(Self {
            capacity_mwh: power_mw * duration_hours,
            power_mw,
            charge_efficiency,
            discharge_efficiency,
            low_quantile,
            high_quantile,
            threshold_mode,
        })
    }

    pub fn capacity_mwh(&self) -> f64 {
        self.capacity_mwh
    }

    pub fn power_mw(&self) -> f64 {
        self.power_mw
    }

    pub fn charge_efficiency(&self) -> f64 {
        self.charge_efficiency
    }

    pub fn discharge_efficiency(&self) -> f64 {
        self.discharge_efficiency
    }

    pub fn low_quantile(&self) -> f64 {
        self.low_quantile
    }

    pub fn high_quantile(&self) -> f64 {
        self.high_quantile
    }

    pub fn threshold_mode(&self) -> ThresholdMode {
        self.threshold_mode
    }

    /// Computes the threshold set these parameters call for.
    ///
    /// # Errors
    ///
    /// See [`ThresholdSet::compute`].
    pub fn thresholds(&self, prices: &HourlySeries) -> Result<ThresholdSet> {
        ThresholdSet::compute(
            prices,
            self.low_quantile,
            self.high_quantile,
            self.threshold_mode,
        )
    }
}

/// Applies one hour of the policy to `soc_mwh` and returns the record.
///
/// Charge is tested before discharge, so a degenerate band where both
/// conditions hold charges. The resulting SOC is clamped to
/// `[0, capacity]`.
pub fn step(
    soc_mwh: f64,
    point: &HourlyPoint,
    band: PriceBand,
    params: &DispatchParameters,
) -> HourlyRecord {
    let price = point.value;
    let capacity = params.capacity_mwh;

    let mut soc = soc_mwh;
    let mut mode = DispatchMode::Idle;
    let mut charge_mw = 0.0;
    let mut discharge_mw = 0.0;
    let mut charge_energy_mwh = 0.0;
    let mut discharge_energy_mwh = 0.0;

    if price <= band.low && soc < capacity {
        mode = DispatchMode::Charge;
        charge_energy_mwh = params.power_mw.min(capacity - soc);
        charge_mw = charge_energy_mwh / params.charge_efficiency;
        soc += charge_energy_mwh;
    } else if price >= band.high && soc > 0.0 {
        mode = DispatchMode::Discharge;
        discharge_energy_mwh = params.power_mw.min(soc);
        discharge_mw = discharge_energy_mwh * params.discharge_efficiency;
        soc -= discharge_energy_mwh;
    }

    // Guards against floating-point drift at the bounds.
    let soc = soc.clamp(0.0, capacity);

    let charge_cost = charge_mw * price;
    let discharge_revenue = discharge_mw * price;

    HourlyRecord {
        timestamp: point.timestamp,
        price,
        mode,
        soc_mwh: soc,
        charge_mw,
        discharge_mw,
        charge_cost,
        discharge_revenue,
        net_revenue: discharge_revenue - charge_cost,
        charge_energy_mwh,
        discharge_energy_mwh,
        throughput_mwh: charge_energy_mwh + discharge_energy_mwh,
    }
}

/// Outcome of a full dispatch scan.
#[derive(Debug, Clone, PartialEq)]
pub struct DispatchOutcome {
    /// One record per input hour, in input order.
    pub records: Vec<HourlyRecord>,
    /// State of charge after the last hour (MWh).
    pub final_soc_mwh: f64,
}

/// Runs the policy over `prices` in time order, starting empty.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if a daily threshold set has no band for
/// the calendar day of some hour.
pub fn simulate(
    prices: &HourlySeries,
    params: &DispatchParameters,
    thresholds: &ThresholdSet,
) -> Result<DispatchOutcome> {
    let init = (0.0_f64, Vec::with_capacity(prices.len()), None::<(NaiveDate, PriceBand)>);

    let (final_soc_mwh, records, _) =
        prices
            .iter()
            .try_fold(init, |(soc, mut records, cached), point| {
                let day = point.date();
                let band = match cached {
                    Some((cached_day, band)) if cached_day == day => band,
                    _ => thresholds.band_for(day).ok_or_else(|| {
                        Error::InvalidInput(format!("no price thresholds for {day}"))
                    })?,
                };

                let record = step(soc, point, band, params);
                let soc = record.soc_mwh;
                records.push(record);
                Ok::<_, Error>((soc, records, Some((day, band))))
            })?;

    Ok(DispatchOutcome {
        records,
        final_soc_mwh,
    })
}
