//! One-at-a-time sensitivity of the project economics.
//!
//! Each sweep value is written into a copy of the base configuration. The
//! cash flows are rebuilt from the year-1 revenue, and the battery is
//! re-dispatched first when the value changes its size, efficiency or
//! thresholds.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::{ConfigError, ProjectConfig};
use crate::error::Result;
use crate::finance::{FinancialSummary, build_cashflows};
use crate::market::{AnnualRevenue, SolarRevenueHour, annual_revenue};
use crate::runner::run_bess;
use crate::series::HourlySeries;

/// Configuration value varied by a sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityParameter {
    DiscountRate,
    InflationRate,
    EscalationRate,
    ItcCredit,
    SolarCapexPerMw,
    BessCapexPerMwh,
    OAndMPerMw,
    SolarDegradation,
    BessDegradation,
    ReplacementCostFrac,
    DurationHours,
    ChargeEfficiency,
    DischargeEfficiency,
    LowQuantile,
    HighQuantile,
}

impl SensitivityParameter {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DiscountRate => "discount_rate",
            Self::InflationRate => "inflation_rate",
            Self::EscalationRate => "escalation_rate",
            Self::ItcCredit => "itc_credit",
            Self::SolarCapexPerMw => "solar_capex_per_mw",
            Self::BessCapexPerMwh => "bess_capex_per_mwh",
            Self::OAndMPerMw => "o_and_m_per_mw",
            Self::SolarDegradation => "solar_degradation",
            Self::BessDegradation => "bess_degradation",
            Self::ReplacementCostFrac => "replacement_cost_frac",
            Self::DurationHours => "duration_hours",
            Self::ChargeEfficiency => "charge_efficiency",
            Self::DischargeEfficiency => "discharge_efficiency",
            Self::LowQuantile => "low_quantile",
            Self::HighQuantile => "high_quantile",
        }
    }

    /// Whether a change requires a new dispatch run.
    pub fn affects_dispatch(self) -> bool {
        matches!(
            self,
            Self::DurationHours
                | Self::ChargeEfficiency
                | Self::DischargeEfficiency
                | Self::LowQuantile
                | Self::HighQuantile
        )
    }

    /// Writes `value` into the matching configuration field.
    pub fn apply(self, cfg: &mut ProjectConfig, value: f64) {
        let field = match self {
            Self::DiscountRate => &mut cfg.financials.discount_rate,
            Self::InflationRate => &mut cfg.financials.inflation_rate,
            Self::EscalationRate => &mut cfg.financials.escalation_rate,
            Self::ItcCredit => &mut cfg.financials.itc_credit,
            Self::SolarCapexPerMw => &mut cfg.capex.solar_per_mw,
            Self::BessCapexPerMwh => &mut cfg.capex.bess_per_mwh,
            Self::OAndMPerMw => &mut cfg.financials.o_and_m_per_mw,
            Self::SolarDegradation => &mut cfg.solar.degradation,
            Self::BessDegradation => &mut cfg.bess.degradation,
            Self::ReplacementCostFrac => &mut cfg.bess.replacement_cost_frac,
            Self::DurationHours => &mut cfg.bess.duration_hours,
            Self::ChargeEfficiency => &mut cfg.bess.charge_efficiency,
            Self::DischargeEfficiency => &mut cfg.bess.discharge_efficiency,
            Self::LowQuantile => &mut cfg.dispatch.low_quantile,
            Self::HighQuantile => &mut cfg.dispatch.high_quantile,
        };
        *field = value;
    }
}

impl fmt::Display for SensitivityParameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Values tried for one parameter, all others held at their base value.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Sweep {
    pub parameter: SensitivityParameter,
    pub values: Vec<f64>,
}

impl Sweep {
    pub fn new(parameter: SensitivityParameter, values: impl Into<Vec<f64>>) -> Self {
        Self {
            parameter,
            values: values.into(),
        }
    }
}

/// Unmodified run the sweeps are measured against.
#[derive(Debug, Clone, Copy)]
pub struct Baseline<'a> {
    pub config: &'a ProjectConfig,
    /// Cleaned price series, re-dispatched for battery and threshold sweeps.
    pub prices: &'a HourlySeries,
    /// Priced solar hours, used to align re-dispatched battery revenue.
    pub solar_hours: &'a [SolarRevenueHour],
    /// Year-1 solar revenue ($).
    pub solar_revenue: f64,
    /// Year-1 battery net revenue ($).
    pub bess_revenue: f64,
}

/// Project economics of one sweep value.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensitivityRow {
    #[serde(rename = "Parameter")]
    pub parameter: SensitivityParameter,
    #[serde(rename = "Value")]
    pub value: f64,
    #[serde(rename = "Year-1 BESS Revenue ($)")]
    pub bess_revenue: f64,
    #[serde(rename = "NPV ($M)")]
    pub npv_musd: f64,
    /// NPV minus the baseline NPV.
    #[serde(rename = "NPV Change ($M)")]
    pub npv_change_musd: f64,
    #[serde(rename = "IRR (%)")]
    pub irr_pct: Option<f64>,
}

impl fmt::Display for SensitivityRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = format!("{} = {}", self.parameter, self.value);
        write!(
            f,
            "{label:<31} NPV {:>8.2} $M ({:+.2})",
            self.npv_musd, self.npv_change_musd
        )?;
        match self.irr_pct {
            Some(irr) => write!(f, ", IRR {irr:.2}%"),
            None => write!(f, ", IRR n/a"),
        }
    }
}

/// Year-1 solar and battery revenue; zero when the tables share no hours.
pub fn year_one_revenue(annual: &[AnnualRevenue]) -> (f64, f64) {
    annual
        .first()
        .map_or((0.0, 0.0), |y| (y.solar_revenue, y.bess_revenue))
}

/// Runs every sweep against `base` and returns one row per value, in sweep
/// order.
///
/// # Errors
///
/// Returns [`crate::Error::Configuration`] when a value makes the
/// configuration invalid, or any error from re-running the dispatch.
pub fn sensitivity(base: &Baseline<'_>, sweeps: &[Sweep]) -> Result<Vec<SensitivityRow>> {
    let base_params = base.config.cashflow_parameters();
    let base_flows = build_cashflows(base.solar_revenue, base.bess_revenue, &base_params);
    let base_npv = FinancialSummary::new(&base_params, &base_flows).npv_musd;

    let mut rows = Vec::with_capacity(sweeps.iter().map(|s| s.values.len()).sum());
    for sweep in sweeps {
        for &value in &sweep.values {
            let mut cfg = base.config.clone();
            sweep.parameter.apply(&mut cfg, value);
            if let Some(e) = cfg.validate().into_iter().next() {
                return Err(ConfigError::new(
                    format!("sensitivity.{}", sweep.parameter),
                    format!("value {value} is invalid: {}: {}", e.field, e.message),
                )
                .into());
            }

            let bess_revenue = if sweep.parameter.affects_dispatch() {
                let params = cfg.dispatch_parameters()?;
                let run = run_bess(base.prices, &params, cfg.dispatch.min_hours)?;
                year_one_revenue(&annual_revenue(base.solar_hours, &run.records)).1
            } else {
                base.bess_revenue
            };

            let params = cfg.cashflow_parameters();
            let flows = build_cashflows(base.solar_revenue, bess_revenue, &params);
            let summary = FinancialSummary::new(&params, &flows);
            debug!(
                parameter = %sweep.parameter,
                value,
                npv_musd = summary.npv_musd,
                "sensitivity case"
            );
            rows.push(SensitivityRow {
                parameter: sweep.parameter,
                value,
                bess_revenue,
                npv_musd: summary.npv_musd,
                npv_change_musd: summary.npv_musd - base_npv,
                irr_pct: summary.irr_pct,
            });
        }
    }
    info!(cases = rows.len(), "sensitivity sweep finished");
    Ok(rows)
}
