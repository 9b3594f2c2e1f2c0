//! Project cash flows, NPV and IRR for the combined solar + storage plant.
//!
//! Cash flows are pre-tax and nominal. The ITC is taken as an upfront capex
//! reduction; revenues degrade and escalate, O&M inflates, and the battery is
//! partially re-bought once in its replacement year.

use std::fmt;

use serde::Serialize;

/// Lower end of the IRR search interval.
const IRR_MIN: f64 = -0.99;
/// Upper end of the IRR search interval.
const IRR_MAX: f64 = 10.0;
/// Bracket scan step for the IRR search.
const IRR_SCAN_STEP: f64 = 0.01;
const IRR_TOLERANCE: f64 = 1e-10;

/// Inputs to the cash-flow projection, in dollars and annual fractions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CashflowParameters {
    /// Years of operation.
    pub project_life: u32,
    pub discount_rate: f64,
    /// O&M escalation.
    pub inflation_rate: f64,
    /// Revenue escalation.
    pub escalation_rate: f64,
    /// Solar capital cost ($).
    pub solar_capex: f64,
    /// Storage capital cost ($).
    pub bess_capex: f64,
    pub itc_credit: f64,
    /// Year-1 fixed O&M ($).
    pub opex_fixed: f64,
    pub solar_degradation: f64,
    pub bess_degradation: f64,
    /// 1-based project year of the battery replacement, 0 for none.
    pub replacement_year: u32,
    /// Fraction of storage capex spent on the replacement.
    pub replacement_cost_frac: f64,
}

impl CashflowParameters {
    pub fn total_capex(&self) -> f64 {
        self.solar_capex + self.bess_capex
    }

    /// Capex net of the investment tax credit.
    pub fn initial_investment(&self) -> f64 {
        self.total_capex() * (1.0 - self.itc_credit)
    }
}

/// `base * (1 - rate)^y` for `y` in `0..years`.
pub fn apply_degradation(base: f64, rate: f64, years: u32) -> Vec<f64> {
    (0..years)
        .map(|y| base * (1.0 - rate).powf(f64::from(y)))
        .collect()
}

/// Builds the annual cash flows; index 0 is the (negative) initial investment
/// and index `y` is project year `y`.
///
/// # Arguments
///
/// * `base_solar_revenue` - Year-1 solar revenue ($)
/// * `base_bess_revenue` - Year-1 battery net revenue ($)
/// * `params` - Cost, escalation and degradation assumptions
pub fn build_cashflows(
    base_solar_revenue: f64,
    base_bess_revenue: f64,
    params: &CashflowParameters,
) -> Vec<f64> {
    let life = params.project_life;
    let solar = apply_degradation(base_solar_revenue, params.solar_degradation, life);
    let bess = apply_degradation(base_bess_revenue, params.bess_degradation, life);

    let mut flows = Vec::with_capacity(life as usize + 1);
    flows.push(-params.initial_investment());

    for (y, (s, b)) in solar.iter().zip(&bess).enumerate() {
        let year = y as u32 + 1;
        let exponent = y as f64;
        let revenue = (s + b) * (1.0 + params.escalation_rate).powf(exponent);
        let opex = params.opex_fixed * (1.0 + params.inflation_rate).powf(exponent);
        let mut net = revenue - opex;
        if year == params.replacement_year {
            net -= params.bess_capex * params.replacement_cost_frac;
        }
        flows.push(net);
    }
    flows
}

/// Present value with `flows[0]` undiscounted and `flows[t]` discounted by
/// `(1 + rate)^t`.
pub fn npv(rate: f64, flows: &[f64]) -> f64 {
    flows
        .iter()
        .enumerate()
        .map(|(t, cf)| cf / (1.0 + rate).powi(t as i32))
        .sum()
}

/// Project NPV: the initial flow plus [`npv`] of the operating flows.
///
/// The first operating year is therefore undiscounted, the usual
/// spreadsheet convention for this model.
pub fn project_npv(rate: f64, flows: &[f64]) -> f64 {
    match flows.split_first() {
        Some((initial, rest)) => initial + npv(rate, rest),
        None => 0.0,
    }
}

/// Internal rate of return: the rate in `(-0.99, 10]` at which [`npv`] of
/// `flows` is zero.
///
/// The interval is scanned for the first sign change, then bisected.
/// Returns `None` when the NPV does not change sign on the interval.
pub fn irr(flows: &[f64]) -> Option<f64> {
    if flows.iter().all(|cf| *cf == 0.0) {
        return None;
    }
    let f = |r: f64| npv(r, flows);

    let steps = ((IRR_MAX - IRR_MIN) / IRR_SCAN_STEP).round() as usize;
    let mut bracket = None;
    let mut lo = IRR_MIN;
    let mut f_lo = f(lo);
    for i in 1..=steps {
        if f_lo == 0.0 {
            return Some(lo);
        }
        let hi = (IRR_MIN + i as f64 * IRR_SCAN_STEP).min(IRR_MAX);
        let f_hi = f(hi);
        if f_lo.signum() != f_hi.signum() {
            bracket = Some((lo, hi, f_lo));
            break;
        }
        lo = hi;
        f_lo = f_hi;
    }

    let (mut lo, mut hi, mut f_lo) = bracket?;
    for _ in 0..200 {
        let mid = 0.5 * (lo + hi);
        let f_mid = f(mid);
        if f_mid == 0.0 || (hi - lo) < IRR_TOLERANCE {
            return Some(mid);
        }
        if f_mid.signum() == f_lo.signum() {
            lo = mid;
            f_lo = f_mid;
        } else {
            hi = mid;
        }
    }
    Some(0.5 * (lo + hi))
}

/// One row of the cash-flow table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Cashflow {
    #[serde(rename = "Year")]
    pub year: u32,
    #[serde(rename = "Cashflow")]
    pub cashflow: f64,
}

/// Pairs each flow with its project year (0 = construction).
pub fn cashflow_table(flows: &[f64]) -> Vec<Cashflow> {
    flows
        .iter()
        .enumerate()
        .map(|(year, &cashflow)| Cashflow {
            year: year as u32,
            cashflow,
        })
        .collect()
}

/// Headline project economics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialSummary {
    #[serde(rename = "NPV ($M)")]
    pub npv_musd: f64,
    /// Absent when the flows never change sign.
    #[serde(rename = "IRR (%)")]
    pub irr_pct: Option<f64>,
    #[serde(rename = "Total CAPEX ($M)")]
    pub total_capex_musd: f64,
    #[serde(rename = "Initial Investment ($)")]
    pub initial_investment: f64,
    #[serde(rename = "Annual OPEX (Year 1, $)")]
    pub annual_opex_year1: f64,
    #[serde(rename = "Discount Rate")]
    pub discount_rate: f64,
    #[serde(rename = "Revenue Escalation Rate")]
    pub escalation_rate: f64,
    #[serde(rename = "Inflation Rate")]
    pub inflation_rate: f64,
    #[serde(rename = "Project Life (yrs)")]
    pub project_life: u32,
    #[serde(rename = "Battery Replacement Year")]
    pub replacement_year: u32,
    #[serde(rename = "Battery Replacement Cost Fraction")]
    pub replacement_cost_frac: f64,
}

impl FinancialSummary {
    /// Summarizes `flows` built from `params`.
    pub fn new(params: &CashflowParameters, flows: &[f64]) -> Self {
        Self {
            npv_musd: project_npv(params.discount_rate, flows) / 1_000_000.0,
            irr_pct: irr(flows).map(|r| r * 100.0),
            total_capex_musd: params.total_capex() / 1_000_000.0,
            initial_investment: params.initial_investment(),
            annual_opex_year1: params.opex_fixed,
            discount_rate: params.discount_rate,
            escalation_rate: params.escalation_rate,
            inflation_rate: params.inflation_rate,
            project_life: params.project_life,
            replacement_year: params.replacement_year,
            replacement_cost_frac: params.replacement_cost_frac,
        }
    }
}

impl fmt::Display for FinancialSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Financial Summary ---")?;
        writeln!(f, "NPV:                   {:.2} $M", self.npv_musd)?;
        match self.irr_pct {
            Some(irr) => writeln!(f, "IRR:                   {irr:.2}%")?,
            None => writeln!(f, "IRR:                   n/a")?,
        }
        writeln!(f, "Total CAPEX:           {:.2} $M", self.total_capex_musd)?;
        writeln!(f, "Initial investment:    {:.0} $", self.initial_investment)?;
        write!(f, "Year-1 O&M:            {:.0} $", self.annual_opex_year1)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn params() -> CashflowParameters {
        CashflowParameters {
            project_life: 3,
            discount_rate: 0.1,
            inflation_rate: 0.0,
            escalation_rate: 0.0,
            solar_capex: 800.0,
            bess_capex: 200.0,
            itc_credit: 0.3,
            opex_fixed: 50.0,
            solar_degradation: 0.0,
            bess_degradation: 0.0,
            replacement_year: 0,
            replacement_cost_frac: 0.4,
        }
    }

    #[test]
    fn degradation_compounds() {
        let v = apply_degradation(100.0, 0.1, 3);
        assert_eq!(v.len(), 3);
        assert_relative_eq!(v[0], 100.0);
        assert_relative_eq!(v[1], 90.0);
        assert_relative_eq!(v[2], 81.0);
    }

    #[test]
    fn cashflows_start_with_itc_reduced_capex() {
        let flows = build_cashflows(300.0, 100.0, &params());
        assert_eq!(flows.len(), 4);
        assert_relative_eq!(flows[0], -700.0);
        assert_relative_eq!(flows[1], 350.0);
        assert_relative_eq!(flows[3], 350.0);
    }

    #[test]
    fn escalation_and_inflation_apply_from_year_two() {
        let p = CashflowParameters {
            escalation_rate: 0.1,
            inflation_rate: 0.2,
            ..params()
        };
        let flows = build_cashflows(100.0, 0.0, &p);
        assert_relative_eq!(flows[1], 100.0 - 50.0);
        assert_relative_eq!(flows[2], 110.0 - 60.0, epsilon = 1e-9);
    }

    #[test]
    fn replacement_year_is_deducted() {
        let p = CashflowParameters {
            replacement_year: 2,
            ..params()
        };
        let flows = build_cashflows(300.0, 100.0, &p);
        assert_relative_eq!(flows[1], 350.0);
        assert_relative_eq!(flows[2], 350.0 - 80.0);
    }

    #[test]
    fn npv_leaves_first_flow_undiscounted() {
        assert_relative_eq!(npv(0.1, &[100.0, 110.0, 121.0]), 300.0, epsilon = 1e-9);
        assert_relative_eq!(
            project_npv(0.1, &[-100.0, 110.0, 121.0]),
            120.0,
            epsilon = 1e-9
        );
        assert_eq!(project_npv(0.1, &[]), 0.0);
    }

    #[test]
    fn irr_of_known_flows() {
        // 60x + 60x^2 = 100 with x = 1 / (1 + r)
        let x = (-1.0 + (1.0_f64 + 4.0 * 100.0 / 60.0).sqrt()) / 2.0;
        let expected = 1.0 / x - 1.0;
        let r = irr(&[-100.0, 60.0, 60.0]).expect("sign change");
        assert_relative_eq!(r, expected, epsilon = 1e-6);
        assert_relative_eq!(npv(r, &[-100.0, 60.0, 60.0]), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn irr_can_be_negative() {
        let r = irr(&[-100.0, 50.0, 40.0]).expect("sign change");
        assert!(r < 0.0);
        assert_relative_eq!(npv(r, &[-100.0, 50.0, 40.0]), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn irr_without_sign_change_is_none() {
        assert_eq!(irr(&[100.0, 50.0, 40.0]), None);
        assert_eq!(irr(&[]), None);
    }

    #[test]
    fn summary_reports_millions_and_percent() {
        let p = params();
        let flows = build_cashflows(300.0, 100.0, &p);
        let s = FinancialSummary::new(&p, &flows);
        assert_relative_eq!(s.total_capex_musd, 0.001);
        assert_relative_eq!(s.initial_investment, 700.0);
        assert_relative_eq!(s.npv_musd, project_npv(0.1, &flows) / 1e6);
        assert!(s.irr_pct.is_some_and(|irr| irr > 0.0));
        assert_eq!(cashflow_table(&flows)[3].year, 3);
    }
}
