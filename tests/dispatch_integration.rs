//! Integration tests for the dispatch run: worked scenarios and invariants.

mod common;

use approx::assert_relative_eq;

use bess_sim::runner::{DEFAULT_MIN_HOURS, run_bess};
use bess_sim::sim::threshold::{PriceBand, ThresholdMode, ThresholdSet, quantile_sorted};
use bess_sim::sim::types::DispatchMode;
use bess_sim::sim::{DispatchSummary, simulate};

#[test]
fn three_cheap_hours_then_one_expensive() {
    let prices = common::hourly_prices(&[10.0, 10.0, 10.0, 100.0]);
    let params = common::parameters(1.0, 4.0, 0.9);
    let run = run_bess(&prices, &params, 0).expect("run succeeds");

    let modes: Vec<DispatchMode> = run.records.iter().map(|r| r.mode).collect();
    assert_eq!(
        modes,
        vec![
            DispatchMode::Charge,
            DispatchMode::Charge,
            DispatchMode::Charge,
            DispatchMode::Discharge
        ]
    );
    for r in &run.records[..3] {
        assert_relative_eq!(r.charge_cost, 10.0 / 0.9, epsilon = 1e-9);
    }
    assert_relative_eq!(run.records[2].soc_mwh, 3.0, epsilon = 1e-9);

    let last = &run.records[3];
    assert_relative_eq!(last.discharge_energy_mwh, 1.0);
    assert_relative_eq!(last.discharge_mw, 0.9, epsilon = 1e-9);
    assert_relative_eq!(last.discharge_revenue, 90.0, epsilon = 1e-9);

    assert_relative_eq!(run.summary.total_net_revenue, 90.0 - 30.0 / 0.9, epsilon = 1e-9);
    assert_relative_eq!(run.summary.report().total_net_revenue, 56.67);
    assert_relative_eq!(run.final_soc_mwh, 2.0, epsilon = 1e-9);
    assert_eq!(run.summary.days_active, 1);
}

#[test]
fn prices_strictly_inside_the_band_leave_the_battery_idle() {
    let prices = common::hourly_prices(&[30.0, 40.0, 50.0, 60.0, 70.0]);
    let params = common::parameters(1.0, 4.0, 0.9);
    let band = ThresholdSet::Global(PriceBand {
        low: 20.0,
        high: 80.0,
    });
    let outcome = simulate(&prices, &params, &band).expect("simulate succeeds");

    assert!(outcome.records.iter().all(|r| r.mode == DispatchMode::Idle));
    assert_eq!(outcome.final_soc_mwh, 0.0);
    let summary = DispatchSummary::from_records(&outcome.records, params.capacity_mwh());
    assert_eq!(summary.total_net_revenue, 0.0);
    assert_eq!(summary.days_active, 0);
    assert_eq!(summary.average_daily_net_revenue, 0.0);
}

#[test]
fn one_hour_battery_completes_one_full_cycle() {
    let prices = common::hourly_prices(&[10.0, 100.0]);
    let params = common::parameters(2.0, 1.0, 1.0);
    let run = run_bess(&prices, &params, 0).expect("run succeeds");

    assert_relative_eq!(run.records[0].soc_mwh, 2.0);
    assert_relative_eq!(run.records[1].soc_mwh, 0.0);
    assert_relative_eq!(run.summary.full_cycles, 1.0);
}

#[test]
fn synthetic_year_respects_dispatch_invariants() {
    let (cfg, prices) = common::synthetic_year();
    let params = cfg.dispatch_parameters().expect("valid parameters");
    let run = run_bess(&prices, &params, DEFAULT_MIN_HOURS).expect("run succeeds");
    let capacity = params.capacity_mwh();

    assert_eq!(run.records.len(), prices.len());
    let mut charged = 0.0;
    let mut discharged = 0.0;
    for (r, p) in run.records.iter().zip(&prices) {
        assert_eq!(r.timestamp, p.timestamp);
        assert!(r.soc_mwh >= 0.0 && r.soc_mwh <= capacity + 1e-9);
        assert!(!(r.charge_mw > 0.0 && r.discharge_mw > 0.0));
        assert_relative_eq!(
            r.net_revenue,
            r.discharge_revenue - r.charge_cost,
            epsilon = 1e-9
        );
        charged += r.charge_energy_mwh;
        discharged += r.discharge_energy_mwh;
    }
    assert_relative_eq!(charged - discharged, run.final_soc_mwh, epsilon = 1e-6);
    assert!(run.summary.days_active > 0);
    assert!(run.summary.total_net_revenue > 0.0);
}

#[test]
fn daily_thresholds_use_each_days_own_prices() {
    let (mut cfg, prices) = common::synthetic_year();
    cfg.dispatch.threshold_mode = ThresholdMode::Daily;
    let params = cfg.dispatch_parameters().expect("valid parameters");
    let run = run_bess(&prices, &params, DEFAULT_MIN_HOURS).expect("run succeeds");

    let day = common::start().date();
    let mut day_prices: Vec<f64> = prices
        .iter()
        .filter(|p| p.date() == day)
        .map(|p| p.value)
        .collect();
    day_prices.sort_by(f64::total_cmp);
    let band = run.thresholds.band_for(day).expect("band for the day");
    assert_relative_eq!(band.low, quantile_sorted(&day_prices, 0.25));
    assert_relative_eq!(band.high, quantile_sorted(&day_prices, 0.75));
    assert!(run.inverted_bands.is_empty());
}

#[test]
fn identical_inputs_give_identical_tables() {
    let (cfg, prices) = common::synthetic_year();
    let params = cfg.dispatch_parameters().expect("valid parameters");
    let a = run_bess(&prices, &params, DEFAULT_MIN_HOURS).expect("run succeeds");
    let b = run_bess(&prices, &params, DEFAULT_MIN_HOURS).expect("run succeeds");
    assert_eq!(a.records, b.records);
    assert_eq!(a.summary, b.summary);
}
