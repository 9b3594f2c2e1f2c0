//! Shared test fixtures for integration tests.

#![allow(dead_code)]

use std::path::PathBuf;

use chrono::{Duration, NaiveDate, NaiveDateTime};

use bess_sim::config::ProjectConfig;
use bess_sim::series::HourlySeries;
use bess_sim::sim::dispatch::DispatchParameters;
use bess_sim::sim::threshold::ThresholdMode;
use bess_sim::synthetic::synthetic_prices;

/// Midnight, June 1st 2024.
pub fn start() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 6, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .expect("valid timestamp")
}

/// Consecutive hourly prices starting at [`start`].
pub fn hourly_prices(prices: &[f64]) -> HourlySeries {
    HourlySeries::from_pairs(
        prices
            .iter()
            .enumerate()
            .map(|(i, &p)| (start() + Duration::hours(i as i64), p)),
    )
    .expect("valid series")
}

/// Battery with equal charge and discharge efficiency and 25/75 quantiles.
pub fn parameters(power_mw: f64, duration_hours: f64, efficiency: f64) -> DispatchParameters {
    DispatchParameters::new(
        power_mw,
        duration_hours,
        efficiency,
        efficiency,
        0.25,
        0.75,
        ThresholdMode::Global,
    )
    .expect("valid parameters")
}

/// Baseline configuration and its seeded synthetic price year.
pub fn synthetic_year() -> (ProjectConfig, HourlySeries) {
    let cfg = ProjectConfig::baseline();
    let tz = cfg.timezone().expect("baseline timezone");
    let prices = synthetic_prices(cfg.project.year, tz, &cfg.synthetic).expect("synthetic prices");
    (cfg, prices)
}

/// Fresh per-test scratch directory under the system temp dir.
pub fn scratch_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("bess-sim-{name}-{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    dir
}
