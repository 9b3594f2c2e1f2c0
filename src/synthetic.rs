//! Seeded synthetic price and solar years for offline runs.
//!
//! Both generators walk the local hourly grid of a calendar year and are
//! deterministic for a given seed.

use std::f64::consts::PI;

use chrono::{Datelike, NaiveDateTime, Timelike};
use chrono_tz::Tz;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::config::SyntheticSection;
use crate::error::Result;
use crate::series::{HourlySeries, hourly_grid};

/// Seed offset for the solar RNG so cloud cover is uncorrelated with price noise.
const SOLAR_SEED_OFFSET: u64 = 7;

/// Cloudiness factor bounds (heavy overcast to cloud-edge enhancement).
const CLOUD_MIN: f64 = 0.1;
const CLOUD_MAX: f64 = 1.1;

/// Zero-mean Gaussian sample via the Box-Muller transform.
pub fn gaussian_noise(rng: &mut StdRng, std_dev: f64) -> f64 {
    if std_dev <= 0.0 {
        return 0.0;
    }

    let u1: f64 = rng.random::<f64>().clamp(1e-12, 1.0);
    let u2: f64 = rng.random::<f64>();
    let z0 = (-2.0 * u1.ln()).sqrt() * (2.0 * PI * u2).cos();
    z0 * std_dev
}

fn day_of_year(t: &NaiveDateTime) -> f64 {
    f64::from(t.ordinal0())
}

/// Unit-height bump centred on `center` hours.
fn bump(hour: f64, center: f64, width: f64) -> f64 {
    (-((hour - center) / width).powi(2) / 2.0).exp()
}

/// Deterministic part of the price: seasonal level plus a morning and an
/// evening peak, with a shallow overnight trough.
fn price_shape(t: &NaiveDateTime, cfg: &SyntheticSection) -> f64 {
    // Peak around late July.
    let season = (2.0 * PI * (day_of_year(t) - 200.0) / 365.0).cos();
    let level = cfg.mean_price * (1.0 + cfg.seasonal_amplitude * season);

    let hour = f64::from(t.hour());
    let diurnal = 0.6 * bump(hour, 8.0, 2.0) + bump(hour, 18.0, 2.5) - 0.35;
    level + cfg.diurnal_amplitude * diurnal
}

/// Generates an hourly price year ($/MWh).
///
/// # Errors
///
/// Only fails if the grid is malformed, which cannot happen for a valid year.
pub fn synthetic_prices(year: i32, tz: Tz, cfg: &SyntheticSection) -> Result<HourlySeries> {
    let mut rng = StdRng::seed_from_u64(cfg.seed);
    let points = hourly_grid(year, tz).into_iter().map(|t| {
        let mut price = price_shape(&t, cfg) + gaussian_noise(&mut rng, cfg.noise_std);
        if rng.random::<f64>() < cfg.spike_probability {
            price += rng.random::<f64>() * cfg.spike_magnitude;
        }
        (t, price)
    });
    HourlySeries::from_pairs(points)
}

/// Clear-sky fraction of peak output for the hour starting at `t`.
///
/// Day length swings between 9 and 15 hours over the year, centred on
/// solar noon at 12:30 local time.
pub fn daylight_frac(t: &NaiveDateTime) -> f64 {
    let season = (2.0 * PI * (day_of_year(t) - 80.0) / 365.0).sin();
    let day_length = 12.0 + 3.0 * season;
    let sunrise = 12.5 - day_length / 2.0;

    let mid_hour = f64::from(t.hour()) + 0.5;
    let x = (mid_hour - sunrise) / day_length;
    if (0.0..=1.0).contains(&x) {
        // Lower sun in winter.
        (PI * x).sin() * (0.85 + 0.15 * season)
    } else {
        0.0
    }
}

/// Generates an hourly solar generation year (MWh) for a plant of
/// `capacity_mw` nameplate.
///
/// A half-sine daylight profile is scaled by an AR(1) cloudiness factor that
/// reverts to 1.0 and evolves every hour, so cloudy spells persist.
///
/// # Errors
///
/// Only fails if the grid is malformed, which cannot happen for a valid year.
pub fn synthetic_solar(
    year: i32,
    tz: Tz,
    capacity_mw: f64,
    cfg: &SyntheticSection,
) -> Result<HourlySeries> {
    let mut rng = StdRng::seed_from_u64(cfg.seed.wrapping_add(SOLAR_SEED_OFFSET));
    let alpha = cfg.cloud_alpha.clamp(0.0, 1.0);
    let mut cloud = 1.0;

    let points = hourly_grid(year, tz).into_iter().map(|t| {
        let innovation = gaussian_noise(&mut rng, cfg.cloud_noise_std);
        cloud = (alpha * cloud + (1.0 - alpha) + innovation).clamp(CLOUD_MIN, CLOUD_MAX);
        let mwh = capacity_mw * cfg.solar_peak_factor * daylight_frac(&t) * cloud;
        (t, mwh.max(0.0))
    });
    HourlySeries::from_pairs(points)
}
