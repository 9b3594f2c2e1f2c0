//! Hourly CSV loading and cleaning for price and generation series.
//!
//! Raw market exports have duplicated rows, missing hours and mixed
//! timestamp formats. Loading reindexes them onto the local hourly grid of
//! one calendar year and fills gaps by linear interpolation in time.
//! Naive timestamps inside a spring-forward gap move to the first hour after
//! the gap.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::Path;

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Timelike};
use chrono_tz::Tz;
use tracing::{debug, warn};

use crate::config::{ConfigError, ProjectConfig};
use crate::error::{Error, Result};
use crate::series::{HourlySeries, hourly_grid};

/// Accepted naive timestamp layouts, tried in order after RFC 3339.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Column names and target grid for one CSV source.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    pub timestamp_column: String,
    pub value_column: String,
    /// Calendar year of the output grid.
    pub year: i32,
    /// Wall-clock timezone of the output grid.
    pub tz: Tz,
}

impl LoadOptions {
    /// Options for the configured price CSV.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the configured timezone is unknown.
    pub fn prices(cfg: &ProjectConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            timestamp_column: cfg.prices.timestamp_column.clone(),
            value_column: cfg.prices.value_column.clone(),
            year: cfg.project.year,
            tz: cfg.timezone()?,
        })
    }

    /// Options for the configured real-time price CSV.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the configured timezone is unknown.
    pub fn rtd_prices(cfg: &ProjectConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            timestamp_column: cfg.rtd_prices.timestamp_column.clone(),
            value_column: cfg.rtd_prices.value_column.clone(),
            year: cfg.project.year,
            tz: cfg.timezone()?,
        })
    }

    /// Options for the configured solar generation CSV.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the configured timezone is unknown.
    pub fn solar(cfg: &ProjectConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            timestamp_column: cfg.solar.timestamp_column.clone(),
            value_column: cfg.solar.value_column.clone(),
            year: cfg.project.year,
            tz: cfg.timezone()?,
        })
    }
}

/// Loads and cleans an hourly CSV file.
///
/// # Errors
///
/// Returns [`Error::Io`] if the file cannot be opened, otherwise see
/// [`read_hourly_csv`].
pub fn load_hourly_csv(path: &Path, opts: &LoadOptions) -> Result<HourlySeries> {
    debug!(path = %path.display(), column = %opts.value_column, "loading hourly CSV");
    let file = File::open(path)?;
    read_hourly_csv(BufReader::new(file), opts)
}

/// Reads and cleans hourly CSV data from any reader.
///
/// Duplicate timestamps are averaged, rows with an empty or non-numeric value
/// count as gaps, and samples outside the year's grid are dropped with a
/// warning.
///
/// # Errors
///
/// Returns [`Error::InvalidInput`] if a column is missing, a timestamp cannot
/// be parsed, or no usable value falls on the grid.
pub fn read_hourly_csv(reader: impl io::Read, opts: &LoadOptions) -> Result<HourlySeries> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = rdr.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| Error::InvalidInput(format!("missing column \"{name}\"")))
    };
    let ts_idx = column(&opts.timestamp_column)?;
    let value_idx = column(&opts.value_column)?;

    let mut samples: BTreeMap<NaiveDateTime, (f64, usize)> = BTreeMap::new();
    let mut rows = 0_usize;
    let mut gaps = 0_usize;
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        rows += 1;
        // Line 1 is the header.
        let line = i + 2;
        let raw_ts = record.get(ts_idx).unwrap_or_default();
        let ts = parse_timestamp(raw_ts, opts.tz).ok_or_else(|| {
            Error::InvalidInput(format!("row {line}: unparsable timestamp \"{raw_ts}\""))
        })?;

        match record
            .get(value_idx)
            .and_then(|v| v.parse::<f64>().ok())
            .filter(|v| v.is_finite())
        {
            Some(value) => {
                let entry = samples.entry(ts).or_insert((0.0, 0));
                entry.0 += value;
                entry.1 += 1;
            }
            None => gaps += 1,
        }
    }
    let duplicates = samples.values().filter(|(_, n)| *n > 1).count();
    debug!(rows, gaps, duplicates, "parsed CSV rows");

    let averaged: BTreeMap<NaiveDateTime, f64> = samples
        .into_iter()
        .map(|(ts, (sum, n))| (ts, sum / n as f64))
        .collect();

    reindex_and_fill(&averaged, &hourly_grid(opts.year, opts.tz))
}

/// Parses one timestamp into local wall-clock time in `tz`.
///
/// Offset-carrying RFC 3339 timestamps are converted; naive ones are taken
/// as already local, shifted forward when they fall in a DST gap.
pub fn parse_timestamp(raw: &str, tz: Tz) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&tz).naive_local());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|t| shift_forward(t, tz))
}

/// Moves a local time that does not exist in `tz` to the first whole hour
/// after the gap. Existing times are returned unchanged.
fn shift_forward(t: NaiveDateTime, tz: Tz) -> NaiveDateTime {
    if tz.from_local_datetime(&t).earliest().is_some() {
        return t;
    }
    let mut next = t.with_minute(0).and_then(|h| h.with_second(0)).unwrap_or(t);
    // Gaps are at most a few hours; give up after a day.
    for _ in 0..24 {
        next += Duration::hours(1);
        if tz.from_local_datetime(&next).earliest().is_some() {
            return next;
        }
    }
    t
}

/// Pairs each grid index with its sample and counts samples that miss the
/// grid (other years or off-hour timestamps).
fn place_on_grid(
    samples: &BTreeMap<NaiveDateTime, f64>,
    grid: &[NaiveDateTime],
) -> (Vec<(usize, f64)>, usize) {
    let known: Vec<(usize, f64)> = grid
        .iter()
        .enumerate()
        .filter_map(|(i, t)| samples.get(t).map(|v| (i, *v)))
        .collect();
    let dropped = samples.len() - known.len();
    (known, dropped)
}

/// Places samples on `grid` and fills the holes.
///
/// Interior gaps are interpolated linearly in elapsed time between the
/// neighbouring known samples; leading and trailing gaps take the nearest
/// known value.
fn reindex_and_fill(
    samples: &BTreeMap<NaiveDateTime, f64>,
    grid: &[NaiveDateTime],
) -> Result<HourlySeries> {
    let (known, dropped) = place_on_grid(samples, grid);
    if dropped > 0 {
        warn!(
            dropped,
            kept = known.len(),
            "dropped samples outside the hourly grid"
        );
    }

    let (Some(&(first_idx, first_val)), Some(&(last_idx, last_val))) =
        (known.first(), known.last())
    else {
        return Err(Error::InvalidInput(
            "no usable values on the hourly grid".to_string(),
        ));
    };

    let mut values = vec![0.0; grid.len()];
    values[..=first_idx].fill(first_val);
    values[last_idx..].fill(last_val);
    for pair in known.windows(2) {
        let (i0, v0) = pair[0];
        let (i1, v1) = pair[1];
        let span = (grid[i1] - grid[i0]).num_minutes() as f64;
        values[i0] = v0;
        for j in i0 + 1..i1 {
            let frac = (grid[j] - grid[i0]).num_minutes() as f64 / span;
            values[j] = v0 + (v1 - v0) * frac;
        }
    }

    let filled = grid.len() - known.len();
    if filled > 0 {
        warn!(
            filled,
            total = grid.len(),
            "filled missing hours by interpolation"
        );
    }

    HourlySeries::from_pairs(grid.iter().copied().zip(values))
}
