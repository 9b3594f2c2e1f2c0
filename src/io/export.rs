//! CSV export of dispatch results, price analysis, summaries, cash flows and
//! the sensitivity table.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::finance::{Cashflow, FinancialSummary};
use crate::market::{LbmpSummary, PriceComparisonHour};
use crate::sensitivity::SensitivityRow;
use crate::sim::summary::{DailyRevenue, SummaryReport};
use crate::sim::types::HourlyRecord;

pub const HOURLY_FILE: &str = "bess_hourly_results.csv";
pub const DAILY_FILE: &str = "bess_daily_revenue.csv";
pub const SUMMARY_FILE: &str = "bess_summary.csv";
pub const FINANCIAL_SUMMARY_FILE: &str = "financial_summary.csv";
pub const CASHFLOWS_FILE: &str = "cashflows.csv";
pub const LBMP_SUMMARY_FILE: &str = "lbmp_summary.csv";
pub const PRICE_COMPARISON_FILE: &str = "price_comparison.csv";
pub const SENSITIVITY_FILE: &str = "sensitivity.csv";

/// Column header of the hourly dispatch table.
const HOURLY_HEADER: &str = "timestamp,price,mode,soc_mwh,charge_mw,discharge_mw,\
                             charge_cost,discharge_revenue,net_revenue,\
                             charge_energy_mwh,discharge_energy_mwh,throughput_mwh";

/// Column header of the daily revenue table.
const DAILY_HEADER: &str = "date,net_revenue,cumulative_net_revenue";

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Writes the hourly dispatch table as CSV to any writer.
///
/// One header row followed by one row per record, in record order.
/// Output is deterministic for identical inputs.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_hourly_csv(records: &[HourlyRecord], writer: impl Write) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(HOURLY_HEADER.split(',').map(str::trim))?;

    for r in records {
        wtr.write_record(&[
            r.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            format!("{:.4}", r.price),
            r.mode.to_string(),
            format!("{:.6}", r.soc_mwh),
            format!("{:.6}", r.charge_mw),
            format!("{:.6}", r.discharge_mw),
            format!("{:.4}", r.charge_cost),
            format!("{:.4}", r.discharge_revenue),
            format!("{:.4}", r.net_revenue),
            format!("{:.6}", r.charge_energy_mwh),
            format!("{:.6}", r.discharge_energy_mwh),
            format!("{:.6}", r.throughput_mwh),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Writes daily net revenue and its running total.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_daily_csv(days: &[DailyRevenue], writer: impl Write) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(DAILY_HEADER.split(','))?;
    for d in days {
        wtr.write_record(&[
            d.date.format("%Y-%m-%d").to_string(),
            format!("{:.4}", d.net_revenue),
            format!("{:.4}", d.cumulative_net_revenue),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

/// Writes serializable rows; field names (or their renames) form the header.
///
/// # Errors
///
/// Returns an error if serialization or writing fails.
pub fn write_rows<T: Serialize>(rows: &[T], writer: impl Write) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    for row in rows {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Tables written by [`export_all`].
#[derive(Debug, Clone, Copy)]
pub struct ExportSet<'a> {
    pub records: &'a [HourlyRecord],
    pub daily: &'a [DailyRevenue],
    pub summary: &'a SummaryReport,
    pub financial: &'a FinancialSummary,
    pub cashflows: &'a [Cashflow],
    /// Written when at least one price series was summarized.
    pub lbmp: Option<&'a LbmpSummary>,
    /// Day-ahead vs real-time table; skipped when empty.
    pub comparison: &'a [PriceComparisonHour],
    /// Skipped when empty.
    pub sensitivity: &'a [SensitivityRow],
}

fn create(dir: &Path, name: &str) -> Result<(PathBuf, io::BufWriter<File>)> {
    let path = dir.join(name);
    let file = File::create(&path)?;
    Ok((path, io::BufWriter::new(file)))
}

/// Writes every CSV table into `dir`, creating it if needed.
///
/// Returns the written paths in a fixed order; optional tables that are
/// absent or empty are not written.
///
/// # Errors
///
/// Returns an error if the directory or any file cannot be written.
pub fn export_all(dir: &Path, set: &ExportSet<'_>) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::with_capacity(8);

    let (path, out) = create(dir, HOURLY_FILE)?;
    write_hourly_csv(set.records, out)?;
    written.push(path);

    let (path, out) = create(dir, DAILY_FILE)?;
    write_daily_csv(set.daily, out)?;
    written.push(path);

    let (path, out) = create(dir, SUMMARY_FILE)?;
    write_rows(std::slice::from_ref(set.summary), out)?;
    written.push(path);

    let (path, out) = create(dir, FINANCIAL_SUMMARY_FILE)?;
    write_rows(std::slice::from_ref(set.financial), out)?;
    written.push(path);

    let (path, out) = create(dir, CASHFLOWS_FILE)?;
    write_rows(set.cashflows, out)?;
    written.push(path);

    if let Some(lbmp) = set.lbmp {
        let (path, out) = create(dir, LBMP_SUMMARY_FILE)?;
        write_rows(std::slice::from_ref(lbmp), out)?;
        written.push(path);
    }

    if !set.comparison.is_empty() {
        let (path, out) = create(dir, PRICE_COMPARISON_FILE)?;
        write_rows(set.comparison, out)?;
        written.push(path);
    }

    if !set.sensitivity.is_empty() {
        let (path, out) = create(dir, SENSITIVITY_FILE)?;
        write_rows(set.sensitivity, out)?;
        written.push(path);
    }

    info!(dir = %dir.display(), files = written.len(), "CSV exports written");
    Ok(written)
}
