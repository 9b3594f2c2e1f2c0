//! Post-hoc dispatch metrics computed from the hourly table.

use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

use super::types::HourlyRecord;

/// Aggregate performance and revenue metrics of one dispatch run.
///
/// Values are kept at full precision; [`DispatchSummary::report`] derives the
/// rounded view used for printing and export.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchSummary {
    /// Sum of hourly net revenue ($).
    pub total_net_revenue: f64,
    /// Sum of internal charge and discharge energy (MWh).
    pub total_throughput_mwh: f64,
    /// Throughput divided by twice the capacity.
    pub full_cycles: f64,
    /// Mean post-step state of charge (MWh).
    pub average_soc_mwh: f64,
    /// Calendar days with any energy delivered to the grid.
    pub days_active: usize,
    /// Net revenue per active day ($/day), 0 without active days.
    pub average_daily_net_revenue: f64,
}

impl DispatchSummary {
    /// Computes all metrics from the complete hourly table.
    ///
    /// # Arguments
    ///
    /// * `records` - Hourly dispatch records, in time order
    /// * `capacity_mwh` - Battery capacity for the cycle count
    pub fn from_records(records: &[HourlyRecord], capacity_mwh: f64) -> Self {
        let mut total_net_revenue = 0.0;
        let mut total_throughput_mwh = 0.0;
        let mut soc_sum = 0.0;
        let mut active: BTreeSet<NaiveDate> = BTreeSet::new();

        for r in records {
            total_net_revenue += r.net_revenue;
            total_throughput_mwh += r.throughput_mwh;
            soc_sum += r.soc_mwh;
            if r.discharge_mw > 0.0 {
                active.insert(r.date());
            }
        }

        let full_cycles = if capacity_mwh > 0.0 {
            total_throughput_mwh / (2.0 * capacity_mwh)
        } else {
            0.0
        };
        let average_soc_mwh = if records.is_empty() {
            0.0
        } else {
            soc_sum / records.len() as f64
        };
        let days_active = active.len();
        let average_daily_net_revenue = if days_active > 0 {
            total_net_revenue / days_active as f64
        } else {
            0.0
        };

        Self {
            total_net_revenue,
            total_throughput_mwh,
            full_cycles,
            average_soc_mwh,
            days_active,
            average_daily_net_revenue,
        }
    }

    /// Rounded reporting view.
    pub fn report(&self) -> SummaryReport {
        SummaryReport {
            total_net_revenue: round_to(self.total_net_revenue, 2),
            full_cycles: round_to(self.full_cycles, 2),
            average_soc_mwh: round_to(self.average_soc_mwh, 2),
            days_active: round_to(self.days_active as f64, 1),
            average_daily_net_revenue: round_to(self.average_daily_net_revenue, 2),
        }
    }
}

/// Labelled, rounded summary as printed, exported and served.
///
/// Serialized field names are the human-readable report labels, so a CSV
/// header or JSON object carries them directly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SummaryReport {
    #[serde(rename = "Total Net Revenue ($)")]
    pub total_net_revenue: f64,
    #[serde(rename = "Estimated Full Cycles")]
    pub full_cycles: f64,
    #[serde(rename = "Average SOC (MWh)")]
    pub average_soc_mwh: f64,
    #[serde(rename = "Days Active")]
    pub days_active: f64,
    #[serde(rename = "Avg Daily Net Revenue ($/day)")]
    pub average_daily_net_revenue: f64,
}

impl SummaryReport {
    /// `(label, value)` pairs in report order.
    pub fn entries(&self) -> [(&'static str, f64); 5] {
        [
            ("Total Net Revenue ($)", self.total_net_revenue),
            ("Estimated Full Cycles", self.full_cycles),
            ("Average SOC (MWh)", self.average_soc_mwh),
            ("Days Active", self.days_active),
            ("Avg Daily Net Revenue ($/day)", self.average_daily_net_revenue),
        ]
    }
}

impl fmt::Display for SummaryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- BESS Summary ---")?;
        let entries = self.entries();
        let last = entries.len() - 1;
        for (i, (label, value)) in entries.iter().enumerate() {
            write!(f, "{label:<31} {value:.2}")?;
            if i < last {
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for DispatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.report().fmt(f)
    }
}

/// Net revenue aggregated over one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyRevenue {
    pub date: NaiveDate,
    pub net_revenue: f64,
    /// Running total up to and including `date`.
    pub cumulative_net_revenue: f64,
}

/// Groups hourly net revenue by calendar day, keeping input order.
pub fn daily_revenue(records: &[HourlyRecord]) -> Vec<DailyRevenue> {
    let mut days: Vec<DailyRevenue> = Vec::new();
    let mut cumulative = 0.0;
    for r in records {
        cumulative += r.net_revenue;
        match days.last_mut() {
            Some(last) if last.date == r.date() => {
                last.net_revenue += r.net_revenue;
                last.cumulative_net_revenue = cumulative;
            }
            _ => days.push(DailyRevenue {
                date: r.date(),
                net_revenue: r.net_revenue,
                cumulative_net_revenue: cumulative,
            }),
        }
    }
    days
}

/// Rounds half away from zero to `decimals` places.
pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10_f64.powi(decimals);
    (value * scale).round() / scale
}
