//! Core simulation types: per-hour dispatch records.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;

/// Battery operating mode chosen for one hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchMode {
    Charge,
    Discharge,
    Idle,
}

impl fmt::Display for DispatchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Charge => "charge",
            Self::Discharge => "discharge",
            Self::Idle => "idle",
        })
    }
}

/// Complete record of one dispatch hour.
///
/// Energies are per one-hour step, so MW and MWh coincide numerically.
/// "Grid" quantities are measured at the interconnection (after efficiency
/// losses); "internal" quantities are what enters or leaves the cells.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HourlyRecord {
    /// Local wall-clock timestamp.
    pub timestamp: NaiveDateTime,
    /// Price signal ($/MWh).
    pub price: f64,
    pub mode: DispatchMode,
    /// State of charge after this step (MWh).
    pub soc_mwh: f64,
    /// Energy drawn from the grid to charge (MWh).
    pub charge_mw: f64,
    /// Energy delivered to the grid while discharging (MWh).
    pub discharge_mw: f64,
    /// Cost of `charge_mw` at `price` ($).
    pub charge_cost: f64,
    /// Revenue of `discharge_mw` at `price` ($).
    pub discharge_revenue: f64,
    /// `discharge_revenue - charge_cost` ($).
    pub net_revenue: f64,
    /// Energy added to the cells (MWh).
    pub charge_energy_mwh: f64,
    /// Energy removed from the cells (MWh).
    pub discharge_energy_mwh: f64,
    /// `charge_energy_mwh + discharge_energy_mwh` (MWh).
    pub throughput_mwh: f64,
}

impl HourlyRecord {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

impl fmt::Display for HourlyRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | price={:>8.2} $/MWh | {:<9} | SoC={:>6.2} MWh | \
             in={:.3} out={:.3} MWh | net={:>9.2} $",
            self.timestamp.format("%Y-%m-%d %H:%M"),
            self.price,
            self.mode,
            self.soc_mwh,
            self.charge_mw,
            self.discharge_mw,
            self.net_revenue,
        )
    }
}
