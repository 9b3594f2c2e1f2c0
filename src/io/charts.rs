//! SVG figures of a dispatch run, the solar revenue and the project cash
//! flows.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use plotters::prelude::*;
use tracing::info;

use crate::error::{Error, Result};
use crate::finance::Cashflow;
use crate::market::{SolarRevenueHour, solar_daily_revenue, solar_monthly_revenue};
use crate::sim::summary::DailyRevenue;
use crate::sim::types::HourlyRecord;

pub const SOC_FILE: &str = "bess_soc.svg";
pub const DAILY_REVENUE_FILE: &str = "bess_daily_revenue.svg";
pub const CUMULATIVE_PROFIT_FILE: &str = "bess_cumulative_profit.svg";
pub const CASHFLOWS_FILE: &str = "cashflows.svg";
pub const SOLAR_DAILY_REVENUE_FILE: &str = "solar_daily_revenue.svg";
pub const SOLAR_MONTHLY_REVENUE_FILE: &str = "solar_monthly_revenue.svg";
pub const PRICE_VS_GENERATION_FILE: &str = "price_vs_generation.svg";

const WIDTH: u32 = 1200;
const HEIGHT: u32 = 500;

const BLUE_LINE: RGBColor = RGBColor(65, 105, 225);
const GREEN_LINE: RGBColor = RGBColor(46, 139, 87);
const ORANGE_LINE: RGBColor = RGBColor(255, 140, 0);
const SEA_GREEN: RGBColor = RGBColor(60, 179, 113);
const VIOLET: RGBColor = RGBColor(68, 1, 84);
const GRID: RGBColor = RGBColor(220, 220, 220);

fn chart_error(e: impl std::fmt::Display) -> Error {
    Error::Chart(e.to_string())
}

/// Value range covering `values` and zero, padded by 10%.
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (min, max) = values.fold((0.0_f64, 0.0_f64), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let pad = if max > min { (max - min) * 0.1 } else { 1.0 };
    (
        if min < 0.0 { min - pad } else { 0.0 },
        max + pad,
    )
}

/// Renders one line over labelled, equally spaced x positions.
///
/// Returns an empty string when there is nothing to plot.
pub fn line_chart_svg(
    title: &str,
    y_desc: &str,
    labels: &[String],
    values: &[f64],
    color: RGBColor,
) -> Result<String> {
    let mut svg = String::new();
    if values.is_empty() {
        return Ok(svg);
    }

    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let x_max = (values.len() - 1).max(1) as f64;
        let (y_min, y_max) = padded_range(values.iter().copied());

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 20))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(0.0..x_max, y_min..y_max)
            .map_err(chart_error)?;

        let label_at = |x: &f64| {
            labels
                .get(x.round().max(0.0) as usize)
                .cloned()
                .unwrap_or_default()
        };
        chart
            .configure_mesh()
            .y_desc(y_desc)
            .x_labels(12)
            .y_labels(10)
            .x_label_formatter(&label_at)
            .light_line_style(GRID)
            .draw()
            .map_err(chart_error)?;

        chart
            .draw_series(LineSeries::new(
                values.iter().enumerate().map(|(i, v)| (i as f64, *v)),
                &color,
            ))
            .map_err(chart_error)?;

        root.present().map_err(chart_error)?;
    }

    Ok(svg)
}

/// State of charge over the run.
pub fn soc_chart_svg(records: &[HourlyRecord]) -> Result<String> {
    let labels: Vec<String> = records
        .iter()
        .map(|r| r.timestamp.format("%b %d").to_string())
        .collect();
    let soc: Vec<f64> = records.iter().map(|r| r.soc_mwh).collect();
    line_chart_svg(
        "BESS State of Charge",
        "State of Charge [MWh]",
        &labels,
        &soc,
        BLUE_LINE,
    )
}

/// Daily net arbitrage revenue.
pub fn daily_revenue_chart_svg(days: &[DailyRevenue]) -> Result<String> {
    let labels: Vec<String> = days.iter().map(|d| d.date.format("%b %d").to_string()).collect();
    let net: Vec<f64> = days.iter().map(|d| d.net_revenue).collect();
    line_chart_svg(
        "Daily BESS Arbitrage Revenue",
        "Revenue ($)",
        &labels,
        &net,
        GREEN_LINE,
    )
}

/// Running total of daily net revenue.
pub fn cumulative_profit_chart_svg(days: &[DailyRevenue]) -> Result<String> {
    let labels: Vec<String> = days.iter().map(|d| d.date.format("%b %d").to_string()).collect();
    let cumulative: Vec<f64> = days.iter().map(|d| d.cumulative_net_revenue).collect();
    line_chart_svg(
        "Cumulative Net Profit (BESS Arbitrage)",
        "Cumulative Profit ($)",
        &labels,
        &cumulative,
        ORANGE_LINE,
    )
}

/// Annual project cash flows as bars, in millions of dollars.
pub fn cashflow_chart_svg(rows: &[Cashflow]) -> Result<String> {
    let mut svg = String::new();
    let Some(last) = rows.last() else {
        return Ok(svg);
    };

    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let millions = |cf: &Cashflow| cf.cashflow / 1_000_000.0;
        let (y_min, y_max) = padded_range(rows.iter().map(millions));
        let x_max = f64::from(last.year) + 0.5;

        let mut chart = ChartBuilder::on(&root)
            .caption("Annual Project Cashflows", ("sans-serif", 20))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5..x_max, y_min..y_max)
            .map_err(chart_error)?;

        chart
            .configure_mesh()
            .x_desc("Year")
            .y_desc("Cashflow ($M)")
            .x_label_formatter(&|x| format!("{:.0}", x))
            .light_line_style(GRID)
            .draw()
            .map_err(chart_error)?;

        chart
            .draw_series(rows.iter().map(|cf| {
                let x = f64::from(cf.year);
                let value = millions(cf);
                let color = if value < 0.0 { RED } else { GREEN_LINE };
                Rectangle::new([(x - 0.4, 0.0), (x + 0.4, value)], color.filled())
            }))
            .map_err(chart_error)?;

        root.present().map_err(chart_error)?;
    }

    Ok(svg)
}

/// Daily solar revenue.
pub fn solar_daily_revenue_chart_svg(days: &[(NaiveDate, f64)]) -> Result<String> {
    let labels: Vec<String> = days.iter().map(|(d, _)| d.format("%b %d").to_string()).collect();
    let revenue: Vec<f64> = days.iter().map(|(_, v)| *v).collect();
    line_chart_svg("Daily Solar Revenue", "Revenue ($)", &labels, &revenue, GREEN_LINE)
}

/// Monthly solar revenue as bars labelled by month name.
pub fn solar_monthly_revenue_chart_svg(months: &[(NaiveDate, f64)]) -> Result<String> {
    let mut svg = String::new();
    if months.is_empty() {
        return Ok(svg);
    }
    let labels: Vec<String> = months.iter().map(|(d, _)| d.format("%b").to_string()).collect();

    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let (y_min, y_max) = padded_range(months.iter().map(|(_, v)| *v));
        let x_max = months.len() as f64 - 0.5;

        let mut chart = ChartBuilder::on(&root)
            .caption("Monthly Solar Revenue", ("sans-serif", 20))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(-0.5..x_max, y_min..y_max)
            .map_err(chart_error)?;

        let label_at = |x: &f64| {
            let i = x.round();
            if (x - i).abs() > 1e-6 || i < 0.0 {
                return String::new();
            }
            labels.get(i as usize).cloned().unwrap_or_default()
        };
        chart
            .configure_mesh()
            .y_desc("Revenue ($)")
            .x_labels(months.len())
            .x_label_formatter(&label_at)
            .light_line_style(GRID)
            .draw()
            .map_err(chart_error)?;

        chart
            .draw_series(months.iter().enumerate().map(|(i, (_, v))| {
                let x = i as f64;
                Rectangle::new([(x - 0.4, 0.0), (x + 0.4, *v)], SEA_GREEN.filled())
            }))
            .map_err(chart_error)?;

        root.present().map_err(chart_error)?;
    }

    Ok(svg)
}

/// Hourly price against solar output, one point per hour.
pub fn price_vs_generation_chart_svg(hours: &[SolarRevenueHour]) -> Result<String> {
    let mut svg = String::new();
    if hours.is_empty() {
        return Ok(svg);
    }

    {
        let root = SVGBackend::with_string(&mut svg, (WIDTH, HEIGHT)).into_drawing_area();
        root.fill(&WHITE).map_err(chart_error)?;

        let (_, x_max) = padded_range(hours.iter().map(|h| h.generation_mwh));
        let (y_min, y_max) = padded_range(hours.iter().map(|h| h.price));

        let mut chart = ChartBuilder::on(&root)
            .caption("Price vs. Solar Generation (Hourly)", ("sans-serif", 20))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(70)
            .build_cartesian_2d(0.0..x_max, y_min..y_max)
            .map_err(chart_error)?;

        chart
            .configure_mesh()
            .x_desc("Solar Generation (MWh)")
            .y_desc("Price ($/MWh)")
            .light_line_style(GRID)
            .draw()
            .map_err(chart_error)?;

        chart
            .draw_series(hours.iter().map(|h| {
                Circle::new((h.generation_mwh, h.price), 2, VIOLET.mix(0.6).filled())
            }))
            .map_err(chart_error)?;

        root.present().map_err(chart_error)?;
    }

    Ok(svg)
}

/// Tables rendered by [`write_charts`].
#[derive(Debug, Clone, Copy)]
pub struct ChartSet<'a> {
    pub records: &'a [HourlyRecord],
    pub daily: &'a [DailyRevenue],
    pub cashflows: &'a [Cashflow],
    pub solar: &'a [SolarRevenueHour],
}

/// Renders every figure into `dir`, creating it if needed.
///
/// Empty figures are skipped. Returns the written paths.
///
/// # Errors
///
/// Returns an error if rendering or writing fails.
pub fn write_charts(dir: &Path, set: &ChartSet<'_>) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let figures = [
        (SOC_FILE, soc_chart_svg(set.records)?),
        (DAILY_REVENUE_FILE, daily_revenue_chart_svg(set.daily)?),
        (CUMULATIVE_PROFIT_FILE, cumulative_profit_chart_svg(set.daily)?),
        (CASHFLOWS_FILE, cashflow_chart_svg(set.cashflows)?),
        (
            SOLAR_DAILY_REVENUE_FILE,
            solar_daily_revenue_chart_svg(&solar_daily_revenue(set.solar))?,
        ),
        (
            SOLAR_MONTHLY_REVENUE_FILE,
            solar_monthly_revenue_chart_svg(&solar_monthly_revenue(set.solar))?,
        ),
        (PRICE_VS_GENERATION_FILE, price_vs_generation_chart_svg(set.solar)?),
    ];

    let mut written = Vec::with_capacity(figures.len());
    for (name, svg) in figures {
        if svg.is_empty() {
            continue;
        }
        let path = dir.join(name);
        fs::write(&path, svg)?;
        written.push(path);
    }
    info!(dir = %dir.display(), files = written.len(), "charts written");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn days() -> Vec<DailyRevenue> {
        (1..=5)
            .map(|d| DailyRevenue {
                date: NaiveDate::from_ymd_opt(2024, 8, d).expect("valid date"),
                net_revenue: f64::from(d) * 10.0 - 25.0,
                cumulative_net_revenue: f64::from(d) * 5.0,
            })
            .collect()
    }

    #[test]
    fn padded_range_includes_zero() {
        let (lo, hi) = padded_range([5.0, 10.0].into_iter());
        assert_eq!(lo, 0.0);
        assert!(hi > 10.0);

        let (lo, hi) = padded_range([-4.0, 6.0].into_iter());
        assert!(lo < -4.0);
        assert!(hi > 6.0);

        let (lo, hi) = padded_range(std::iter::empty());
        assert!(lo < hi);
    }

    #[test]
    fn line_chart_renders_svg() {
        let svg = daily_revenue_chart_svg(&days()).expect("renders");
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains("Daily BESS Arbitrage Revenue"));
    }

    #[test]
    fn empty_input_renders_nothing() {
        assert!(soc_chart_svg(&[]).expect("renders").is_empty());
        assert!(cashflow_chart_svg(&[]).expect("renders").is_empty());
    }

    #[test]
    fn cashflow_chart_has_one_bar_per_year() {
        let rows: Vec<Cashflow> = [-5_000_000.0, 1_000_000.0, 1_200_000.0]
            .iter()
            .enumerate()
            .map(|(year, &cashflow)| Cashflow {
                year: year as u32,
                cashflow,
            })
            .collect();
        let svg = cashflow_chart_svg(&rows).expect("renders");
        assert!(svg.matches("<rect").count() >= rows.len());
    }

    fn solar_hours() -> Vec<SolarRevenueHour> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 31)
            .and_then(|d| d.and_hms_opt(12, 0, 0))
            .expect("valid timestamp");
        (0..48)
            .map(|h| {
                let generation_mwh = f64::from(h % 7);
                let price = 20.0 + f64::from(h);
                SolarRevenueHour {
                    timestamp: start + chrono::Duration::hours(i64::from(h)),
                    generation_mwh,
                    price,
                    revenue: generation_mwh * price,
                }
            })
            .collect()
    }

    #[test]
    fn solar_daily_revenue_chart_renders() {
        let days = solar_daily_revenue(&solar_hours());
        assert_eq!(days.len(), 3);
        let svg = solar_daily_revenue_chart_svg(&days).expect("renders");
        assert!(svg.contains("Daily Solar Revenue"));
    }

    #[test]
    fn monthly_revenue_chart_labels_months() {
        let months = solar_monthly_revenue(&solar_hours());
        assert_eq!(months.len(), 2);
        let svg = solar_monthly_revenue_chart_svg(&months).expect("renders");
        assert!(svg.contains("Jan"));
        assert!(svg.contains("Feb"));
        assert!(svg.matches("<rect").count() >= months.len());
    }

    #[test]
    fn scatter_draws_a_point_per_hour() {
        let hours = solar_hours();
        let svg = price_vs_generation_chart_svg(&hours).expect("renders");
        assert_eq!(svg.matches("<circle").count(), hours.len());
        assert!(price_vs_generation_chart_svg(&[]).expect("renders").is_empty());
    }
}
