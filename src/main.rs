//! bess-sim entry point: CLI wiring, data sourcing and the end-to-end run.

use std::process;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bess_sim::cli::Cli;
use bess_sim::config::ProjectConfig;
use bess_sim::finance::{FinancialSummary, build_cashflows, cashflow_table};
use bess_sim::io::charts::{ChartSet, write_charts};
use bess_sim::io::export::{ExportSet, export_all};
use bess_sim::io::prices::{LoadOptions, load_hourly_csv};
use bess_sim::market::{
    LbmpSummary, MarketSummary, PriceStats, annual_revenue, compare_prices,
    day_ahead_real_time_correlation, solar_revenue,
};
use bess_sim::runner::run_bess;
use bess_sim::sensitivity::{Baseline, sensitivity, year_one_revenue};
use bess_sim::series::HourlySeries;
use bess_sim::synthetic::{synthetic_prices, synthetic_solar};

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bess_sim=info"));
    tracing_subscriber::fmt().with_env_filter(filter).compact().init();
}

/// Loads the price CSV named in the config, or generates a synthetic year.
fn price_series(cfg: &ProjectConfig) -> anyhow::Result<HourlySeries> {
    match &cfg.prices.path {
        Some(path) => load_hourly_csv(path, &LoadOptions::prices(cfg)?)
            .with_context(|| format!("failed to load prices from {}", path.display())),
        None => {
            info!(seed = cfg.synthetic.seed, "no price CSV given, using synthetic prices");
            Ok(synthetic_prices(cfg.project.year, cfg.timezone()?, &cfg.synthetic)?)
        }
    }
}

/// Loads the real-time price CSV when one is configured.
fn rtd_series(cfg: &ProjectConfig) -> anyhow::Result<Option<HourlySeries>> {
    let Some(path) = &cfg.rtd_prices.path else {
        return Ok(None);
    };
    let series = load_hourly_csv(path, &LoadOptions::rtd_prices(cfg)?)
        .with_context(|| format!("failed to load real-time prices from {}", path.display()))?;
    Ok(Some(series))
}

/// Loads the generation CSV named in the config, or generates a synthetic profile.
fn solar_series(cfg: &ProjectConfig) -> anyhow::Result<HourlySeries> {
    match &cfg.solar.path {
        Some(path) => load_hourly_csv(path, &LoadOptions::solar(cfg)?)
            .with_context(|| format!("failed to load solar generation from {}", path.display())),
        None => Ok(synthetic_solar(
            cfg.project.year,
            cfg.timezone()?,
            cfg.project.capacity_mw,
            &cfg.synthetic,
        )?),
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let cfg = cli.project_config()?;
    let errors = cfg.validate();
    if !errors.is_empty() {
        for e in &errors {
            eprintln!("{e}");
        }
        process::exit(1);
    }
    info!(project = %cfg.project.name, year = cfg.project.year, "starting run");

    let prices = price_series(&cfg)?;
    let dam_stats = PriceStats::from_series(&prices);
    if let Some(stats) = &dam_stats {
        println!("Prices: {stats}");
    }
    let rtd = rtd_series(&cfg)?;
    let rtd_stats = rtd.as_ref().and_then(PriceStats::from_series);
    if let Some(stats) = &rtd_stats {
        println!("Real-time prices: {stats}");
    }
    let comparison = rtd
        .as_ref()
        .map(|rtd| compare_prices(&prices, rtd))
        .unwrap_or_default();
    let correlation = day_ahead_real_time_correlation(&comparison);
    let all_stats: Vec<&PriceStats> = dam_stats.iter().chain(&rtd_stats).collect();
    let lbmp = LbmpSummary::new(&all_stats, correlation);
    if let Some(lbmp) = &lbmp {
        println!("\n{lbmp}");
    }

    let params = cfg.dispatch_parameters()?;
    let run = run_bess(&prices, &params, cfg.dispatch.min_hours)?;
    println!("\n{}", run.summary.report());

    let solar = solar_series(&cfg)?;
    let solar_hours = solar_revenue(&prices, &solar);
    let market = MarketSummary::from_hours(&solar_hours, cfg.project.capacity_mw);
    println!("\n{market}");

    let annual = annual_revenue(&solar_hours, &run.records);
    for year in &annual {
        println!(
            "{}: solar {:.2} $, BESS {:.2} $, total {:.2} $",
            year.year, year.solar_revenue, year.bess_revenue, year.total_revenue
        );
    }

    let (base_solar, base_bess) = year_one_revenue(&annual);
    let cashflow_params = cfg.cashflow_parameters();
    let flows = build_cashflows(base_solar, base_bess, &cashflow_params);
    let financial = FinancialSummary::new(&cashflow_params, &flows);
    println!("\n{financial}");

    let sensitivity_rows = if cfg.sensitivity.enabled {
        let baseline = Baseline {
            config: &cfg,
            prices: &prices,
            solar_hours: &solar_hours,
            solar_revenue: base_solar,
            bess_revenue: base_bess,
        };
        sensitivity(&baseline, &cfg.sensitivity.sweeps).context("sensitivity sweep failed")?
    } else {
        Vec::new()
    };
    if !sensitivity_rows.is_empty() {
        println!("\n--- Sensitivity ---");
        for row in &sensitivity_rows {
            println!("{row}");
        }
    }

    let daily = run.daily_revenue();
    let cashflows = cashflow_table(&flows);
    let summary = run.summary.report();
    let written = export_all(
        &cfg.output.dir,
        &ExportSet {
            records: &run.records,
            daily: &daily,
            summary: &summary,
            financial: &financial,
            cashflows: &cashflows,
            lbmp: lbmp.as_ref(),
            comparison: &comparison,
            sensitivity: &sensitivity_rows,
        },
    )
    .with_context(|| format!("failed to export to {}", cfg.output.dir.display()))?;
    for path in &written {
        eprintln!("Wrote {}", path.display());
    }

    if cfg.output.charts {
        let charts = ChartSet {
            records: &run.records,
            daily: &daily,
            cashflows: &cashflows,
            solar: &solar_hours,
        };
        let figures =
            write_charts(&cfg.output.dir, &charts).context("failed to render charts")?;
        for path in &figures {
            eprintln!("Wrote {}", path.display());
        }
    }

    #[cfg(feature = "api")]
    if cli.serve {
        use std::net::SocketAddr;
        use std::sync::Arc;

        let state = Arc::new(bess_sim::api::AppState::from(run));
        let addr = SocketAddr::from(([0, 0, 0, 0], cli.port));
        let rt = tokio::runtime::Runtime::new().context("failed to create tokio runtime")?;
        rt.block_on(bess_sim::api::serve(state, addr))
            .with_context(|| format!("API server on {addr} failed"))?;
    }

    Ok(())
}
