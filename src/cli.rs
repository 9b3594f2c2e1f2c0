//! Command-line arguments and their overrides on the project configuration.

use std::path::PathBuf;

use clap::Parser;

use crate::config::{ConfigError, ProjectConfig};
use crate::sim::threshold::ThresholdMode;

#[derive(Debug, Parser)]
#[command(name = "bess-sim", author, version)]
#[command(about = "Solar + battery storage dispatch and project economics simulator")]
#[command(
    long_about = "Runs a price-threshold battery dispatch over one year of hourly prices,\n\
    then values the co-located solar plant and projects the project cash flows.\n\
    \nWithout --prices or --solar a seeded synthetic year is used. With\n\
    --rtd-prices the real-time series is compared with the day-ahead one.\n\
    \nExamples:\n  \
    bess-sim\n  \
    bess-sim --preset two_hour --daily-thresholds\n  \
    bess-sim --config project.toml --prices lbmp.csv --output-dir ./results"
)]
pub struct Cli {
    /// TOML project configuration file
    #[arg(long, env = "BESS_SIM_CONFIG", conflicts_with = "preset")]
    pub config: Option<PathBuf>,

    /// Built-in preset (baseline, daily_thresholds, two_hour)
    #[arg(long, env = "BESS_SIM_PRESET")]
    pub preset: Option<String>,

    /// Hourly price CSV, overrides `prices.path`
    #[arg(long, env = "BESS_SIM_PRICES")]
    pub prices: Option<PathBuf>,

    /// Real-time price CSV compared with --prices, overrides `rtd_prices.path`
    #[arg(long, env = "BESS_SIM_RTD_PRICES")]
    pub rtd_prices: Option<PathBuf>,

    /// Hourly solar generation CSV, overrides `solar.path`
    #[arg(long, env = "BESS_SIM_SOLAR")]
    pub solar: Option<PathBuf>,

    /// Seed of the synthetic price and solar generators
    #[arg(long)]
    pub seed: Option<u64>,

    /// Compute price thresholds per calendar day
    #[arg(long)]
    pub daily_thresholds: bool,

    /// Charge threshold quantile
    #[arg(long)]
    pub low_quantile: Option<f64>,

    /// Discharge threshold quantile
    #[arg(long)]
    pub high_quantile: Option<f64>,

    /// Directory for CSV exports and figures
    #[arg(long, env = "BESS_SIM_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Skip SVG figure rendering
    #[arg(long)]
    pub no_charts: bool,

    /// Skip the sensitivity sweeps
    #[arg(long)]
    pub no_sensitivity: bool,

    /// Serve the finished run over HTTP
    #[cfg(feature = "api")]
    #[arg(long)]
    pub serve: bool,

    /// API server port
    #[cfg(feature = "api")]
    #[arg(long, env = "BESS_SIM_PORT", default_value_t = 3000)]
    pub port: u16,
}

impl Cli {
    /// Loads the configuration source named on the command line and applies
    /// every override. Falls back to the `baseline` preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or parsed, or the
    /// preset is unknown.
    pub fn project_config(&self) -> Result<ProjectConfig, ConfigError> {
        let mut cfg = match (&self.config, &self.preset) {
            (Some(path), _) => ProjectConfig::from_toml_file(path)?,
            (None, Some(name)) => ProjectConfig::from_preset(name)?,
            (None, None) => ProjectConfig::baseline(),
        };
        self.apply_overrides(&mut cfg);
        Ok(cfg)
    }

    /// Writes the command-line overrides into `cfg`.
    pub fn apply_overrides(&self, cfg: &mut ProjectConfig) {
        if let Some(path) = &self.prices {
            cfg.prices.path = Some(path.clone());
        }
        if let Some(path) = &self.rtd_prices {
            cfg.rtd_prices.path = Some(path.clone());
        }
        if let Some(path) = &self.solar {
            cfg.solar.path = Some(path.clone());
        }
        if let Some(seed) = self.seed {
            cfg.synthetic.seed = seed;
        }
        if self.daily_thresholds {
            cfg.dispatch.threshold_mode = ThresholdMode::Daily;
        }
        if let Some(q) = self.low_quantile {
            cfg.dispatch.low_quantile = q;
        }
        if let Some(q) = self.high_quantile {
            cfg.dispatch.high_quantile = q;
        }
        if let Some(dir) = &self.output_dir {
            cfg.output.dir = dir.clone();
        }
        if self.no_charts {
            cfg.output.charts = false;
        }
        if self.no_sensitivity {
            cfg.sensitivity.enabled = false;
        }
    }
}
