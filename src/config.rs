//! TOML-based project configuration and preset definitions.

use std::fs;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::Deserialize;
use thiserror::Error;

use crate::finance::CashflowParameters;
use crate::sensitivity::{SensitivityParameter, Sweep};
use crate::sim::dispatch::DispatchParameters;
use crate::sim::threshold::ThresholdMode;

/// Top-level project configuration parsed from TOML.
///
/// Every section has defaults matching the baseline project. Load from TOML
/// with [`ProjectConfig::from_toml_file`] or start from
/// [`ProjectConfig::baseline`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectConfig {
    /// Plant size, life and location.
    pub project: ProjectSection,
    /// Battery duration, efficiencies and lifetime costs.
    pub bess: BessSection,
    /// Threshold policy.
    pub dispatch: DispatchSection,
    /// Price CSV source (day-ahead market).
    pub prices: PricesSection,
    /// Optional real-time price CSV compared against the day-ahead series.
    pub rtd_prices: PricesSection,
    /// Solar generation CSV source and degradation.
    pub solar: SolarSection,
    /// Capital cost assumptions.
    pub capex: CapexSection,
    /// Discounting, escalation and incentives.
    pub financials: FinancialsSection,
    /// Generator settings used when no CSV is supplied.
    pub synthetic: SyntheticSection,
    /// Output directory and figure switch.
    pub output: OutputSection,
    /// One-at-a-time parameter sweeps over the project economics.
    pub sensitivity: SensitivitySection,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProjectSection {
    pub name: String,
    /// Solar nameplate and battery power rating (MW).
    pub capacity_mw: f64,
    /// Years of operation after the construction year.
    pub project_life: u32,
    /// Calendar year of the hourly price grid.
    pub year: i32,
    /// IANA timezone of the market's wall clock.
    pub timezone: String,
}

impl Default for ProjectSection {
    fn default() -> Self {
        Self {
            name: "Solar + 4h BESS".to_string(),
            capacity_mw: 5.0,
            project_life: 25,
            year: 2024,
            timezone: "America/New_York".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BessSection {
    /// Hours at rated power from empty to full.
    pub duration_hours: f64,
    pub charge_efficiency: f64,
    pub discharge_efficiency: f64,
    /// Annual revenue degradation (fraction).
    pub degradation: f64,
    /// Project year (1-based) of the cell replacement, 0 for none.
    pub replacement_year: u32,
    /// Replacement cost as a fraction of initial storage capex.
    pub replacement_cost_frac: f64,
}

impl Default for BessSection {
    fn default() -> Self {
        Self {
            duration_hours: 4.0,
            charge_efficiency: 0.95,
            discharge_efficiency: 0.95,
            degradation: 0.02,
            replacement_year: 12,
            replacement_cost_frac: 0.4,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DispatchSection {
    pub low_quantile: f64,
    pub high_quantile: f64,
    pub threshold_mode: ThresholdMode,
    /// Minimum number of hourly prices accepted as a full year.
    pub min_hours: usize,
}

impl Default for DispatchSection {
    fn default() -> Self {
        Self {
            low_quantile: 0.25,
            high_quantile: 0.75,
            threshold_mode: ThresholdMode::Global,
            min_hours: 8000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PricesSection {
    /// Hourly price CSV; synthetic prices are generated when unset.
    pub path: Option<PathBuf>,
    pub timestamp_column: String,
    pub value_column: String,
}

impl Default for PricesSection {
    fn default() -> Self {
        Self {
            path: None,
            timestamp_column: "Time Stamp".to_string(),
            value_column: "LBMP ($/MWHr)".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SolarSection {
    /// Hourly generation CSV (MWh); a synthetic profile is used when unset.
    pub path: Option<PathBuf>,
    pub timestamp_column: String,
    pub value_column: String,
    /// Annual generation degradation (fraction).
    pub degradation: f64,
}

impl Default for SolarSection {
    fn default() -> Self {
        Self {
            path: None,
            timestamp_column: "timestamp".to_string(),
            value_column: "AC_MWh".to_string(),
            degradation: 0.005,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CapexSection {
    /// Solar capital cost ($ per MW of nameplate).
    pub solar_per_mw: f64,
    /// Storage capital cost ($ per MWh of energy capacity).
    pub bess_per_mwh: f64,
}

impl Default for CapexSection {
    fn default() -> Self {
        Self {
            solar_per_mw: 1_200_000.0,
            bess_per_mwh: 300_000.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FinancialsSection {
    /// Nominal discount rate (WACC).
    pub discount_rate: f64,
    /// Annual O&M escalation.
    pub inflation_rate: f64,
    /// Annual merchant revenue escalation.
    pub escalation_rate: f64,
    /// Investment tax credit, applied as an upfront capex reduction.
    pub itc_credit: f64,
    /// Year-1 fixed O&M ($ per MW).
    pub o_and_m_per_mw: f64,
}

impl Default for FinancialsSection {
    fn default() -> Self {
        Self {
            discount_rate: 0.07,
            inflation_rate: 0.025,
            escalation_rate: 0.02,
            itc_credit: 0.30,
            o_and_m_per_mw: 20_000.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SyntheticSection {
    pub seed: u64,
    /// Annual mean price ($/MWh).
    pub mean_price: f64,
    /// Winter/summer swing as a fraction of the mean.
    pub seasonal_amplitude: f64,
    /// Amplitude of the morning/evening price peaks ($/MWh).
    pub diurnal_amplitude: f64,
    /// Gaussian price noise ($/MWh).
    pub noise_std: f64,
    /// Probability of a scarcity spike in any hour.
    pub spike_probability: f64,
    /// Maximum spike height ($/MWh).
    pub spike_magnitude: f64,
    /// Clear-sky output at solar noon as a fraction of nameplate.
    pub solar_peak_factor: f64,
    /// AR(1) persistence of the cloudiness factor (0-1).
    pub cloud_alpha: f64,
    /// AR(1) innovation noise of the cloudiness factor.
    pub cloud_noise_std: f64,
}

impl Default for SyntheticSection {
    fn default() -> Self {
        Self {
            seed: 42,
            mean_price: 45.0,
            seasonal_amplitude: 0.2,
            diurnal_amplitude: 15.0,
            noise_std: 6.0,
            spike_probability: 0.01,
            spike_magnitude: 150.0,
            solar_peak_factor: 0.8,
            cloud_alpha: 0.8,
            cloud_noise_std: 0.15,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    pub dir: PathBuf,
    /// Render SVG figures next to the CSV exports.
    pub charts: bool,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("outputs"),
            charts: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SensitivitySection {
    /// Run the sweeps and export `sensitivity.csv`.
    pub enabled: bool,
    pub sweeps: Vec<Sweep>,
}

impl Default for SensitivitySection {
    fn default() -> Self {
        Self {
            enabled: true,
            sweeps: vec![
                Sweep::new(SensitivityParameter::DiscountRate, [0.05, 0.06, 0.08, 0.09]),
                Sweep::new(SensitivityParameter::EscalationRate, [0.0, 0.04]),
                Sweep::new(SensitivityParameter::ItcCredit, [0.0, 0.4]),
                Sweep::new(SensitivityParameter::BessCapexPerMwh, [200_000.0, 400_000.0]),
                Sweep::new(SensitivityParameter::DurationHours, [2.0, 6.0]),
            ],
        }
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("config error: {field}: {message}")]
pub struct ConfigError {
    /// Dotted field path (e.g., `"bess.duration_hours"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl ProjectConfig {
    /// Baseline: 5 MW solar with a 4-hour battery and global thresholds.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Baseline plant dispatched against per-day price quantiles.
    pub fn daily_thresholds() -> Self {
        Self {
            dispatch: DispatchSection {
                threshold_mode: ThresholdMode::Daily,
                ..DispatchSection::default()
            },
            ..Self::default()
        }
    }

    /// Shorter 2-hour battery trading the tighter 20/80 band.
    pub fn two_hour() -> Self {
        Self {
            project: ProjectSection {
                name: "Solar + 2h BESS".to_string(),
                ..ProjectSection::default()
            },
            bess: BessSection {
                duration_hours: 2.0,
                ..BessSection::default()
            },
            dispatch: DispatchSection {
                low_quantile: 0.20,
                high_quantile: 0.80,
                ..DispatchSection::default()
            },
            ..Self::default()
        }
    }

    /// Accepted calendar years for the hourly grid.
    pub const YEARS: std::ops::RangeInclusive<i32> = 1900..=2200;

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "daily_thresholds", "two_hour"];

    /// Loads a configuration from a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "daily_thresholds" => Ok(Self::daily_thresholds()),
            "two_hour" => Ok(Self::two_hour()),
            _ => Err(ConfigError::new(
                "preset",
                format!(
                    "unknown preset \"{name}\", available: {}",
                    Self::PRESETS.join(", ")
                ),
            )),
        }
    }

    /// Parses a configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file cannot be read or the TOML is invalid.
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| {
            ConfigError::new("config", format!("cannot read \"{}\": {e}", path.display()))
        })?;
        Self::from_toml_str(&content)
    }

    /// Parses a configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the TOML is invalid or contains unknown fields.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::new("toml", e.to_string()))
    }

    /// Battery energy capacity (MWh).
    pub fn capacity_mwh(&self) -> f64 {
        self.project.capacity_mw * self.bess.duration_hours
    }

    /// Parsed market timezone.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the name is not an IANA timezone.
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.project.timezone.parse::<Tz>().map_err(|_| {
            ConfigError::new(
                "project.timezone",
                format!("unknown timezone \"{}\"", self.project.timezone),
            )
        })
    }

    /// Builds the validated dispatch parameter set.
    ///
    /// # Errors
    ///
    /// Returns the first violated battery or policy constraint.
    pub fn dispatch_parameters(&self) -> Result<DispatchParameters, ConfigError> {
        DispatchParameters::new(
            self.project.capacity_mw,
            self.bess.duration_hours,
            self.bess.charge_efficiency,
            self.bess.discharge_efficiency,
            self.dispatch.low_quantile,
            self.dispatch.high_quantile,
            self.dispatch.threshold_mode,
        )
    }

    /// Cash-flow inputs derived from the capex, financials and degradation settings.
    pub fn cashflow_parameters(&self) -> CashflowParameters {
        let f = &self.financials;
        CashflowParameters {
            project_life: self.project.project_life,
            discount_rate: f.discount_rate,
            inflation_rate: f.inflation_rate,
            escalation_rate: f.escalation_rate,
            solar_capex: self.capex.solar_per_mw * self.project.capacity_mw,
            bess_capex: self.capex.bess_per_mwh * self.capacity_mwh(),
            itc_credit: f.itc_credit,
            opex_fixed: f.o_and_m_per_mw * self.project.capacity_mw,
            solar_degradation: self.solar.degradation,
            bess_degradation: self.bess.degradation,
            replacement_year: self.bess.replacement_year,
            replacement_cost_frac: self.bess.replacement_cost_frac,
        }
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        let positive = |errors: &mut Vec<ConfigError>, field: &str, v: f64| {
            if !(v.is_finite() && v > 0.0) {
                errors.push(ConfigError::new(field, format!("must be > 0, got {v}")));
            }
        };
        let fraction = |errors: &mut Vec<ConfigError>, field: &str, v: f64| {
            if !(0.0..=1.0).contains(&v) {
                errors.push(ConfigError::new(field, format!("must be in [0, 1], got {v}")));
            }
        };

        let p = &self.project;
        positive(&mut errors, "project.capacity_mw", p.capacity_mw);
        if p.project_life == 0 {
            errors.push(ConfigError::new("project.project_life", "must be > 0"));
        }
        if !Self::YEARS.contains(&p.year) {
            errors.push(ConfigError::new(
                "project.year",
                format!(
                    "must be in [{}, {}], got {}",
                    Self::YEARS.start(),
                    Self::YEARS.end(),
                    p.year
                ),
            ));
        }
        if let Err(e) = self.timezone() {
            errors.push(e);
        }

        let b = &self.bess;
        positive(&mut errors, "bess.duration_hours", b.duration_hours);
        for (field, v) in [
            ("bess.charge_efficiency", b.charge_efficiency),
            ("bess.discharge_efficiency", b.discharge_efficiency),
        ] {
            if !(v > 0.0 && v <= 1.0) {
                errors.push(ConfigError::new(field, format!("must be in (0, 1], got {v}")));
            }
        }
        fraction(&mut errors, "bess.degradation", b.degradation);
        fraction(&mut errors, "bess.replacement_cost_frac", b.replacement_cost_frac);
        if b.replacement_year > p.project_life {
            errors.push(ConfigError::new(
                "bess.replacement_year",
                "must be <= project.project_life",
            ));
        }

        let d = &self.dispatch;
        fraction(&mut errors, "dispatch.low_quantile", d.low_quantile);
        fraction(&mut errors, "dispatch.high_quantile", d.high_quantile);
        if d.low_quantile >= d.high_quantile {
            errors.push(ConfigError::new(
                "dispatch.low_quantile",
                "must be < dispatch.high_quantile",
            ));
        }

        for (field, column) in [
            ("prices.timestamp_column", &self.prices.timestamp_column),
            ("prices.value_column", &self.prices.value_column),
            ("rtd_prices.timestamp_column", &self.rtd_prices.timestamp_column),
            ("rtd_prices.value_column", &self.rtd_prices.value_column),
            ("solar.timestamp_column", &self.solar.timestamp_column),
            ("solar.value_column", &self.solar.value_column),
        ] {
            if column.trim().is_empty() {
                errors.push(ConfigError::new(field, "must not be empty"));
            }
        }
        fraction(&mut errors, "solar.degradation", self.solar.degradation);

        if self.capex.solar_per_mw < 0.0 {
            errors.push(ConfigError::new("capex.solar_per_mw", "must be >= 0"));
        }
        if self.capex.bess_per_mwh < 0.0 {
            errors.push(ConfigError::new("capex.bess_per_mwh", "must be >= 0"));
        }

        let f = &self.financials;
        if f.discount_rate <= -1.0 {
            errors.push(ConfigError::new("financials.discount_rate", "must be > -1"));
        }
        fraction(&mut errors, "financials.itc_credit", f.itc_credit);
        if f.o_and_m_per_mw < 0.0 {
            errors.push(ConfigError::new("financials.o_and_m_per_mw", "must be >= 0"));
        }

        let s = &self.synthetic;
        positive(&mut errors, "synthetic.mean_price", s.mean_price);
        fraction(&mut errors, "synthetic.spike_probability", s.spike_probability);
        fraction(&mut errors, "synthetic.solar_peak_factor", s.solar_peak_factor);
        if !(0.0..1.0).contains(&s.cloud_alpha) {
            errors.push(ConfigError::new("synthetic.cloud_alpha", "must be in [0, 1)"));
        }
        if s.noise_std < 0.0 || s.cloud_noise_std < 0.0 {
            errors.push(ConfigError::new(
                "synthetic.noise_std",
                "noise standard deviations must be >= 0",
            ));
        }

        for sweep in &self.sensitivity.sweeps {
            if sweep.values.is_empty() || sweep.values.iter().any(|v| !v.is_finite()) {
                errors.push(ConfigError::new(
                    format!("sensitivity.{}", sweep.parameter),
                    "values must be a non-empty list of finite numbers",
                ));
            }
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let cfg = ProjectConfig::baseline();
        let errors = cfg.validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn from_preset_unknown() {
        let e = ProjectConfig::from_preset("nonexistent").unwrap_err();
        assert_eq!(e.field, "preset");
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn all_presets_are_valid() {
        for name in ProjectConfig::PRESETS {
            let cfg = ProjectConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(
                errors.is_empty(),
                "preset \"{name}\" should be valid: {errors:?}"
            );
        }
    }

    #[test]
    fn daily_preset_switches_threshold_mode() {
        let cfg = ProjectConfig::daily_thresholds();
        assert_eq!(cfg.dispatch.threshold_mode, ThresholdMode::Daily);
        assert_eq!(
            ProjectConfig::baseline().dispatch.threshold_mode,
            ThresholdMode::Global
        );
    }

    #[test]
    fn two_hour_preset_halves_capacity() {
        let base = ProjectConfig::baseline();
        let short = ProjectConfig::two_hour();
        assert_relative_eq!(short.capacity_mwh() * 2.0, base.capacity_mwh());
    }

    #[test]
    fn valid_toml_parses() {
        let toml = r#"
[project]
name = "Zone A"
capacity_mw = 10.0
project_life = 20
year = 2023
timezone = "America/Chicago"

[bess]
duration_hours = 2.0
charge_efficiency = 0.92
discharge_efficiency = 0.93
degradation = 0.015
replacement_year = 10
replacement_cost_frac = 0.35

[dispatch]
low_quantile = 0.1
high_quantile = 0.9
threshold_mode = "daily"
min_hours = 24

[prices]
path = "data/lbmp.csv"
timestamp_column = "ts"
value_column = "price"

[capex]
solar_per_mw = 1000000.0
bess_per_mwh = 250000.0

[financials]
discount_rate = 0.08
inflation_rate = 0.02
escalation_rate = 0.01
itc_credit = 0.4
o_and_m_per_mw = 18000.0

[output]
dir = "out"
charts = false
"#;
        let cfg = ProjectConfig::from_toml_str(toml).expect("valid TOML should parse");
        assert_eq!(cfg.project.year, 2023);
        assert_eq!(cfg.dispatch.threshold_mode, ThresholdMode::Daily);
        assert_eq!(cfg.prices.path.as_deref(), Some(Path::new("data/lbmp.csv")));
        assert!(!cfg.output.charts);
        assert_eq!(cfg.timezone().ok(), Some(chrono_tz::America::Chicago));
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn invalid_toml_unknown_field() {
        let toml = r#"
[bess]
duration_hours = 4.0
bogus_field = true
"#;
        assert!(ProjectConfig::from_toml_str(toml).is_err());
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let cfg = ProjectConfig::from_toml_str("[synthetic]\nseed = 99\n").expect("parses");
        assert_eq!(cfg.synthetic.seed, 99);
        assert_relative_eq!(cfg.bess.duration_hours, 4.0);
        assert_relative_eq!(cfg.dispatch.low_quantile, 0.25);
    }

    #[test]
    fn validation_collects_every_error() {
        let mut cfg = ProjectConfig::baseline();
        cfg.bess.charge_efficiency = 0.0;
        cfg.dispatch.low_quantile = 0.8;
        cfg.project.timezone = "Mars/Olympus".to_string();
        let fields: Vec<_> = cfg.validate().into_iter().map(|e| e.field).collect();
        assert!(fields.contains(&"bess.charge_efficiency".to_string()));
        assert!(fields.contains(&"dispatch.low_quantile".to_string()));
        assert!(fields.contains(&"project.timezone".to_string()));
    }

    #[test]
    fn validation_catches_late_replacement() {
        let mut cfg = ProjectConfig::baseline();
        cfg.bess.replacement_year = cfg.project.project_life + 1;
        assert!(
            cfg.validate()
                .iter()
                .any(|e| e.field == "bess.replacement_year")
        );
    }

    #[test]
    fn validation_rejects_out_of_range_year() {
        for year in [i32::MAX, i32::MIN, 1899, 2201] {
            let mut cfg = ProjectConfig::baseline();
            cfg.project.year = year;
            assert!(
                cfg.validate().iter().any(|e| e.field == "project.year"),
                "year {year} should be rejected"
            );
        }
        let toml = "[project]\nyear = 2147483647\n";
        let cfg = ProjectConfig::from_toml_str(toml).expect("parses");
        assert!(!cfg.validate().is_empty());
    }

    #[test]
    fn real_time_prices_section_parses() {
        let toml = r#"
[rtd_prices]
path = "data/rtd.csv"
value_column = "RTD LBMP"
"#;
        let cfg = ProjectConfig::from_toml_str(toml).expect("parses");
        assert_eq!(cfg.rtd_prices.path.as_deref(), Some(Path::new("data/rtd.csv")));
        assert_eq!(cfg.rtd_prices.timestamp_column, "Time Stamp");
        assert!(ProjectConfig::baseline().rtd_prices.path.is_none());
    }

    #[test]
    fn empty_sweep_is_rejected() {
        let mut cfg = ProjectConfig::baseline();
        assert!(cfg.sensitivity.enabled);
        cfg.sensitivity.sweeps = vec![Sweep::new(SensitivityParameter::ItcCredit, Vec::new())];
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "sensitivity.itc_credit"));
    }

    #[test]
    fn dispatch_parameters_follow_config() {
        let cfg = ProjectConfig::two_hour();
        let params = cfg.dispatch_parameters().expect("valid");
        assert_relative_eq!(params.capacity_mwh(), 10.0);
        assert_relative_eq!(params.low_quantile(), 0.20);
    }

    #[test]
    fn cashflow_parameters_scale_with_size() {
        let p = ProjectConfig::baseline().cashflow_parameters();
        assert_relative_eq!(p.solar_capex, 6_000_000.0);
        assert_relative_eq!(p.bess_capex, 6_000_000.0);
        assert_relative_eq!(p.opex_fixed, 100_000.0);
        assert_eq!(p.project_life, 25);
    }
}
