//! TOML-based run configuration and preset definitions.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::MatrixError;
use crate::markov::{DayProfile, SLOTS_PER_DAY};

/// Top-level configuration parsed from TOML.
///
/// All fields have defaults matching the baseline run. Load from TOML with
/// [`HemsConfig::from_toml_file`] or use [`HemsConfig::baseline`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HemsConfig {
    /// Iteration counts and the master seed.
    #[serde(default)]
    pub monte_carlo: MonteCarloConfig,
    /// Electric vehicle battery parameters.
    #[serde(default)]
    pub ev: EvConfig,
    /// Household dataset location and layout.
    #[serde(default)]
    pub dataset: DatasetConfig,
    /// Time-of-use tariff.
    #[serde(default)]
    pub tariff: TariffConfig,
    /// Optional transition matrix overrides.
    #[serde(default)]
    pub markov: MarkovConfig,
}

/// Monte Carlo loop parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MonteCarloConfig {
    /// Master random seed.
    pub seed: u64,
    /// Availability scenarios sampled per dataset (must be > 0).
    pub availability_iterations: usize,
    /// Usage-intensity draws per availability scenario (must be > 0).
    pub usage_iterations: usize,
    /// Maximum number of dataset files considered (must be > 0).
    pub max_datasets: usize,
    /// Day of the year (0-based, a Monday) where the evaluated week starts.
    pub start_day: usize,
    /// Bins in the per-weekday cost histograms (must be > 0).
    pub histogram_bins: usize,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            availability_iterations: 7,
            usage_iterations: 5,
            max_datasets: 24,
            start_day: 0,
            histogram_bins: 10,
        }
    }
}

/// Electric vehicle battery parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EvConfig {
    /// Maximum stored energy (kWh).
    pub max_charge_level: f64,
    /// Charge required before departure (kWh).
    pub min_charge_level: f64,
    /// Charge/discharge power limit (kW).
    pub charge_rate: f64,
    /// Stored energy at the start of each day (kWh).
    pub initial_charge: f64,
    /// One-way charge and discharge efficiency (0.0–1.0].
    pub efficiency: f64,
    /// Share of `max_charge_level` a full-usage day spends on travel.
    pub travel_fraction: f64,
    /// Slot of the outbound trip; half the travel energy leaves the battery here.
    pub departure_slot: usize,
    /// Slot of the return trip; the other half leaves here.
    pub return_slot: usize,
}

impl Default for EvConfig {
    fn default() -> Self {
        Self {
            max_charge_level: 40.0,
            min_charge_level: 8.16,
            charge_rate: 6.6,
            initial_charge: 0.0,
            efficiency: 0.84_f64.sqrt(),
            travel_fraction: 0.2,
            departure_slot: 8,
            return_slot: 32,
        }
    }
}

/// Household dataset location and CSV layout.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatasetConfig {
    /// Directory scanned for `.csv` files.
    pub dir: PathBuf,
    /// Required number of data rows, including the trailing boundary row.
    pub expected_rows: usize,
    /// Zero-based column holding PV generation (Wh per reading).
    pub pv_column: usize,
    /// Zero-based column holding demand (Wh per reading).
    pub demand_column: usize,
    /// Readings per hour, used to turn Wh per reading into average kW.
    pub readings_per_hour: f64,
    /// Replace negative PV readings (inverter standby draw) with zero.
    pub clamp_negative_pv: bool,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("data"),
            expected_rows: 17_521,
            pv_column: 1,
            demand_column: 2,
            readings_per_hour: 12.0,
            clamp_negative_pv: true,
        }
    }
}

/// Time-of-use tariff.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TariffConfig {
    /// Import price outside the peak window (per kWh).
    pub import_price: f64,
    /// Import price inside the peak window (per kWh).
    pub peak_price: f64,
    /// First peak slot (inclusive).
    pub peak_start_slot: usize,
    /// End of the peak window (exclusive).
    pub peak_end_slot: usize,
    /// Price paid for exported energy (per kWh).
    pub export_price: f64,
}

impl Default for TariffConfig {
    fn default() -> Self {
        Self {
            import_price: 0.4,
            peak_price: 0.4,
            peak_start_slot: 32,
            peak_end_slot: 42,
            export_price: 0.0,
        }
    }
}

/// Optional replacement matrices for the weekday and weekend profiles.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkovConfig {
    pub weekday: Option<ProfileRows>,
    pub weekend: Option<ProfileRows>,
}

/// Raw transition tables for one day type.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileRows {
    pub morning: [[f64; 2]; 2],
    pub midday: [[f64; 2]; 2],
    pub afternoon: [[f64; 2]; 2],
    pub night: [[f64; 2]; 2],
}

impl ProfileRows {
    /// Validates the tables into a profile.
    ///
    /// # Errors
    ///
    /// Returns the first non-stochastic table.
    pub fn to_profile(&self) -> Result<DayProfile, MatrixError> {
        DayProfile::from_rows(self.morning, self.midday, self.afternoon, self.night)
    }
}

/// Configuration error with field path and constraint description.
#[derive(Debug)]
pub struct ConfigError {
    /// Dotted field path (e.g., `"ev.charge_rate"`).
    pub field: String,
    /// Human-readable constraint description.
    pub message: String,
}

impl ConfigError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "config error: {}: {}", self.field, self.message)
    }
}

impl HemsConfig {
    /// Baseline run: flat 0.4/kWh tariff, 7 scenarios × 5 usage draws.
    pub fn baseline() -> Self {
        Self::default()
    }

    /// Evening peak pricing with a small export credit.
    pub fn time_of_use() -> Self {
        Self {
            tariff: TariffConfig {
                import_price: 0.25,
                peak_price: 0.55,
                peak_start_slot: 32,
                peak_end_slot: 42,
                export_price: 0.05,
            },
            ..Self::default()
        }
    }

    /// Single scenario, single draw, first dataset only.
    pub fn quick() -> Self {
        Self {
            monte_carlo: MonteCarloConfig {
                availability_iterations: 1,
                usage_iterations: 1,
                max_datasets: 1,
                ..MonteCarloConfig::default()
            },
            ..Self::default()
        }
    }

    /// Available preset names.
    pub const PRESETS: &[&str] = &["baseline", "time_of_use", "quick"];

    /// Loads a named preset.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the preset name is unknown.
    pub fn from_preset(name: &str) -> Result<Self, ConfigError> {
        match name {
            "baseline" => Ok(Self::baseline()),
            "time_of_use" => Ok(Self::time_of_use()),
            "quick" => Ok(Self::quick()),
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

    /// Weekday profile, with any override applied.
    ///
    /// # Errors
    ///
    /// Returns a `MatrixError` if the override is not row-stochastic.
    pub fn weekday_profile(&self) -> Result<DayProfile, MatrixError> {
        self.markov
            .weekday
            .as_ref()
            .map_or_else(|| Ok(DayProfile::weekday()), ProfileRows::to_profile)
    }

    /// Weekend profile, with any override applied.
    ///
    /// # Errors
    ///
    /// Returns a `MatrixError` if the override is not row-stochastic.
    pub fn weekend_profile(&self) -> Result<DayProfile, MatrixError> {
        self.markov
            .weekend
            .as_ref()
            .map_or_else(|| Ok(DayProfile::weekend()), ProfileRows::to_profile)
    }

    /// Validates all fields and returns a list of errors.
    ///
    /// Returns an empty vector if the configuration is valid.
    pub fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let mc = &self.monte_carlo;
        if mc.availability_iterations == 0 {
            errors.push(ConfigError::new(
                "monte_carlo.availability_iterations",
                "must be > 0",
            ));
        }
        if mc.usage_iterations == 0 {
            errors.push(ConfigError::new("monte_carlo.usage_iterations", "must be > 0"));
        }
        if mc.max_datasets == 0 {
            errors.push(ConfigError::new("monte_carlo.max_datasets", "must be > 0"));
        }
        if mc.histogram_bins == 0 {
            errors.push(ConfigError::new("monte_carlo.histogram_bins", "must be > 0"));
        }

        let ev = &self.ev;
        if ev.charge_rate <= 0.0 {
            errors.push(ConfigError::new("ev.charge_rate", "must be > 0"));
        }
        if ev.min_charge_level < 0.0 {
            errors.push(ConfigError::new("ev.min_charge_level", "must be >= 0"));
        }
        if ev.max_charge_level < ev.min_charge_level {
            errors.push(ConfigError::new(
                "ev.max_charge_level",
                "must be >= ev.min_charge_level",
            ));
        }
        if ev.max_charge_level < 1.0 {
            errors.push(ConfigError::new(
                "ev.max_charge_level",
                "must be >= 1 (the unconstrained minimum-charge value)",
            ));
        }
        if !(0.0..=ev.max_charge_level).contains(&ev.initial_charge) {
            errors.push(ConfigError::new(
                "ev.initial_charge",
                "must be in [0, ev.max_charge_level]",
            ));
        }
        if !(ev.efficiency > 0.0 && ev.efficiency <= 1.0) {
            errors.push(ConfigError::new("ev.efficiency", "must be in (0.0, 1.0]"));
        }
        if !(0.0..=1.0).contains(&ev.travel_fraction) {
            errors.push(ConfigError::new("ev.travel_fraction", "must be in [0.0, 1.0]"));
        }
        if ev.departure_slot >= SLOTS_PER_DAY {
            errors.push(ConfigError::new(
                "ev.departure_slot",
                format!("must be < {SLOTS_PER_DAY}"),
            ));
        }
        if ev.return_slot >= SLOTS_PER_DAY || ev.return_slot <= ev.departure_slot {
            errors.push(ConfigError::new(
                "ev.return_slot",
                format!("must be after ev.departure_slot and < {SLOTS_PER_DAY}"),
            ));
        }

        let ds = &self.dataset;
        if ds.expected_rows < 2 {
            errors.push(ConfigError::new("dataset.expected_rows", "must be >= 2"));
        }
        if ds.pv_column == ds.demand_column {
            errors.push(ConfigError::new(
                "dataset.pv_column",
                "must differ from dataset.demand_column",
            ));
        }
        if ds.readings_per_hour <= 0.0 {
            errors.push(ConfigError::new("dataset.readings_per_hour", "must be > 0"));
        }

        let t = &self.tariff;
        if t.peak_start_slot > t.peak_end_slot || t.peak_end_slot > SLOTS_PER_DAY {
            errors.push(ConfigError::new(
                "tariff.peak_start_slot",
                format!("peak window must satisfy start <= end <= {SLOTS_PER_DAY}"),
            ));
        }
        if t.import_price < 0.0 || t.peak_price < 0.0 {
            errors.push(ConfigError::new("tariff.import_price", "prices must be >= 0"));
        }

        if let Err(e) = self.weekday_profile() {
            errors.push(ConfigError::new("markov.weekday", e.to_string()));
        }
        if let Err(e) = self.weekend_profile() {
            errors.push(ConfigError::new("markov.weekend", e.to_string()));
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn baseline_preset_valid() {
        let errors = HemsConfig::baseline().validate();
        assert!(errors.is_empty(), "baseline should be valid: {errors:?}");
    }

    #[test]
    fn all_presets_are_valid() {
        for name in HemsConfig::PRESETS {
            let cfg = HemsConfig::from_preset(name);
            assert!(cfg.is_ok(), "preset \"{name}\" should load");
            let errors = cfg.as_ref().map(|c| c.validate()).unwrap_or_default();
            assert!(errors.is_empty(), "preset \"{name}\" should be valid: {errors:?}");
        }
    }

    #[test]
    fn from_preset_unknown() {
        let e = HemsConfig::from_preset("nonexistent").unwrap_err();
        assert!(e.message.contains("unknown preset"));
    }

    #[test]
    fn baseline_matches_historical_run() {
        let cfg = HemsConfig::baseline();
        assert_eq!(cfg.monte_carlo.availability_iterations, 7);
        assert_eq!(cfg.monte_carlo.usage_iterations, 5);
        assert_eq!(cfg.ev.max_charge_level, 40.0);
        assert_eq!(cfg.ev.min_charge_level, 8.16);
        assert_eq!(cfg.ev.charge_rate, 6.6);
        assert_eq!(cfg.dataset.expected_rows, 17_521);
    }

    #[test]
    fn partial_toml_uses_defaults() {
        let cfg = HemsConfig::from_toml_str(
            r#"
[monte_carlo]
seed = 99

[dataset]
dir = "households"
"#,
        );
        assert!(cfg.is_ok(), "{:?}", cfg.err());
        let cfg = cfg.ok();
        assert_eq!(cfg.as_ref().map(|c| c.monte_carlo.seed), Some(99));
        assert_eq!(cfg.as_ref().map(|c| c.monte_carlo.usage_iterations), Some(5));
        assert_eq!(
            cfg.as_ref().map(|c| c.dataset.dir.clone()),
            Some(PathBuf::from("households"))
        );
    }

    #[test]
    fn unknown_field_rejected() {
        let result = HemsConfig::from_toml_str(
            r#"
[ev]
charge_rate = 7.0
turbo = true
"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn markov_override_parses() {
        let cfg = HemsConfig::from_toml_str(
            r#"
[markov.weekend]
morning = [[0.5, 0.5], [0.2, 0.8]]
midday = [[0.5, 0.5], [0.2, 0.8]]
afternoon = [[0.5, 0.5], [0.2, 0.8]]
night = [[1.0, 0.0], [0.0, 1.0]]
"#,
        )
        .unwrap();
        assert!(cfg.validate().is_empty());
        let weekend = cfg.weekend_profile().unwrap();
        assert_ne!(weekend, DayProfile::weekend());
        assert_eq!(cfg.weekday_profile().unwrap(), DayProfile::weekday());
    }

    #[test]
    fn validation_catches_non_stochastic_override() {
        let cfg = HemsConfig::from_toml_str(
            r#"
[markov.weekday]
morning = [[0.1, 0.9], [0.1, 0.95]]
midday = [[0.6, 0.4], [0.3, 0.7]]
afternoon = [[0.8, 0.2], [0.8, 0.2]]
night = [[0.98, 0.02], [0.8, 0.2]]
"#,
        )
        .unwrap();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "markov.weekday"));
    }

    #[test]
    fn validation_catches_zero_iterations() {
        let mut cfg = HemsConfig::baseline();
        cfg.monte_carlo.usage_iterations = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "monte_carlo.usage_iterations"));
    }

    #[test]
    fn validation_catches_min_above_max() {
        let mut cfg = HemsConfig::baseline();
        cfg.ev.min_charge_level = 50.0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "ev.max_charge_level"));
    }

    #[test]
    fn validation_catches_shared_column() {
        let mut cfg = HemsConfig::baseline();
        cfg.dataset.pv_column = 2;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "dataset.pv_column"));
    }

    #[test]
    fn validation_catches_return_before_departure() {
        let mut cfg = HemsConfig::baseline();
        cfg.ev.return_slot = cfg.ev.departure_slot;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "ev.return_slot"));
    }

    #[test]
    fn validation_catches_zero_histogram_bins() {
        let mut cfg = HemsConfig::baseline();
        cfg.monte_carlo.histogram_bins = 0;
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.field == "monte_carlo.histogram_bins"));
    }

    #[test]
    fn commute_and_pv_defaults() {
        let cfg = HemsConfig::baseline();
        assert_eq!(cfg.ev.departure_slot, 8);
        assert_eq!(cfg.ev.return_slot, 32);
        assert!(cfg.dataset.clamp_negative_pv);
        assert_eq!(cfg.monte_carlo.histogram_bins, 10);
    }

    #[test]
    fn time_of_use_has_peak_premium() {
        let cfg = HemsConfig::time_of_use();
        assert!(cfg.tariff.peak_price > cfg.tariff.import_price);
    }
}
