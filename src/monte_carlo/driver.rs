//! The dataset × availability scenario × usage draw loop.

use std::fmt;
use std::path::{Path, PathBuf};

use rand::{Rng, SeedableRng, rngs::StdRng};
use tracing::{debug, info, warn};

use super::costs::{CostSample, CostsByDay};
use super::weekday::Weekday;
use crate::config::{DatasetConfig, HemsConfig};
use crate::dataset::HouseholdDataset;
use crate::error::HemsError;
use crate::evaluator::{WeekInputs, WeeklyCostEvaluator};
use crate::markov::{DayProfile, DayScenario, DayType, SLOTS_PER_DAY, generate_day};

/// Loop bounds and EV parameters for a Monte Carlo run.
#[derive(Debug, Clone)]
pub struct DriverSettings {
    pub seed: u64,
    pub availability_iterations: usize,
    pub usage_iterations: usize,
    pub min_charge_level: f64,
    pub max_charge_level: f64,
    pub charge_rate: f64,
    pub histogram_bins: usize,
}

impl DriverSettings {
    pub fn from_config(config: &HemsConfig) -> Self {
        let ev = &config.ev;
        Self {
            seed: config.monte_carlo.seed,
            availability_iterations: config.monte_carlo.availability_iterations,
            usage_iterations: config.monte_carlo.usage_iterations,
            min_charge_level: ev.min_charge_level,
            max_charge_level: ev.max_charge_level,
            charge_rate: ev.charge_rate,
            histogram_bins: config.monte_carlo.histogram_bins,
        }
    }
}

/// A dataset file that failed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedDataset {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a Monte Carlo run.
#[derive(Debug, Clone, Default)]
pub struct MonteCarloReport {
    /// Daily cost samples grouped by weekday.
    pub costs: CostsByDay,
    /// Names of datasets that contributed samples.
    pub datasets_used: Vec<String>,
    /// Files rejected during loading.
    pub datasets_skipped: Vec<SkippedDataset>,
    /// Bins used when printing cost histograms; zero prints none.
    pub histogram_bins: usize,
}

impl fmt::Display for MonteCarloReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "--- Monte Carlo Cost Report ---")?;
        writeln!(f, "Datasets used:    {}", self.datasets_used.len())?;
        writeln!(f, "Datasets skipped: {}", self.datasets_skipped.len())?;
        for skipped in &self.datasets_skipped {
            writeln!(f, "  {} ({})", skipped.path.display(), skipped.reason)?;
        }
        writeln!(f, "Cost samples:     {}", self.costs.total())?;
        writeln!(f)?;
        write!(f, "{}", self.costs)?;
        if self.histogram_bins > 0 {
            writeln!(f)?;
            write!(f, "{}", self.costs.histograms(self.histogram_bins))?;
        }
        Ok(())
    }
}

/// Repeatedly samples availability scenarios and prices weeks with `E`.
///
/// A single seeded `StdRng` drives scenario generation and usage draws, so a
/// run is reproducible from [`DriverSettings::seed`].
pub struct MonteCarloDriver<E> {
    settings: DriverSettings,
    weekday: DayProfile,
    weekend: DayProfile,
    max_charge: Vec<f64>,
    evaluator: E,
    rng: StdRng,
}

impl<E: WeeklyCostEvaluator> MonteCarloDriver<E> {
    pub fn new(
        settings: DriverSettings,
        weekday: DayProfile,
        weekend: DayProfile,
        evaluator: E,
    ) -> Self {
        let rng = StdRng::seed_from_u64(settings.seed);
        let max_charge = vec![settings.max_charge_level; SLOTS_PER_DAY];
        Self {
            settings,
            weekday,
            weekend,
            max_charge,
            evaluator,
            rng,
        }
    }

    /// Builds a driver from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HemsError::Matrix`] if a transition matrix override is invalid.
    pub fn from_config(config: &HemsConfig, evaluator: E) -> Result<Self, HemsError> {
        Ok(Self::new(
            DriverSettings::from_config(config),
            config.weekday_profile()?,
            config.weekend_profile()?,
            evaluator,
        ))
    }

    /// Empty report carrying the configured histogram resolution.
    pub fn new_report(&self) -> MonteCarloReport {
        MonteCarloReport {
            histogram_bins: self.settings.histogram_bins,
            ..MonteCarloReport::default()
        }
    }

    pub fn evaluator(&self) -> &E {
        &self.evaluator
    }

    /// Transition profile in use for `day_type`.
    pub fn profile(&self, day_type: DayType) -> &DayProfile {
        match day_type {
            DayType::Weekday => &self.weekday,
            DayType::Weekend => &self.weekend,
        }
    }

    fn sample_day(&mut self, day_type: DayType) -> DayScenario {
        let profile = match day_type {
            DayType::Weekday => &self.weekday,
            DayType::Weekend => &self.weekend,
        };
        generate_day(
            self.settings.min_charge_level,
            self.settings.charge_rate,
            profile,
            &mut self.rng,
        )
    }

    /// Generates one weekday and one weekend scenario from the driver's RNG.
    pub fn sample_scenarios(&mut self) -> (DayScenario, DayScenario) {
        let weekday = self.sample_day(DayType::Weekday);
        let weekend = self.sample_day(DayType::Weekend);
        (weekday, weekend)
    }

    /// Loads each file and runs every dataset that passes validation.
    ///
    /// Files that fail to load are logged and recorded in the report.
    ///
    /// # Errors
    ///
    /// Returns the first evaluator failure.
    pub fn run_paths(
        &mut self,
        paths: &[PathBuf],
        dataset_config: &DatasetConfig,
    ) -> Result<MonteCarloReport, HemsError> {
        let mut report = self.new_report();
        for path in paths {
            match HouseholdDataset::from_path(path, dataset_config) {
                Ok(dataset) => self.run_dataset(&dataset, &mut report)?,
                Err(e) => skip(&mut report, path, e.to_string()),
            }
        }
        info!(
            used = report.datasets_used.len(),
            skipped = report.datasets_skipped.len(),
            samples = report.costs.total(),
            "monte carlo run complete"
        );
        Ok(report)
    }

    /// Runs all availability scenarios and usage draws for one dataset.
    ///
    /// # Errors
    ///
    /// Returns [`HemsError::Evaluator`] when the evaluator fails. Samples
    /// recorded before the failure stay in `report`.
    pub fn run_dataset(
        &mut self,
        dataset: &HouseholdDataset,
        report: &mut MonteCarloReport,
    ) -> Result<(), HemsError> {
        info!(dataset = %dataset.name, readings = dataset.len(), "running dataset");

        for availability_iteration in 0..self.settings.availability_iterations {
            let (weekday, weekend) = self.sample_scenarios();

            for usage_iteration in 0..self.settings.usage_iterations {
                let usage: f64 = self.rng.random();
                debug!(availability_iteration, usage_iteration, usage, "evaluating week");

                let week = WeekInputs {
                    usage,
                    demand_kw: &dataset.demand_kw,
                    pv_kw: &dataset.pv_kw,
                    weekday_availability: &weekday.availability,
                    weekend_availability: &weekend.availability,
                    max_charge: &self.max_charge,
                    weekday_min_charge: &weekday.min_charge,
                    weekend_min_charge: &weekend.min_charge,
                };
                let daily = self
                    .evaluator
                    .evaluate_week(&week)
                    .map_err(|source| HemsError::Evaluator {
                        dataset: dataset.name.clone(),
                        source,
                    })?;

                for day in Weekday::ALL {
                    report.costs.record(CostSample {
                        dataset: dataset.name.clone(),
                        availability_iteration,
                        usage_iteration,
                        usage,
                        weekday: day,
                        cost: daily[day.index()],
                    });
                }
            }
        }

        report.datasets_used.push(dataset.name.clone());
        Ok(())
    }
}

fn skip(report: &mut MonteCarloReport, path: &Path, reason: String) {
    warn!(path = %path.display(), %reason, "skipping dataset");
    report.datasets_skipped.push(SkippedDataset {
        path: path.to_path_buf(),
        reason,
    });
}
