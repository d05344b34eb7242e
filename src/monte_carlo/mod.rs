//! Monte Carlo cost distributions over stochastic EV availability.

/// Per-weekday cost samples and summary statistics.
pub mod costs;
pub mod driver;
pub mod weekday;

pub use costs::{CostDistribution, CostSample, CostsByDay, HistogramTable};
pub use driver::{DriverSettings, MonteCarloDriver, MonteCarloReport, SkippedDataset};
pub use weekday::{DAYS_PER_WEEK, Weekday};
