//! CSV export for cost samples and generated scenarios.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::markov::DayScenario;
use crate::monte_carlo::{CostsByDay, Weekday};

/// Column header for cost-sample export.
const SAMPLES_HEADER: &str = "dataset,availability_iteration,usage_iteration,usage,weekday,cost";

/// Column header for histogram export.
const HISTOGRAM_HEADER: &str = "weekday,bin,lower,upper,count";

/// Column header for scenario export.
const SCENARIO_HEADER: &str = "slot,band,weekday_state,weekday_availability,weekday_min_charge,\
                               weekend_state,weekend_availability,weekend_min_charge";

/// Exports every cost sample to a CSV file at `path`.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_samples_csv(costs: &CostsByDay, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_samples_csv(costs, io::BufWriter::new(file))
}

/// Writes cost samples as CSV to any writer, Monday samples first.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_samples_csv(costs: &CostsByDay, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(SAMPLES_HEADER.split(','))?;

    for s in costs.iter() {
        wtr.write_record(&[
            s.dataset.clone(),
            s.availability_iteration.to_string(),
            s.usage_iteration.to_string(),
            format!("{:.6}", s.usage),
            s.weekday.name().to_string(),
            format!("{:.4}", s.cost),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

/// Exports per-weekday cost histograms to a CSV file at `path`.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_histograms_csv(costs: &CostsByDay, bins: usize, path: &Path) -> io::Result<()> {
    let file = File::create(path)?;
    write_histograms_csv(costs, bins, io::BufWriter::new(file))
}

/// Writes one row per weekday and bin. Days without samples have no rows.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_histograms_csv(costs: &CostsByDay, bins: usize, writer: impl Write) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(HISTOGRAM_HEADER.split(','))?;

    for day in Weekday::ALL {
        let dist = costs.day(day);
        let Some(max) = dist.max() else {
            continue;
        };
        let hist = dist.histogram(bins);
        for (i, &(lower, count)) in hist.iter().enumerate() {
            let upper = hist.get(i + 1).map_or(max, |&(next, _)| next);
            wtr.write_record(&[
                day.name().to_string(),
                i.to_string(),
                format!("{lower:.4}"),
                format!("{upper:.4}"),
                count.to_string(),
            ])?;
        }
    }

    wtr.flush()?;
    Ok(())
}

/// Exports a weekday/weekend scenario pair to a CSV file at `path`.
///
/// # Errors
///
/// Returns an `io::Error` if file creation or writing fails.
pub fn export_scenarios_csv(
    weekday: &DayScenario,
    weekend: &DayScenario,
    path: &Path,
) -> io::Result<()> {
    let file = File::create(path)?;
    write_scenarios_csv(weekday, weekend, io::BufWriter::new(file))
}

/// Writes one row per slot with both day types side by side.
///
/// The `band` column names the weekday band; both day types share slot ranges.
///
/// # Errors
///
/// Returns an `io::Error` if writing fails.
pub fn write_scenarios_csv(
    weekday: &DayScenario,
    weekend: &DayScenario,
    writer: impl Write,
) -> io::Result<()> {
    let mut wtr = csv::WriterBuilder::new().from_writer(writer);
    wtr.write_record(SCENARIO_HEADER.split(',').map(str::trim))?;

    for slot in 0..weekday.states.len() {
        wtr.write_record(&[
            slot.to_string(),
            weekday.bands[slot].to_string(),
            weekday.states[slot].as_u8().to_string(),
            format!("{:.4}", weekday.availability[slot]),
            format!("{:.4}", weekday.min_charge[slot]),
            weekend.states[slot].as_u8().to_string(),
            format!("{:.4}", weekend.availability[slot]),
            format!("{:.4}", weekend.min_charge[slot]),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
