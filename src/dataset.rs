//! Historical household demand / PV datasets.

use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::DatasetConfig;
use crate::error::DatasetError;

/// Cell contents treated as missing.
const MISSING_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL"];

/// One household's demand and PV traces in average kW per reading.
#[derive(Debug, Clone, PartialEq)]
pub struct HouseholdDataset {
    /// File stem the data came from.
    pub name: String,
    /// Household demand (kW).
    pub demand_kw: Vec<f64>,
    /// PV generation (kW).
    pub pv_kw: Vec<f64>,
}

impl HouseholdDataset {
    /// Loads and validates a dataset file.
    ///
    /// # Errors
    ///
    /// Returns a `DatasetError` if the file cannot be read, has the wrong
    /// number of rows, or contains missing or non-numeric values.
    pub fn from_path(path: &Path, config: &DatasetConfig) -> Result<Self, DatasetError> {
        let file = File::open(path).map_err(|source| DatasetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_reader(name, io::BufReader::new(file), config)
    }

    /// Parses a dataset from any CSV reader with a header row.
    ///
    /// Every column of every row must be present. The final row (the first
    /// reading of the following year) is discarded after validation. Energy
    /// per reading in Wh becomes average kW: `wh / 1000 * readings_per_hour`.
    /// Negative PV readings become zero when `clamp_negative_pv` is set.
    ///
    /// # Errors
    ///
    /// Returns a `DatasetError` describing the first problem found.
    pub fn from_reader(
        name: impl Into<String>,
        reader: impl Read,
        config: &DatasetConfig,
    ) -> Result<Self, DatasetError> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);

        let mut pv_wh = Vec::with_capacity(config.expected_rows);
        let mut demand_wh = Vec::with_capacity(config.expected_rows);

        for (row, record) in rdr.records().enumerate() {
            let record = record?;
            if let Some(column) = record.iter().position(is_missing) {
                return Err(DatasetError::MissingValue { row, column });
            }
            pv_wh.push(parse_cell(&record, row, config.pv_column)?);
            demand_wh.push(parse_cell(&record, row, config.demand_column)?);
        }

        let found = pv_wh.len();
        if found != config.expected_rows {
            return Err(DatasetError::RowCount {
                expected: config.expected_rows,
                found,
            });
        }

        pv_wh.pop();
        demand_wh.pop();

        if config.clamp_negative_pv {
            pv_wh.iter_mut().for_each(|wh| *wh = wh.max(0.0));
        }

        let to_kw = |wh: f64| wh / 1000.0 * config.readings_per_hour;
        Ok(Self {
            name: name.into(),
            demand_kw: demand_wh.into_iter().map(to_kw).collect(),
            pv_kw: pv_wh.into_iter().map(to_kw).collect(),
        })
    }

    /// Number of readings kept after dropping the boundary row.
    pub fn len(&self) -> usize {
        self.demand_kw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.demand_kw.is_empty()
    }
}

fn is_missing(cell: &str) -> bool {
    MISSING_MARKERS.contains(&cell.trim())
}

fn parse_cell(record: &csv::StringRecord, row: usize, column: usize) -> Result<f64, DatasetError> {
    let raw = record
        .get(column)
        .ok_or(DatasetError::MissingColumn { row, column })?;
    raw.trim()
        .parse::<f64>()
        .map_err(|_| DatasetError::InvalidNumber {
            row,
            column,
            value: raw.to_string(),
        })
}

/// Lists `.csv` files in `dir`, sorted by file name, keeping at most `limit`.
///
/// # Errors
///
/// Returns an `io::Error` if the directory cannot be read.
pub fn discover_csv_files(dir: &Path, limit: usize) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_csv = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
        if is_csv && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    files.truncate(limit);
    debug!(dir = %dir.display(), count = files.len(), "discovered dataset files");
    Ok(files)
}
