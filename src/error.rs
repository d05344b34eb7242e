//! Error types shared across the simulator.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// A transition matrix that is not row-stochastic.
#[derive(Debug, Error, PartialEq)]
pub enum MatrixError {
    #[error("transition probability {value} at [{row}][{col}] is outside [0, 1]")]
    Probability { row: usize, col: usize, value: f64 },

    #[error("row {row} of transition matrix sums to {sum}, expected 1")]
    RowSum { row: usize, sum: f64 },
}

/// Reasons a household dataset is rejected.
///
/// The Monte Carlo driver logs these and moves on to the next file.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("cannot read \"{}\": {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("expected {expected} data rows, found {found}")]
    RowCount { expected: usize, found: usize },

    #[error("missing value at row {row}, column {column}")]
    MissingValue { row: usize, column: usize },

    #[error("row {row} has no column {column}")]
    MissingColumn { row: usize, column: usize },

    #[error("value \"{value}\" at row {row}, column {column} is not a number")]
    InvalidNumber {
        row: usize,
        column: usize,
        value: String,
    },
}

/// Failures reported by a weekly cost evaluator.
#[derive(Debug, Error)]
pub enum EvaluatorError {
    #[error("{name} trace has {found} slots, expected {expected}")]
    TraceLength {
        name: &'static str,
        expected: usize,
        found: usize,
    },

    #[error("yearly trace has {available} slots, the evaluated week needs {needed}")]
    YearTooShort { needed: usize, available: usize },

    #[error("evaluation failed: {0}")]
    Failed(String),
}

/// Top-level error for a simulation run.
#[derive(Debug, Error)]
pub enum HemsError {
    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error("cost evaluation failed for dataset \"{dataset}\": {source}")]
    Evaluator {
        dataset: String,
        #[source]
        source: EvaluatorError,
    },

    #[error("cannot write \"{}\": {source}", path.display())]
    Export {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
