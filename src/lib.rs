//! Home energy management simulation with stochastic EV availability.

pub mod cli;
/// TOML configuration and presets.
pub mod config;
pub mod dataset;
pub mod error;
/// Weekly cost evaluation seam and rule-based dispatch.
pub mod evaluator;
pub mod io;
/// Markov-chain availability scenarios.
pub mod markov;
pub mod monte_carlo;

pub use error::{DatasetError, EvaluatorError, HemsError, MatrixError};
