//! Markov-chain EV availability scenarios.
//!
//! A two-state chain (away / home) advances once per half-hour slot with
//! transition matrices that change with the time of day. Weekdays and
//! weekends differ only in the matrices they use.

/// Day scenario generation.
pub mod generator;
pub mod matrix;
/// Time-banded weekday and weekend profiles.
pub mod profile;

pub use generator::{DayScenario, SLOTS_PER_DAY, UNCONSTRAINED_MIN_CHARGE, generate_day};
pub use matrix::{AvailabilityState, TransitionMatrix};
pub use profile::{DayProfile, DayType, NIGHT_BAND, TimeBand};
