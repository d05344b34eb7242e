//! Time-of-day transition profiles for weekdays and weekends.

use std::ops::RangeInclusive;

use super::matrix::TransitionMatrix;
use crate::error::MatrixError;

/// Morning band slots (05:30–11:00).
pub const MORNING_SLOTS: RangeInclusive<usize> = 11..=21;
/// Midday band slots (11:00–15:00).
pub const MIDDAY_SLOTS: RangeInclusive<usize> = 22..=29;
/// Afternoon band slots (15:00–20:00).
pub const AFTERNOON_SLOTS: RangeInclusive<usize> = 30..=39;
/// Name reported for slots outside every explicit band.
pub const NIGHT_BAND: &str = "night";

/// Which preset profile a day uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayType {
    Weekday,
    Weekend,
}

impl DayType {
    /// Built-in profile for this day type.
    pub fn profile(self) -> DayProfile {
        match self {
            Self::Weekday => DayProfile::weekday(),
            Self::Weekend => DayProfile::weekend(),
        }
    }
}

/// A named, contiguous range of slots sharing one transition matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeBand {
    pub name: &'static str,
    pub slots: RangeInclusive<usize>,
    pub matrix: TransitionMatrix,
}

/// Four transition matrices covering one day.
///
/// Morning, midday and afternoon are explicit bands. Any slot outside them
/// (00:00–05:30 and 20:00–24:00) uses the night matrix.
///
/// The band edges reproduce the historical lookup: slot 21 is the last
/// morning slot, 29 the last midday slot and 39 the last afternoon slot.
#[derive(Debug, Clone, PartialEq)]
pub struct DayProfile {
    bands: [TimeBand; 3],
    night: TransitionMatrix,
}

impl DayProfile {
    /// Builds a profile from four validated matrices.
    pub fn new(
        morning: TransitionMatrix,
        midday: TransitionMatrix,
        afternoon: TransitionMatrix,
        night: TransitionMatrix,
    ) -> Self {
        Self {
            bands: [
                TimeBand {
                    name: "morning",
                    slots: MORNING_SLOTS,
                    matrix: morning,
                },
                TimeBand {
                    name: "midday",
                    slots: MIDDAY_SLOTS,
                    matrix: midday,
                },
                TimeBand {
                    name: "afternoon",
                    slots: AFTERNOON_SLOTS,
                    matrix: afternoon,
                },
            ],
            night,
        }
    }

    /// Builds a profile from raw probability tables.
    ///
    /// # Errors
    ///
    /// Returns the first [`MatrixError`] among the four tables.
    pub fn from_rows(
        morning: [[f64; 2]; 2],
        midday: [[f64; 2]; 2],
        afternoon: [[f64; 2]; 2],
        night: [[f64; 2]; 2],
    ) -> Result<Self, MatrixError> {
        Ok(Self::new(
            TransitionMatrix::new(morning)?,
            TransitionMatrix::new(midday)?,
            TransitionMatrix::new(afternoon)?,
            TransitionMatrix::new(night)?,
        ))
    }

    /// Weekday commuting pattern.
    pub fn weekday() -> Self {
        Self::preset(
            [[0.1, 0.9], [0.05, 0.95]],
            [[0.6, 0.4], [0.3, 0.7]],
            [[0.8, 0.2], [0.8, 0.2]],
            NIGHT_ROWS,
        )
    }

    /// Weekend pattern with later, less regular trips.
    pub fn weekend() -> Self {
        Self::preset(
            [[0.7, 0.3], [0.1, 0.9]],
            [[0.4, 0.6], [0.3, 0.7]],
            [[0.8, 0.2], [0.8, 0.2]],
            NIGHT_ROWS,
        )
    }

    fn preset(
        morning: [[f64; 2]; 2],
        midday: [[f64; 2]; 2],
        afternoon: [[f64; 2]; 2],
        night: [[f64; 2]; 2],
    ) -> Self {
        // Preset tables are row-stochastic; a failure here is a typo in this file.
        match Self::from_rows(morning, midday, afternoon, night) {
            Ok(profile) => profile,
            Err(e) => panic!("built-in transition preset is invalid: {e}"),
        }
    }

    /// Explicit bands in day order.
    pub fn bands(&self) -> &[TimeBand] {
        &self.bands
    }

    /// Matrix used outside every explicit band.
    pub fn night(&self) -> &TransitionMatrix {
        &self.night
    }

    fn band(&self, slot: usize) -> Option<&TimeBand> {
        self.bands.iter().find(|band| band.slots.contains(&slot))
    }

    /// Matrix governing the transition into `slot`.
    pub fn matrix_for_slot(&self, slot: usize) -> &TransitionMatrix {
        self.band(slot).map_or(&self.night, |band| &band.matrix)
    }

    /// Name of the band containing `slot`, [`NIGHT_BAND`] outside them.
    pub fn band_name(&self, slot: usize) -> &'static str {
        self.band(slot).map_or(NIGHT_BAND, |band| band.name)
    }
}

const NIGHT_ROWS: [[f64; 2]; 2] = [[0.98, 0.02], [0.8, 0.2]];
