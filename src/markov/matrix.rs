//! Two-state transition matrices for the EV availability chain.

use std::fmt;

use rand::Rng;

use crate::error::MatrixError;

/// Allowed deviation of a row sum from 1.
const ROW_SUM_TOLERANCE: f64 = 1e-9;

/// Raw state of the availability chain in one half-hour slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityState {
    /// Vehicle away or not connected (state 0).
    Away,
    /// Vehicle at home and connected (state 1).
    Home,
}

impl AvailabilityState {
    /// Row/column index of this state in a transition matrix.
    pub fn index(self) -> usize {
        match self {
            Self::Away => 0,
            Self::Home => 1,
        }
    }

    /// Numeric state label (0 or 1) as written to exports.
    pub fn as_u8(self) -> u8 {
        self.index() as u8
    }
}

impl fmt::Display for AvailabilityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Away => f.write_str("away"),
            Self::Home => f.write_str("home"),
        }
    }
}

/// A validated 2×2 row-stochastic transition matrix.
///
/// Row `r` holds the probabilities of moving from state `r` to state 0 and
/// state 1. Construction fails unless every entry lies in `[0, 1]` and every
/// row sums to 1.
///
/// # Examples
///
/// ```
/// use hems_sim::markov::TransitionMatrix;
///
/// assert!(TransitionMatrix::new([[0.6, 0.4], [0.3, 0.7]]).is_ok());
/// assert!(TransitionMatrix::new([[0.1, 0.9], [0.1, 0.95]]).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TransitionMatrix {
    rows: [[f64; 2]; 2],
}

impl TransitionMatrix {
    /// Validates and wraps a raw probability table.
    ///
    /// # Errors
    ///
    /// Returns [`MatrixError::Probability`] for an entry outside `[0, 1]` (or
    /// non-finite) and [`MatrixError::RowSum`] for a row that does not sum to 1.
    pub fn new(rows: [[f64; 2]; 2]) -> Result<Self, MatrixError> {
        for (r, row) in rows.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                    return Err(MatrixError::Probability { row: r, col: c, value });
                }
            }
            let sum = row[0] + row[1];
            if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                return Err(MatrixError::RowSum { row: r, sum });
            }
        }
        Ok(Self { rows })
    }

    /// Transition probabilities out of `state`.
    pub fn row(&self, state: AvailabilityState) -> [f64; 2] {
        self.rows[state.index()]
    }

    /// Raw probability table.
    pub fn rows(&self) -> [[f64; 2]; 2] {
        self.rows
    }

    /// Draws the state following `current`.
    ///
    /// Inverse-CDF draw on one uniform sample `u` in `[0, 1)`: `Away` when
    /// `u < p(current -> Away)`, `Home` otherwise.
    pub fn next_state<R: Rng + ?Sized>(
        &self,
        current: AvailabilityState,
        rng: &mut R,
    ) -> AvailabilityState {
        let row = self.row(current);
        let u: f64 = rng.random();
        if u < row[0] {
            AvailabilityState::Away
        } else {
            AvailabilityState::Home
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{SeedableRng, rngs::StdRng};

    #[test]
    fn accepts_stochastic_rows() {
        let m = TransitionMatrix::new([[0.98, 0.02], [0.8, 0.2]]);
        assert!(m.is_ok());
        let m = m.ok();
        assert_eq!(m.map(|m| m.row(AvailabilityState::Home)), Some([0.8, 0.2]));
    }

    #[test]
    fn rejects_row_not_summing_to_one() {
        let err = TransitionMatrix::new([[0.1, 0.9], [0.1, 0.95]]).unwrap_err();
        match err {
            MatrixError::RowSum { row, sum } => {
                assert_eq!(row, 1);
                assert!((sum - 1.05).abs() < 1e-12);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn rejects_negative_probability() {
        let err = TransitionMatrix::new([[1.5, -0.5], [0.5, 0.5]]).unwrap_err();
        assert_eq!(
            err,
            MatrixError::Probability {
                row: 0,
                col: 0,
                value: 1.5
            }
        );
    }

    #[test]
    fn rejects_nan() {
        assert!(TransitionMatrix::new([[f64::NAN, 0.5], [0.5, 0.5]]).is_err());
    }

    #[test]
    fn degenerate_rows_are_deterministic() {
        let m = TransitionMatrix::new([[0.0, 1.0], [1.0, 0.0]]).unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        for _ in 0..100 {
            assert_eq!(
                m.next_state(AvailabilityState::Away, &mut rng),
                AvailabilityState::Home
            );
            assert_eq!(
                m.next_state(AvailabilityState::Home, &mut rng),
                AvailabilityState::Away
            );
        }
    }

    #[test]
    fn empirical_frequency_tracks_row() {
        let m = TransitionMatrix::new([[0.3, 0.7], [0.5, 0.5]]).unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let n = 20_000;
        let home = (0..n)
            .filter(|_| m.next_state(AvailabilityState::Away, &mut rng) == AvailabilityState::Home)
            .count();
        let freq = home as f64 / n as f64;
        assert!((freq - 0.7).abs() < 0.02, "observed {freq}");
    }
}
