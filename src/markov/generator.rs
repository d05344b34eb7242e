//! Single-day EV availability scenario generation.

use rand::Rng;

use super::matrix::AvailabilityState;
use super::profile::DayProfile;

/// Half-hour slots per day.
pub const SLOTS_PER_DAY: usize = 48;

/// Number of leading slots pinned to the initial state.
const SEEDED_SLOTS: usize = 2;

/// Slots before the first departure that carry the minimum-charge requirement.
const RESERVE_WINDOW: usize = 2;

/// Minimum-charge value meaning "no requirement".
pub const UNCONSTRAINED_MIN_CHARGE: f64 = 1.0;

const INITIAL_STATE: AvailabilityState = AvailabilityState::Away;

/// One generated day.
#[derive(Debug, Clone, PartialEq)]
pub struct DayScenario {
    /// Raw chain states, one per slot.
    pub states: [AvailabilityState; SLOTS_PER_DAY],
    /// Name of the time band whose matrix produced each slot.
    pub bands: [&'static str; SLOTS_PER_DAY],
    /// Charge/discharge availability per slot (kW).
    pub availability: [f64; SLOTS_PER_DAY],
    /// Minimum state of charge required per slot (kWh).
    pub min_charge: [f64; SLOTS_PER_DAY],
}

impl DayScenario {
    /// Index of the first slot whose availability is exactly zero.
    pub fn first_departure(&self) -> Option<usize> {
        first_zero(&self.availability)
    }
}

/// Output level of a chain state before scaling.
///
/// Both states map to zero. The historical post-processing overwrote every
/// `Home` slot with zero right after sampling, so the scaled trace is zero
/// throughout and the first departure is always slot 0. Kept as found; see
/// DESIGN.md before changing it.
fn level(state: AvailabilityState) -> f64 {
    match state {
        AvailabilityState::Away => 0.0,
        AvailabilityState::Home => 0.0,
    }
}

fn first_zero(trace: &[f64]) -> Option<usize> {
    trace.iter().position(|&v| v == 0.0)
}

/// Generates one day of availability and minimum-charge traces.
///
/// Slots 0 and 1 start `Away`. Each later slot is drawn from the row of the
/// previous slot's state in the matrix of the band containing the slot. The
/// two slots before the first zero of the scaled trace require `min_soc`;
/// everything else is [`UNCONSTRAINED_MIN_CHARGE`].
///
/// The random source is only advanced, never reseeded, so a seeded `rng`
/// reproduces the same day.
///
/// # Arguments
///
/// * `min_soc` - Charge required before the first departure
/// * `charge_discharge_rate` - Scaling factor applied to the availability trace
/// * `profile` - Time-banded transition matrices for the day type
/// * `rng` - Random source
pub fn generate_day<R: Rng + ?Sized>(
    min_soc: f64,
    charge_discharge_rate: f64,
    profile: &DayProfile,
    rng: &mut R,
) -> DayScenario {
    let mut states = [INITIAL_STATE; SLOTS_PER_DAY];
    for slot in SEEDED_SLOTS..SLOTS_PER_DAY {
        states[slot] = profile
            .matrix_for_slot(slot)
            .next_state(states[slot - 1], rng);
    }

    let bands = std::array::from_fn(|slot| profile.band_name(slot));
    let availability = states.map(|s| level(s) * charge_discharge_rate);
    let min_charge = reserve_window(&availability, min_soc);

    DayScenario {
        states,
        bands,
        availability,
        min_charge,
    }
}

/// Minimum-charge trace for an availability trace.
///
/// The [`RESERVE_WINDOW`] slots before the first zero carry `min_soc`, clamped
/// at slot 0. A trace starting at zero, or without a zero, has no reserve.
fn reserve_window(availability: &[f64; SLOTS_PER_DAY], min_soc: f64) -> [f64; SLOTS_PER_DAY] {
    let mut min_charge = [UNCONSTRAINED_MIN_CHARGE; SLOTS_PER_DAY];
    if let Some(departure) = first_zero(availability).filter(|&i| i > 0) {
        let start = departure.saturating_sub(RESERVE_WINDOW);
        min_charge[start..departure].fill(min_soc);
    }
    min_charge
}
