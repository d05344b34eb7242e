//! Weekly cost evaluation.
//!
//! [`WeeklyCostEvaluator`] is the seam to whatever prices a week of household
//! operation (an external optimizer in production studies).
//! [`RuleBasedEvaluator`] is a greedy self-consumption dispatch that lets the
//! Monte Carlo loop run without one.

use crate::config::{EvConfig, HemsConfig, TariffConfig};
use crate::error::EvaluatorError;
use crate::markov::{DayType, SLOTS_PER_DAY};
use crate::monte_carlo::weekday::{DAYS_PER_WEEK, Weekday};

/// Slot duration (hours).
const DT_HOURS: f64 = 24.0 / SLOTS_PER_DAY as f64;

/// Everything needed to price one week.
#[derive(Debug, Clone, Copy)]
pub struct WeekInputs<'a> {
    /// Usage-intensity draw in `[0, 1)`.
    pub usage: f64,
    /// Year-long demand trace (kW per slot).
    pub demand_kw: &'a [f64],
    /// Year-long PV trace (kW per slot).
    pub pv_kw: &'a [f64],
    pub weekday_availability: &'a [f64],
    pub weekend_availability: &'a [f64],
    /// Maximum stored energy per slot (kWh).
    pub max_charge: &'a [f64],
    pub weekday_min_charge: &'a [f64],
    pub weekend_min_charge: &'a [f64],
}

impl WeekInputs<'_> {
    /// Checks that every per-day trace has one value per slot.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluatorError::TraceLength`] for the first trace of the wrong length.
    pub fn check_day_traces(&self) -> Result<(), EvaluatorError> {
        let traces: [(&'static str, &[f64]); 5] = [
            ("weekday availability", self.weekday_availability),
            ("weekend availability", self.weekend_availability),
            ("max charge", self.max_charge),
            ("weekday min charge", self.weekday_min_charge),
            ("weekend min charge", self.weekend_min_charge),
        ];
        for (name, trace) in traces {
            if trace.len() != SLOTS_PER_DAY {
                return Err(EvaluatorError::TraceLength {
                    name,
                    expected: SLOTS_PER_DAY,
                    found: trace.len(),
                });
            }
        }
        Ok(())
    }

    /// Availability and minimum-charge traces that apply on `day`.
    pub fn traces_for(&self, day: Weekday) -> (&[f64], &[f64]) {
        match day.day_type() {
            DayType::Weekday => (self.weekday_availability, self.weekday_min_charge),
            DayType::Weekend => (self.weekend_availability, self.weekend_min_charge),
        }
    }
}

/// Prices one week of operation, Monday first.
pub trait WeeklyCostEvaluator {
    /// Returns the cost of each day of the week.
    ///
    /// # Errors
    ///
    /// Returns an `EvaluatorError` when the week cannot be priced. Callers
    /// must not substitute a default cost.
    fn evaluate_week(
        &mut self,
        week: &WeekInputs<'_>,
    ) -> Result<[f64; DAYS_PER_WEEK], EvaluatorError>;
}

/// Time-of-use tariff with a single peak window.
#[derive(Debug, Clone, PartialEq)]
pub struct TimeOfUseTariff {
    pub import_price: f64,
    pub peak_price: f64,
    pub peak_start_slot: usize,
    pub peak_end_slot: usize,
    pub export_price: f64,
}

impl TimeOfUseTariff {
    /// Import price per kWh in `slot`.
    pub fn import_price_at(&self, slot: usize) -> f64 {
        if (self.peak_start_slot..self.peak_end_slot).contains(&slot) {
            self.peak_price
        } else {
            self.import_price
        }
    }
}

impl From<&TariffConfig> for TimeOfUseTariff {
    fn from(t: &TariffConfig) -> Self {
        Self {
            import_price: t.import_price,
            peak_price: t.peak_price,
            peak_start_slot: t.peak_start_slot,
            peak_end_slot: t.peak_end_slot,
            export_price: t.export_price,
        }
    }
}

/// Greedy EV self-consumption dispatch.
///
/// Per slot, within the availability limit:
/// 1. PV surplus charges the EV up to the max-charge trace, the rest is exported.
/// 2. A deficit is served from the EV down to the min-charge floor, then imported.
/// 3. Below the floor, the EV is topped up from the grid.
///
/// Travel energy `usage * travel_fraction * max_charge_level` is split evenly
/// between the departure and return slots; any shortfall on a leg is bought at
/// that slot's import price.
#[derive(Debug, Clone)]
pub struct RuleBasedEvaluator {
    ev: EvConfig,
    tariff: TimeOfUseTariff,
    start_day: usize,
}

impl RuleBasedEvaluator {
    pub fn new(ev: EvConfig, tariff: TimeOfUseTariff, start_day: usize) -> Self {
        Self {
            ev,
            tariff,
            start_day,
        }
    }

    pub fn from_config(config: &HemsConfig) -> Self {
        Self::new(
            config.ev.clone(),
            TimeOfUseTariff::from(&config.tariff),
            config.monte_carlo.start_day,
        )
    }

    fn day_cost(
        &self,
        usage: f64,
        demand: &[f64],
        pv: &[f64],
        availability: &[f64],
        max_charge: &[f64],
        min_charge: &[f64],
    ) -> f64 {
        let eta = self.ev.efficiency;
        let leg_kwh = usage * self.ev.travel_fraction * self.ev.max_charge_level / 2.0;
        let mut soc = self.ev.initial_charge;
        let mut cost = 0.0;

        for slot in 0..SLOTS_PER_DAY {
            let price = self.tariff.import_price_at(slot);

            if slot == self.ev.departure_slot || slot == self.ev.return_slot {
                let shortfall = (leg_kwh - soc).max(0.0);
                soc = (soc - leg_kwh).max(0.0);
                cost += shortfall * price;
            }

            let mut limit = availability[slot].max(0.0);
            let cap = max_charge[slot];
            let floor = min_charge[slot];
            let net_kw = demand[slot] - pv[slot];
            let mut import_kw = 0.0;
            let mut export_kw = 0.0;

            if net_kw < 0.0 {
                let headroom_kw = ((cap - soc) / (eta * DT_HOURS)).max(0.0);
                let charge_kw = (-net_kw).min(limit).min(headroom_kw);
                soc += charge_kw * eta * DT_HOURS;
                limit -= charge_kw;
                export_kw = -net_kw - charge_kw;
            } else {
                let usable_kw = ((soc - floor).max(0.0) * eta / DT_HOURS).max(0.0);
                let discharge_kw = net_kw.min(limit).min(usable_kw);
                soc -= discharge_kw / eta * DT_HOURS;
                limit -= discharge_kw;
                import_kw = net_kw - discharge_kw;
            }

            if soc < floor && limit > 0.0 {
                let top_up_kw = ((floor.min(cap) - soc) / (eta * DT_HOURS))
                    .max(0.0)
                    .min(limit);
                soc += top_up_kw * eta * DT_HOURS;
                import_kw += top_up_kw;
            }

            cost += import_kw * DT_HOURS * price - export_kw * DT_HOURS * self.tariff.export_price;
        }

        cost
    }
}

impl WeeklyCostEvaluator for RuleBasedEvaluator {
    fn evaluate_week(
        &mut self,
        week: &WeekInputs<'_>,
    ) -> Result<[f64; DAYS_PER_WEEK], EvaluatorError> {
        week.check_day_traces()?;

        let first = self.start_day * SLOTS_PER_DAY;
        let needed = first + DAYS_PER_WEEK * SLOTS_PER_DAY;
        let available = week.demand_kw.len().min(week.pv_kw.len());
        if available < needed {
            return Err(EvaluatorError::YearTooShort { needed, available });
        }

        let mut costs = [0.0; DAYS_PER_WEEK];
        for (i, day) in Weekday::ALL.into_iter().enumerate() {
            let start = first + i * SLOTS_PER_DAY;
            let end = start + SLOTS_PER_DAY;
            let (availability, min_charge) = week.traces_for(day);
            costs[i] = self.day_cost(
                week.usage,
                &week.demand_kw[start..end],
                &week.pv_kw[start..end],
                availability,
                week.max_charge,
                min_charge,
            );
        }
        Ok(costs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEEK: usize = DAYS_PER_WEEK * SLOTS_PER_DAY;

    fn evaluator(tariff: TimeOfUseTariff) -> RuleBasedEvaluator {
        RuleBasedEvaluator::new(
            EvConfig {
                efficiency: 1.0,
                ..EvConfig::default()
            },
            tariff,
            0,
        )
    }

    fn flat(price: f64) -> TimeOfUseTariff {
        TimeOfUseTariff {
            import_price: price,
            peak_price: price,
            peak_start_slot: 0,
            peak_end_slot: 0,
            export_price: 0.0,
        }
    }

    struct Traces {
        demand: Vec<f64>,
        pv: Vec<f64>,
        avail: Vec<f64>,
        max: Vec<f64>,
        min: Vec<f64>,
    }

    impl Traces {
        fn new(demand_kw: f64, pv_kw: f64, avail_kw: f64) -> Self {
            Self {
                demand: vec![demand_kw; WEEK],
                pv: vec![pv_kw; WEEK],
                avail: vec![avail_kw; SLOTS_PER_DAY],
                max: vec![40.0; SLOTS_PER_DAY],
                min: vec![1.0; SLOTS_PER_DAY],
            }
        }

        fn inputs(&self, usage: f64) -> WeekInputs<'_> {
            WeekInputs {
                usage,
                demand_kw: &self.demand,
                pv_kw: &self.pv,
                weekday_availability: &self.avail,
                weekend_availability: &self.avail,
                max_charge: &self.max,
                weekday_min_charge: &self.min,
                weekend_min_charge: &self.min,
            }
        }
    }

    #[test]
    fn unavailable_ev_pays_full_net_demand() {
        let t = Traces::new(2.0, 0.5, 0.0);
        let costs = evaluator(flat(0.4)).evaluate_week(&t.inputs(0.0)).unwrap();
        // 1.5 kW * 24 h * 0.4
        for c in costs {
            assert!((c - 14.4).abs() < 1e-9, "cost {c}");
        }
    }

    #[test]
    fn surplus_is_free_without_export_credit() {
        let t = Traces::new(0.5, 3.0, 0.0);
        let costs = evaluator(flat(0.4)).evaluate_week(&t.inputs(0.0)).unwrap();
        assert!(costs.iter().all(|&c| c == 0.0));
    }

    #[test]
    fn export_credit_lowers_cost() {
        let t = Traces::new(0.5, 3.0, 0.0);
        let mut tariff = flat(0.4);
        tariff.export_price = 0.1;
        let costs = evaluator(tariff).evaluate_week(&t.inputs(0.0)).unwrap();
        // -2.5 kW * 24 h * 0.1
        assert!((costs[0] + 6.0).abs() < 1e-9);
    }

    #[test]
    fn higher_usage_costs_more() {
        let t = Traces::new(1.0, 0.0, 0.0);
        let mut ev = evaluator(flat(0.4));
        let low = ev.evaluate_week(&t.inputs(0.1)).unwrap();
        let high = ev.evaluate_week(&t.inputs(0.9)).unwrap();
        assert!(high[0] > low[0]);
        // trip = 0.9 * 0.2 * 40 = 7.2 kWh bought at 0.4
        assert!((high[0] - low[0] - (7.2 - 0.8) * 0.4).abs() < 1e-9);
    }

    #[test]
    fn trip_legs_priced_at_departure_and_return() {
        let t = Traces::new(0.0, 0.0, 0.0);
        let tariff = TimeOfUseTariff {
            import_price: 0.2,
            peak_price: 0.5,
            peak_start_slot: 32,
            peak_end_slot: 42,
            export_price: 0.0,
        };
        let costs = evaluator(tariff).evaluate_week(&t.inputs(0.5)).unwrap();
        // 4 kWh trip: 2 kWh at slot 8 (0.2) and 2 kWh at slot 32 (0.5).
        assert!((costs[0] - (2.0 * 0.2 + 2.0 * 0.5)).abs() < 1e-9, "cost {}", costs[0]);
    }

    #[test]
    fn stored_energy_covers_outbound_leg_first() {
        let t = Traces::new(0.0, 0.0, 0.0);
        let mut ev = RuleBasedEvaluator::new(
            EvConfig {
                efficiency: 1.0,
                initial_charge: 3.0,
                ..EvConfig::default()
            },
            flat(1.0),
            0,
        );
        let costs = ev.evaluate_week(&t.inputs(0.5)).unwrap();
        // Outbound 2 kWh from storage, return leg takes the last 1 kWh and buys 1 kWh.
        assert!((costs[0] - 1.0).abs() < 1e-9, "cost {}", costs[0]);
    }

    #[test]
    fn connected_ev_is_topped_up_to_floor() {
        let mut t = Traces::new(0.0, 0.0, 6.6);
        t.min = vec![8.0; SLOTS_PER_DAY];
        let costs = evaluator(flat(1.0)).evaluate_week(&t.inputs(0.0)).unwrap();
        // Starts empty and is lifted to the 8 kWh floor once.
        assert!((costs[0] - 8.0).abs() < 1e-9, "cost {}", costs[0]);
    }

    #[test]
    fn peak_window_pricing() {
        let tariff = TimeOfUseTariff {
            import_price: 0.2,
            peak_price: 0.5,
            peak_start_slot: 32,
            peak_end_slot: 42,
            export_price: 0.0,
        };
        assert_eq!(tariff.import_price_at(31), 0.2);
        assert_eq!(tariff.import_price_at(32), 0.5);
        assert_eq!(tariff.import_price_at(41), 0.5);
        assert_eq!(tariff.import_price_at(42), 0.2);
    }

    #[test]
    fn rejects_short_year() {
        let mut t = Traces::new(1.0, 0.0, 0.0);
        t.demand.truncate(WEEK - 1);
        let err = evaluator(flat(0.4)).evaluate_week(&t.inputs(0.0)).unwrap_err();
        assert!(matches!(err, EvaluatorError::YearTooShort { .. }));
    }

    #[test]
    fn rejects_wrong_trace_length() {
        let mut t = Traces::new(1.0, 0.0, 0.0);
        t.max.pop();
        let err = evaluator(flat(0.4)).evaluate_week(&t.inputs(0.0)).unwrap_err();
        assert!(matches!(
            err,
            EvaluatorError::TraceLength {
                name: "max charge",
                ..
            }
        ));
    }
}
