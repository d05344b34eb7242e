//! Empirical daily-cost distributions.

use std::fmt;

use super::weekday::{DAYS_PER_WEEK, Weekday};

/// One daily cost observed during the Monte Carlo run.
#[derive(Debug, Clone, PartialEq)]
pub struct CostSample {
    pub dataset: String,
    pub availability_iteration: usize,
    pub usage_iteration: usize,
    /// Usage-intensity draw that produced this cost.
    pub usage: f64,
    pub weekday: Weekday,
    pub cost: f64,
}

/// All samples collected for one weekday.
#[derive(Debug, Clone, Default)]
pub struct CostDistribution {
    samples: Vec<CostSample>,
}

impl CostDistribution {
    pub fn push(&mut self, sample: CostSample) {
        self.samples.push(sample);
    }

    pub fn samples(&self) -> &[CostSample] {
        &self.samples
    }

    pub fn costs(&self) -> impl Iterator<Item = f64> + '_ {
        self.samples.iter().map(|s| s.cost)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn mean(&self) -> Option<f64> {
        if self.is_empty() {
            return None;
        }
        Some(self.costs().sum::<f64>() / self.len() as f64)
    }

    /// Population standard deviation.
    pub fn std_dev(&self) -> Option<f64> {
        let mean = self.mean()?;
        let var = self.costs().map(|c| (c - mean).powi(2)).sum::<f64>() / self.len() as f64;
        Some(var.sqrt())
    }

    pub fn min(&self) -> Option<f64> {
        self.costs().reduce(f64::min)
    }

    pub fn max(&self) -> Option<f64> {
        self.costs().reduce(f64::max)
    }

    /// Equal-width histogram over `[min, max]`.
    ///
    /// Returns `(lower_edge, count)` per bin. The last bin includes `max`.
    /// When every sample has the same cost, all samples land in the first bin.
    pub fn histogram(&self, bins: usize) -> Vec<(f64, usize)> {
        let (Some(lo), Some(hi)) = (self.min(), self.max()) else {
            return Vec::new();
        };
        if bins == 0 {
            return Vec::new();
        }

        let width = (hi - lo) / bins as f64;
        let mut counts = vec![0_usize; bins];
        for cost in self.costs() {
            let idx = if width > 0.0 {
                (((cost - lo) / width) as usize).min(bins - 1)
            } else {
                0
            };
            counts[idx] += 1;
        }

        counts
            .into_iter()
            .enumerate()
            .map(|(i, n)| (lo + i as f64 * width, n))
            .collect()
    }
}

/// Per-weekday cost distributions.
#[derive(Debug, Clone, Default)]
pub struct CostsByDay {
    days: [CostDistribution; DAYS_PER_WEEK],
}

impl CostsByDay {
    pub fn record(&mut self, sample: CostSample) {
        self.days[sample.weekday.index()].push(sample);
    }

    pub fn day(&self, weekday: Weekday) -> &CostDistribution {
        &self.days[weekday.index()]
    }

    /// Total number of samples across the week.
    pub fn total(&self) -> usize {
        self.days.iter().map(CostDistribution::len).sum()
    }

    /// All samples, Monday first.
    pub fn iter(&self) -> impl Iterator<Item = &CostSample> {
        self.days.iter().flat_map(|d| d.samples().iter())
    }

    /// Per-weekday histogram table with `bins` bins, for display.
    pub fn histograms(&self, bins: usize) -> HistogramTable<'_> {
        HistogramTable { costs: self, bins }
    }
}

/// Longest bar drawn in a [`HistogramTable`].
const BAR_WIDTH: usize = 30;

/// Text rendering of the per-weekday cost histograms.
///
/// Bars are scaled to the fullest bin of each day. Days without samples are
/// listed with a dash.
pub struct HistogramTable<'a> {
    costs: &'a CostsByDay,
    bins: usize,
}

impl fmt::Display for HistogramTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Cost histograms ({} bins)", self.bins)?;
        for day in Weekday::ALL {
            let dist = self.costs.day(day);
            let hist = dist.histogram(self.bins);
            let (Some(max), Some(peak)) = (dist.max(), hist.iter().map(|&(_, n)| n).max()) else {
                writeln!(f, "{day}: -")?;
                continue;
            };
            writeln!(f, "{day}:")?;
            for (i, &(lower, count)) in hist.iter().enumerate() {
                let upper = hist.get(i + 1).map_or(max, |&(next, _)| next);
                let bar = "#".repeat(count * BAR_WIDTH / peak.max(1));
                writeln!(f, "  {lower:>9.3} .. {upper:>9.3} {count:>6} {bar}")?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for CostsByDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<10} {:>7} {:>9} {:>9} {:>9} {:>9}",
            "Day", "Samples", "Mean", "StdDev", "Min", "Max"
        )?;
        for day in Weekday::ALL {
            let d = self.day(day);
            match (d.mean(), d.std_dev(), d.min(), d.max()) {
                (Some(mean), Some(sd), Some(min), Some(max)) => writeln!(
                    f,
                    "{:<10} {:>7} {:>9.3} {:>9.3} {:>9.3} {:>9.3}",
                    day.name(),
                    d.len(),
                    mean,
                    sd,
                    min,
                    max
                )?,
                _ => writeln!(f, "{:<10} {:>7} {:>9}", day.name(), 0, "-")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(weekday: Weekday, cost: f64) -> CostSample {
        CostSample {
            dataset: "h".to_string(),
            availability_iteration: 0,
            usage_iteration: 0,
            usage: 0.5,
            weekday,
            cost,
        }
    }

    fn dist(costs: &[f64]) -> CostDistribution {
        let mut d = CostDistribution::default();
        for &c in costs {
            d.push(sample(Weekday::Monday, c));
        }
        d
    }

    #[test]
    fn summary_statistics() {
        let d = dist(&[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(d.mean(), Some(2.5));
        assert_eq!(d.min(), Some(1.0));
        assert_eq!(d.max(), Some(4.0));
        assert!((d.std_dev().unwrap() - 1.25_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn empty_distribution_has_no_statistics() {
        let d = CostDistribution::default();
        assert_eq!(d.mean(), None);
        assert_eq!(d.std_dev(), None);
        assert!(d.histogram(4).is_empty());
    }

    #[test]
    fn histogram_counts_every_sample() {
        let d = dist(&[0.0, 0.1, 0.5, 0.9, 1.0]);
        let h = d.histogram(2);
        assert_eq!(h.len(), 2);
        assert_eq!(h[0], (0.0, 2));
        assert_eq!(h[1], (0.5, 3));
    }

    #[test]
    fn histogram_of_constant_costs() {
        let d = dist(&[3.0, 3.0, 3.0]);
        let h = d.histogram(5);
        assert_eq!(h[0].1, 3);
        assert_eq!(h.iter().map(|(_, n)| n).sum::<usize>(), 3);
    }

    fn histogram_row(lower: f64, upper: f64, count: usize, bar: usize) -> String {
        format!("  {lower:>9.3} .. {upper:>9.3} {count:>6} {}\n", "#".repeat(bar))
    }

    #[test]
    fn histogram_table_lists_every_bin() {
        let mut by_day = CostsByDay::default();
        for c in [1.0, 1.5, 2.0, 4.0] {
            by_day.record(sample(Weekday::Tuesday, c));
        }
        let text = by_day.histograms(3).to_string();

        assert!(text.starts_with("Cost histograms (3 bins)"));
        assert!(text.contains("Monday: -"));
        assert!(text.contains("Tuesday:\n"));
        // Bins [1, 2), [2, 3), [3, 4]; the fullest bin gets the full bar.
        assert!(text.contains(&histogram_row(1.0, 2.0, 2, 30)));
        assert!(text.contains(&histogram_row(2.0, 3.0, 1, 15)));
        assert!(text.contains(&histogram_row(3.0, 4.0, 1, 15)));
    }

    #[test]
    fn costs_by_day_routes_samples() {
        let mut by_day = CostsByDay::default();
        by_day.record(sample(Weekday::Monday, 1.0));
        by_day.record(sample(Weekday::Sunday, 2.0));
        by_day.record(sample(Weekday::Sunday, 4.0));
        assert_eq!(by_day.day(Weekday::Monday).len(), 1);
        assert_eq!(by_day.day(Weekday::Sunday).mean(), Some(3.0));
        assert_eq!(by_day.total(), 3);
        assert!(format!("{by_day}").contains("Sunday"));
    }
}
