use crate::entities::{FilterPeriod, WeightEntry};
use chrono::NaiveDate;

/// Entries on or after the start of `period`. Entries whose date does not
/// parse are only kept for `FilterPeriod::All`.
pub fn filter_by_period(
    entries: &[WeightEntry],
    period: FilterPeriod,
    today: NaiveDate,
) -> Vec<WeightEntry> {
    let Some(start) = period.start_date(today) else {
        return entries.to_vec();
    };

    entries
        .iter()
        .filter(|entry| entry.calendar_date().is_some_and(|date| date >= start))
        .cloned()
        .collect()
}

/// Last weight minus first weight, when there are at least two entries.
pub fn weight_change(entries: &[WeightEntry]) -> Option<f64> {
    match entries {
        [first, .., last] => Some(last.weight - first.weight),
        _ => None,
    }
}

/// Least-squares line of weight against days since `origin`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearTrend {
    pub origin: NaiveDate,
    /// kg per day
    pub slope: f64,
    /// kg at `origin`
    pub intercept: f64,
}

impl LinearTrend {
    /// Fits the entries with a parseable date. Needs at least two distinct
    /// dates.
    pub fn fit(entries: &[WeightEntry]) -> Option<Self> {
        let points: Vec<(NaiveDate, f64)> = entries
            .iter()
            .filter_map(|entry| entry.calendar_date().map(|date| (date, entry.weight)))
            .collect();

        let origin = points.iter().map(|(date, _)| *date).min()?;
        let xy: Vec<(f64, f64)> = points
            .iter()
            .map(|(date, weight)| ((*date - origin).num_days() as f64, *weight))
            .collect();

        let n = xy.len() as f64;
        let mean_x = xy.iter().map(|(x, _)| x).sum::<f64>() / n;
        let mean_y = xy.iter().map(|(_, y)| y).sum::<f64>() / n;

        let sxx: f64 = xy.iter().map(|(x, _)| (x - mean_x).powi(2)).sum();
        if sxx == 0.0 {
            return None;
        }
        let sxy: f64 = xy.iter().map(|(x, y)| (x - mean_x) * (y - mean_y)).sum();

        let slope = sxy / sxx;
        Some(Self {
            origin,
            slope,
            intercept: mean_y - slope * mean_x,
        })
    }

    pub fn forecast(&self, date: NaiveDate) -> f64 {
        let days = (date - self.origin).num_days() as f64;
        self.intercept + self.slope * days
    }

    pub fn weekly_rate(&self) -> f64 {
        self.slope * 7.0
    }
}
