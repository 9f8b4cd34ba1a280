use crate::entities::{ImportRecord, WeightEntry, round_weight};
use std::collections::BTreeMap;

/// Result of merging an incoming batch into the current collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Merged {
    pub entries: Vec<WeightEntry>,
    pub accepted: usize,
    pub skipped: usize,
}

/// Combines `current` with `incoming`.
///
/// Incoming records overwrite current ones on the same date, and within the
/// batch a later record overwrites an earlier one. Records without a
/// non-empty date or a finite weight are skipped. Every weight in the
/// result is rounded to two decimals and the result is ordered by date.
pub fn merge<'a, I>(current: &[WeightEntry], incoming: I) -> Merged
where
    I: IntoIterator<Item = &'a ImportRecord>,
{
    let mut by_date: BTreeMap<String, f64> = current
        .iter()
        .map(|entry| (entry.date.clone(), entry.weight))
        .collect();

    let mut accepted = 0;
    let mut skipped = 0;
    for record in incoming {
        match record.validated() {
            Some(entry) => {
                by_date.insert(entry.date, entry.weight);
                accepted += 1;
            }
            None => skipped += 1,
        }
    }

    let entries = by_date
        .into_iter()
        .map(|(date, weight)| WeightEntry::new(date, round_weight(weight)))
        .collect();

    Merged {
        entries,
        accepted,
        skipped,
    }
}

/// Ascending by date. ISO dates order correctly as plain strings.
pub fn sort_by_date(entries: &mut [WeightEntry]) {
    entries.sort_by(|a, b| a.date.cmp(&b.date));
}
