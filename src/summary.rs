//! Summary metrics and chart distributions over a filtered view.
//!
//! Everything here is a pure count over the view's rows, recomputed per
//! selection change. Mode computations are explicit frequency maps with
//! a deterministic tie-break: the smallest key reaching the maximum
//! count wins.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::calendar::{Month, Weekday};
use crate::error::EmptyViewError;
use crate::filter::FilteredView;

/// Headline metrics for the current selection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryMetrics {
    pub total_rides: usize,
    /// Count of distinct day-of-month values (1-31), not distinct
    /// calendar dates: rides on April 3 and May 3 contribute one day.
    /// This matches the metric the dashboard has always displayed.
    pub unique_days: usize,
    /// Modal pickup hour; ties resolve to the lowest hour.
    pub peak_hour: u32,
    /// Modal dispatch base; ties resolve to the lexicographically least
    /// base code.
    pub most_active_base: String,
}

/// Computes the headline metrics for a view.
///
/// # Errors
///
/// Returns [`EmptyViewError`] on a view with zero rows, where the modal
/// hour and base are undefined.
pub fn summarize(view: &FilteredView) -> Result<SummaryMetrics, EmptyViewError> {
    let records = view.records();
    if records.is_empty() {
        return Err(EmptyViewError);
    }

    let unique_days = records
        .iter()
        .map(|r| r.day)
        .collect::<BTreeSet<_>>()
        .len();

    let peak_hour = mode(records.iter().map(|r| r.hour)).ok_or(EmptyViewError)?;
    let most_active_base =
        mode(records.iter().map(|r| r.base.clone())).ok_or(EmptyViewError)?;

    Ok(SummaryMetrics {
        total_rides: records.len(),
        unique_days,
        peak_hour,
        most_active_base,
    })
}

/// Ride counts per hour of day, zero-filled across all 24 buckets.
pub fn rides_by_hour(view: &FilteredView) -> Vec<(u32, usize)> {
    let counts = frequency(view.records().iter().map(|r| r.hour));
    (0..24)
        .map(|hour| (hour, counts.get(&hour).copied().unwrap_or(0)))
        .collect()
}

/// Ride counts per day of month, zero-filled across 1-31.
pub fn rides_by_day(view: &FilteredView) -> Vec<(u32, usize)> {
    let counts = frequency(view.records().iter().map(|r| r.day));
    (1..=31)
        .map(|day| (day, counts.get(&day).copied().unwrap_or(0)))
        .collect()
}

/// Ride counts per month over the full vocabulary, in canonical order.
/// Months absent from the view appear with a zero count.
pub fn rides_by_month(view: &FilteredView) -> Vec<(Month, usize)> {
    let counts = frequency(view.records().iter().map(|r| r.month));
    Month::ALL
        .into_iter()
        .map(|month| (month, counts.get(&month).copied().unwrap_or(0)))
        .collect()
}

/// Ride counts per weekday over the full vocabulary, Monday first.
pub fn rides_by_weekday(view: &FilteredView) -> Vec<(Weekday, usize)> {
    let counts = frequency(view.records().iter().map(|r| r.day_of_week));
    Weekday::ALL
        .into_iter()
        .map(|day| (day, counts.get(&day).copied().unwrap_or(0)))
        .collect()
}

/// Ride counts per dispatch base, lexicographically ordered. Only bases
/// occurring in the view appear; the base vocabulary is discovered from
/// the data, not fixed.
pub fn rides_by_base(view: &FilteredView) -> Vec<(String, usize)> {
    frequency(view.records().iter().map(|r| r.base.clone()))
        .into_iter()
        .collect()
}

fn frequency<K: Ord>(keys: impl Iterator<Item = K>) -> BTreeMap<K, usize> {
    let mut counts = BTreeMap::new();
    for key in keys {
        *counts.entry(key).or_insert(0) += 1;
    }
    counts
}

/// Highest-frequency key. The map iterates in ascending key order and a
/// later key only wins on a strictly greater count, so ties resolve to
/// the smallest key.
fn mode<K: Ord>(keys: impl Iterator<Item = K>) -> Option<K> {
    let mut best: Option<(K, usize)> = None;
    for (key, count) in frequency(keys) {
        match &best {
            Some((_, best_count)) if *best_count >= count => {}
            _ => best = Some((key, count)),
        }
    }
    best.map(|(key, _)| key)
}
