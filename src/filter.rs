//! Selection filtering over the canonical trip table.

use std::collections::BTreeSet;

use crate::calendar::Month;
use crate::model::{TripRecord, TripTable};

/// The user's current selection: months, dispatch bases, and an
/// inclusive hour-of-day range. Supplied fresh per interaction, never
/// persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterSpec {
    pub months: BTreeSet<Month>,
    pub bases: BTreeSet<String>,
    /// `(min, max)` hours, both inclusive. An inverted range matches
    /// nothing; selection widgets pass through such states transiently.
    pub hour_range: (u32, u32),
}

impl FilterSpec {
    /// A spec selecting every month and base present in the table over
    /// the full day, the default state of a dashboard's controls.
    pub fn matching_all(table: &TripTable) -> Self {
        Self {
            months: table.months_present().into_iter().collect(),
            bases: table.bases().into_iter().collect(),
            hour_range: (0, 23),
        }
    }

    /// Conjunction of the three predicates: month membership, base
    /// membership, and hour-range inclusion.
    pub fn matches(&self, record: &TripRecord) -> bool {
        let (min_hour, max_hour) = self.hour_range;
        self.months.contains(&record.month)
            && self.bases.contains(&record.base)
            && record.hour >= min_hour
            && record.hour <= max_hour
    }
}

/// The subset of trips matching a [`FilterSpec`]. Owns its rows; it is
/// recomputed per selection change and never aliases the table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilteredView {
    records: Vec<TripRecord>,
}

impl FilteredView {
    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Returns exactly the records satisfying `spec`, in input order.
///
/// A pure function of its arguments: an unsatisfiable spec (no months,
/// no bases, or an inverted hour range) yields an empty view rather than
/// an error, and no matching record is ever dropped.
pub fn filter(records: &[TripRecord], spec: &FilterSpec) -> FilteredView {
    FilteredView {
        records: records
            .iter()
            .filter(|r| spec.matches(r))
            .cloned()
            .collect(),
    }
}
