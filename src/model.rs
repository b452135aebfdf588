//! Core data model: one trip record and the immutable table of them.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::calendar::{Month, Weekday};

/// One historical ride-hailing pickup.
///
/// The calendar fields are derived from `timestamp` once at construction
/// and never change afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripRecord {
    /// Pickup time in the record's own local time. No time-zone
    /// conversion is applied anywhere in the pipeline.
    pub timestamp: NaiveDateTime,
    pub latitude: f64,
    pub longitude: f64,
    /// Dispatch base code, e.g. `B02512`. Values are discovered from the
    /// data, not a fixed enum.
    pub base: String,
    /// Day of month, 1-31.
    pub day: u32,
    pub month: Month,
    pub day_of_week: Weekday,
    /// Hour of day, 0-23.
    pub hour: u32,
}

impl TripRecord {
    /// Builds a record with its calendar fields derived from the pickup
    /// timestamp.
    ///
    /// Returns `None` when the timestamp's month falls outside the
    /// dataset's April-September coverage.
    pub fn from_pickup(
        timestamp: NaiveDateTime,
        latitude: f64,
        longitude: f64,
        base: String,
    ) -> Option<Self> {
        let month = Month::from_month_number(timestamp.month())?;
        Some(Self {
            day: timestamp.day(),
            month,
            day_of_week: Weekday::from(timestamp.weekday()),
            hour: timestamp.hour(),
            timestamp,
            latitude,
            longitude,
            base,
        })
    }
}

/// The canonical in-memory trip table.
///
/// Built once by the loader and read-only afterwards; filtering always
/// produces a new collection rather than mutating the table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TripTable {
    records: Vec<TripRecord>,
}

impl TripTable {
    pub(crate) fn new(records: Vec<TripRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[TripRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Distinct months occurring in the table, in vocabulary order.
    pub fn months_present(&self) -> Vec<Month> {
        self.records
            .iter()
            .map(|r| r.month)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct base codes, lexicographically sorted.
    pub fn bases(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.base.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Smallest and largest hour present, or `None` on an empty table.
    /// A range widget binds its endpoints to these.
    pub fn hour_bounds(&self) -> Option<(u32, u32)> {
        let min = self.records.iter().map(|r| r.hour).min()?;
        let max = self.records.iter().map(|r| r.hour).max()?;
        Some((min, max))
    }
}
