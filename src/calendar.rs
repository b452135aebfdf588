//! Fixed calendar vocabularies for the dataset's coverage window.
//!
//! The dataset spans April through September 2014, so [`Month`] is a
//! closed six-value vocabulary rather than the full calendar year. Both
//! vocabularies carry a canonical ordering, defined once here, that every
//! month or weekday axis downstream iterates in. Values that never occur
//! in the data are still legal and simply show up as zero-count buckets.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

/// A month inside the dataset's coverage window, in display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Month {
    April,
    May,
    June,
    July,
    August,
    September,
}

/// A day-of-week name, Monday first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

/// A month name outside the six covered months.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized month name: {0:?}")]
pub struct ParseMonthError(pub String);

/// A weekday name that is not one of the seven English day names.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized weekday name: {0:?}")]
pub struct ParseWeekdayError(pub String);

impl Month {
    /// Every month in canonical order.
    pub const ALL: [Month; 6] = [
        Month::April,
        Month::May,
        Month::June,
        Month::July,
        Month::August,
        Month::September,
    ];

    /// The month's English name.
    pub fn as_str(self) -> &'static str {
        match self {
            Month::April => "April",
            Month::May => "May",
            Month::June => "June",
            Month::July => "July",
            Month::August => "August",
            Month::September => "September",
        }
    }

    /// Maps a calendar month number (1-12) into the vocabulary.
    ///
    /// Returns `None` for months outside the April-September window.
    pub fn from_month_number(month: u32) -> Option<Month> {
        match month {
            4 => Some(Month::April),
            5 => Some(Month::May),
            6 => Some(Month::June),
            7 => Some(Month::July),
            8 => Some(Month::August),
            9 => Some(Month::September),
            _ => None,
        }
    }
}

impl Weekday {
    /// Every weekday in canonical order.
    pub const ALL: [Weekday; 7] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
        Weekday::Saturday,
        Weekday::Sunday,
    ];

    /// The weekday's English name.
    pub fn as_str(self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
            Weekday::Saturday => "Saturday",
            Weekday::Sunday => "Sunday",
        }
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Mon => Weekday::Monday,
            chrono::Weekday::Tue => Weekday::Tuesday,
            chrono::Weekday::Wed => Weekday::Wednesday,
            chrono::Weekday::Thu => Weekday::Thursday,
            chrono::Weekday::Fri => Weekday::Friday,
            chrono::Weekday::Sat => Weekday::Saturday,
            chrono::Weekday::Sun => Weekday::Sunday,
        }
    }
}

impl fmt::Display for Month {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Month {
    type Err = ParseMonthError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Month::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseMonthError(s.to_string()))
    }
}

impl FromStr for Weekday {
    type Err = ParseWeekdayError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Weekday::ALL
            .into_iter()
            .find(|d| d.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseWeekdayError(s.to_string()))
    }
}
