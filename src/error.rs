//! Error types for the trip pipeline.

use std::path::PathBuf;

use thiserror::Error;

/// Fatal ingestion failures.
///
/// A load either returns a complete table or one of these; no partial
/// table is ever produced. Every file-scoped variant names the offending
/// file so the caller can point at the bad partition.
#[derive(Debug, Error)]
pub enum LoadError {
    /// File unreadable or not parseable as delimited data.
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// A required column is absent from a file's header row.
    #[error("{path}: missing required column {column:?}")]
    MissingColumn { path: PathBuf, column: &'static str },

    /// A `Date/Time` value did not match the `M/D/YYYY H:MM:SS` format.
    /// The whole load aborts; rows are never silently skipped.
    #[error("{path} row {row}: invalid Date/Time {value:?}: {source}")]
    Timestamp {
        path: PathBuf,
        /// 1-based data row, header excluded.
        row: u64,
        value: String,
        #[source]
        source: chrono::ParseError,
    },

    /// A successfully parsed date falls outside the dataset's
    /// April-September coverage window.
    #[error("{path} row {row}: month {month} outside dataset coverage")]
    MonthOutOfCoverage { path: PathBuf, row: u64, month: u32 },

    /// Sample fraction outside the half-open interval (0, 1].
    #[error("sample fraction must be in (0, 1], got {0}")]
    SampleFraction(f64),

    /// Data directory could not be scanned for partitions.
    #[error("failed to scan {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Metrics were requested over a view with zero rows, where the modal
/// hour and base are undefined. Callers recover by showing a "no data"
/// state.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("no rides match the current selection")]
pub struct EmptyViewError;
