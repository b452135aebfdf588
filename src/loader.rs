//! CSV ingestion and normalization.
//!
//! Reads raw trip partitions, derives calendar features per record, and
//! applies seeded subsampling to produce the canonical [`TripTable`].
//! Loading performs the only blocking I/O in the pipeline and is meant to
//! run once per process (see [`crate::cache::TableCache`]).

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDateTime};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::LoadError;
use crate::model::{TripRecord, TripTable};

/// Exact textual format of the raw `Date/Time` column, e.g.
/// `4/1/2014 0:11:00`. The numeric specifiers accept unpadded fields, so
/// zero-padded variants of the same timestamps parse identically.
pub const DATE_TIME_FORMAT: &str = "%m/%d/%Y %H:%M:%S";

/// Columns every input partition must carry. Only these four are
/// consumed; extra columns are ignored.
pub const REQUIRED_COLUMNS: [&str; 4] = ["Date/Time", "Lat", "Lon", "Base"];

/// Raw CSV row as it appears in the source files.
#[derive(Debug, Deserialize)]
struct RawTrip {
    #[serde(rename = "Date/Time")]
    date_time: String,
    #[serde(rename = "Lat")]
    lat: f64,
    #[serde(rename = "Lon")]
    lon: f64,
    #[serde(rename = "Base")]
    base: String,
}

/// Knobs for a single load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadOptions {
    /// Fraction of concatenated rows to keep, in (0, 1]. Subsampling is
    /// a memory control; aggregates downstream are over whatever sample
    /// was drawn.
    pub sample_fraction: f64,
    /// RNG seed for the subsample. `None` draws one from OS entropy,
    /// trading reproducibility for independence between runs.
    pub seed: Option<u64>,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            sample_fraction: 1.0,
            seed: None,
        }
    }
}

/// Collects the `.csv` partitions under a data directory, sorted by path
/// so the same directory always yields the same source list.
///
/// # Errors
///
/// Returns [`LoadError::Scan`] if the directory cannot be read.
pub fn discover_sources(dir: &Path) -> Result<Vec<PathBuf>, LoadError> {
    let scan_err = |source| LoadError::Scan {
        path: dir.to_path_buf(),
        source,
    };

    let mut sources = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(scan_err)? {
        let path = entry.map_err(scan_err)?.path();
        if path.extension().and_then(|e| e.to_str()) == Some("csv") {
            sources.push(path);
        }
    }
    sources.sort();

    debug!(dir = %dir.display(), partitions = sources.len(), "Scanned data directory");
    Ok(sources)
}

/// Loads and concatenates all source partitions into one [`TripTable`].
///
/// Row order across files carries no meaning downstream. Zero sources
/// produce an empty table, not an error.
///
/// # Errors
///
/// The whole load fails on the first missing column, unreadable file,
/// malformed `Date/Time`, out-of-coverage month, or invalid sample
/// fraction; no partial table is returned.
pub fn load<P: AsRef<Path>>(sources: &[P], options: &LoadOptions) -> Result<TripTable, LoadError> {
    if !(options.sample_fraction > 0.0 && options.sample_fraction <= 1.0) {
        return Err(LoadError::SampleFraction(options.sample_fraction));
    }

    let mut records = Vec::new();
    for source in sources {
        let path = source.as_ref();
        let before = records.len();
        read_partition(path, &mut records)?;
        info!(
            path = %path.display(),
            rows = records.len() - before,
            "Partition loaded"
        );
    }

    let records = subsample(records, options);
    info!(
        rows = records.len(),
        sample_fraction = options.sample_fraction,
        "Trip table ready"
    );
    Ok(TripTable::new(records))
}

fn read_partition(path: &Path, records: &mut Vec<TripRecord>) -> Result<(), LoadError> {
    let read_err = |source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_path(path).map_err(read_err)?;

    let headers = reader.headers().map_err(read_err)?;
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(LoadError::MissingColumn {
                path: path.to_path_buf(),
                column,
            });
        }
    }

    for (index, result) in reader.deserialize().enumerate() {
        let raw: RawTrip = result.map_err(read_err)?;
        let row = index as u64 + 1;

        let timestamp = NaiveDateTime::parse_from_str(&raw.date_time, DATE_TIME_FORMAT).map_err(
            |source| LoadError::Timestamp {
                path: path.to_path_buf(),
                row,
                value: raw.date_time.clone(),
                source,
            },
        )?;

        let record = TripRecord::from_pickup(timestamp, raw.lat, raw.lon, raw.base).ok_or(
            LoadError::MonthOutOfCoverage {
                path: path.to_path_buf(),
                row,
                month: timestamp.month(),
            },
        )?;

        records.push(record);
    }

    Ok(())
}

/// Draws `round(len * fraction)` rows without replacement. A fraction of
/// 1.0 keeps every row in its original order.
fn subsample(records: Vec<TripRecord>, options: &LoadOptions) -> Vec<TripRecord> {
    if options.sample_fraction >= 1.0 {
        return records;
    }

    let target = (records.len() as f64 * options.sample_fraction).round() as usize;
    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };

    let mut keep = rand::seq::index::sample(&mut rng, records.len(), target).into_vec();
    keep.sort_unstable();
    debug!(total = records.len(), kept = target, "Subsampled trip rows");

    let mut wanted = keep.into_iter().peekable();
    records
        .into_iter()
        .enumerate()
        .filter(|(i, _)| {
            if wanted.peek() == Some(i) {
                wanted.next();
                true
            } else {
                false
            }
        })
        .map(|(_, record)| record)
        .collect()
}
