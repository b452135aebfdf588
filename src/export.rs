//! Filtered-extract export back to the input CSV shape.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::Result;
use csv::WriterBuilder;
use serde::Serialize;
use tracing::info;

use crate::filter::FilteredView;

/// Output timestamp format, unpadded like the raw files, so an exported
/// extract re-ingests through [`crate::loader::load`] with identical
/// derived fields.
const EXPORT_DATE_TIME_FORMAT: &str = "%-m/%-d/%Y %-H:%M:%S";

/// One output row: the input columns first, then the derived columns the
/// dashboard displays.
#[derive(Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Date/Time")]
    date_time: String,
    #[serde(rename = "Lat")]
    lat: f64,
    #[serde(rename = "Lon")]
    lon: f64,
    #[serde(rename = "Base")]
    base: &'a str,
    day: u32,
    month: &'a str,
    dayofweek: &'a str,
    hour: u32,
}

/// Writes a filtered view as delimited UTF-8 with a header row.
pub fn write_csv<W: Write>(view: &FilteredView, writer: W) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(writer);

    for record in view.records() {
        writer.serialize(ExportRow {
            date_time: record.timestamp.format(EXPORT_DATE_TIME_FORMAT).to_string(),
            lat: record.latitude,
            lon: record.longitude,
            base: &record.base,
            day: record.day,
            month: record.month.as_str(),
            dayofweek: record.day_of_week.as_str(),
            hour: record.hour,
        })?;
    }
    writer.flush()?;

    Ok(())
}

/// Writes the extract to a file, creating or truncating it.
pub fn export_csv(view: &FilteredView, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    write_csv(view, file)?;
    info!(path = %path.display(), rows = view.len(), "Extract written");
    Ok(())
}
