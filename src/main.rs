//! CLI entry point for the ride_lens trip-analysis tool.
//!
//! Provides subcommands for inspecting a trip dataset's facets,
//! summarizing a filtered selection, and exporting filtered extracts.

use std::collections::BTreeSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use ride_lens::{
    cache::{CacheKey, TableCache},
    calendar::Month,
    error::EmptyViewError,
    export::export_csv,
    filter::{FilterSpec, FilteredView, filter},
    loader::{LoadOptions, discover_sources, load},
    model::TripTable,
    summary::{
        SummaryMetrics, rides_by_base, rides_by_day, rides_by_hour, rides_by_month,
        rides_by_weekday, summarize,
    },
};
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "ride_lens")]
#[command(about = "A tool to filter and summarize NYC ride-hailing trip data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct InputArgs {
    /// Directory containing trip CSV partitions
    #[arg(short, long, default_value = "data", conflicts_with = "files")]
    data_dir: PathBuf,

    /// Explicit CSV files to load instead of scanning a directory
    #[arg(long, num_args = 1..)]
    files: Vec<PathBuf>,

    /// Fraction of rows to keep, in (0, 1]
    #[arg(short, long, default_value_t = 1.0)]
    sample_fraction: f64,

    /// RNG seed for the subsample (omit for a fresh draw each run)
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args)]
struct FilterArgs {
    /// Month name to include (repeatable; default: every month present)
    #[arg(short, long = "month")]
    months: Vec<String>,

    /// Base code to include (repeatable; default: every base present)
    #[arg(short, long = "base")]
    bases: Vec<String>,

    /// Earliest pickup hour, inclusive
    #[arg(long, default_value_t = 0)]
    from_hour: u32,

    /// Latest pickup hour, inclusive
    #[arg(long, default_value_t = 23)]
    to_hour: u32,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the dataset facets a dashboard binds its controls to
    Inspect {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Filter the dataset and report summary metrics and distributions
    Summarize {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        filters: FilterArgs,

        /// Print machine-readable JSON to stdout instead of log lines
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Filter the dataset and write the matching rows as CSV
    Export {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        filters: FilterArgs,

        /// Output CSV path
        #[arg(short, long, default_value = "trips_filtered.csv")]
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/ride_lens.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("ride_lens.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();
    let cache = TableCache::new(None);

    match cli.command {
        Commands::Inspect { input } => {
            let table = load_table(&cache, &input)?;
            report_facets(&table);
        }
        Commands::Summarize {
            input,
            filters,
            json,
        } => {
            let table = load_table(&cache, &input)?;
            let spec = build_spec(&table, &filters)?;
            let view = filter(table.records(), &spec);

            match summarize(&view) {
                Ok(metrics) => report_summary(&view, &metrics, json),
                Err(EmptyViewError) => {
                    if json {
                        let payload = json!({
                            "total_rides": 0,
                            "unique_days": 0,
                            "peak_hour": null,
                            "most_active_base": null,
                        });
                        println!("{payload:#}");
                    }
                    warn!("No rides match the current selection");
                }
            }
        }
        Commands::Export {
            input,
            filters,
            output,
        } => {
            let table = load_table(&cache, &input)?;
            let spec = build_spec(&table, &filters)?;
            let view = filter(table.records(), &spec);

            if view.is_empty() {
                warn!("No rides match the current selection, writing empty extract");
            }
            export_csv(&view, &output)?;
        }
    }

    Ok(())
}

/// Resolves the source list, then loads the table through the cache so
/// repeated invocations of one key share a single load.
fn load_table(cache: &TableCache, input: &InputArgs) -> Result<Arc<TripTable>> {
    let sources = if input.files.is_empty() {
        discover_sources(&input.data_dir)?
    } else {
        input.files.clone()
    };

    if sources.is_empty() {
        warn!(dir = %input.data_dir.display(), "No CSV partitions found");
    }

    let options = LoadOptions {
        sample_fraction: input.sample_fraction,
        seed: input.seed,
    };
    let key = CacheKey::new(&sources, options.sample_fraction, options.seed);
    let table = cache.get_or_load(&key, || load(&sources, &options))?;
    Ok(table)
}

/// Turns CLI filter flags into a [`FilterSpec`], defaulting unset
/// selectors to everything the table contains.
fn build_spec(table: &TripTable, filters: &FilterArgs) -> Result<FilterSpec> {
    let mut spec = FilterSpec::matching_all(table);

    if !filters.months.is_empty() {
        spec.months = filters
            .months
            .iter()
            .map(|name| name.parse::<Month>())
            .collect::<Result<BTreeSet<_>, _>>()?;
    }

    if !filters.bases.is_empty() {
        spec.bases = filters.bases.iter().cloned().collect();
    }

    if filters.from_hour > filters.to_hour {
        warn!(
            from_hour = filters.from_hour,
            to_hour = filters.to_hour,
            "Inverted hour range matches nothing"
        );
    }
    spec.hour_range = (filters.from_hour, filters.to_hour);

    Ok(spec)
}

/// Logs the facets a dashboard's selection widgets bind to.
fn report_facets(table: &TripTable) {
    let months: Vec<&str> = table.months_present().iter().map(|m| m.as_str()).collect();
    let bases = table.bases();

    info!(rows = table.len(), "Table loaded");
    info!(months = ?months, "Months present");
    info!(bases = ?bases, "Dispatch bases");

    match table.hour_bounds() {
        Some((min, max)) => info!(min_hour = min, max_hour = max, "Hour bounds"),
        None => warn!("Table is empty, no hour bounds"),
    }
}

fn report_summary(view: &FilteredView, metrics: &SummaryMetrics, json: bool) {
    if json {
        let payload = json!({
            "total_rides": metrics.total_rides,
            "unique_days": metrics.unique_days,
            "peak_hour": metrics.peak_hour,
            "most_active_base": metrics.most_active_base,
            "rides_by_hour": rides_by_hour(view)
                .into_iter()
                .map(|(hour, total)| json!({"hour": hour, "total": total}))
                .collect::<Vec<_>>(),
            "rides_by_day": rides_by_day(view)
                .into_iter()
                .map(|(day, total)| json!({"day": day, "total": total}))
                .collect::<Vec<_>>(),
            "rides_by_month": rides_by_month(view)
                .into_iter()
                .map(|(month, total)| json!({"month": month.as_str(), "total": total}))
                .collect::<Vec<_>>(),
            "rides_by_weekday": rides_by_weekday(view)
                .into_iter()
                .map(|(day, total)| json!({"dayofweek": day.as_str(), "total": total}))
                .collect::<Vec<_>>(),
            "rides_by_base": rides_by_base(view)
                .into_iter()
                .map(|(base, total)| json!({"base": base, "total": total}))
                .collect::<Vec<_>>(),
        });
        println!("{payload:#}");
        return;
    }

    info!(
        total_rides = metrics.total_rides,
        unique_days = metrics.unique_days,
        peak_hour = metrics.peak_hour,
        most_active_base = %metrics.most_active_base,
        "Selection summary"
    );

    for (month, total) in rides_by_month(view) {
        info!(month = month.as_str(), total, "Rides by month");
    }
    for (day, total) in rides_by_weekday(view) {
        info!(dayofweek = day.as_str(), total, "Rides by weekday");
    }
    for (base, total) in rides_by_base(view) {
        info!(base = %base, total, "Rides by base");
    }
}
