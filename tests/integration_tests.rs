use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use ride_lens::calendar::Month;
use ride_lens::export::export_csv;
use ride_lens::filter::{FilterSpec, filter};
use ride_lens::loader::{LoadOptions, discover_sources, load};
use ride_lens::summary::summarize;

fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

#[test]
fn test_full_pipeline() {
    let sources = discover_sources(&fixtures_dir()).expect("failed to scan fixtures");
    assert_eq!(sources.len(), 2);

    let table = load(&sources, &LoadOptions::default()).expect("failed to load fixtures");
    assert_eq!(table.len(), 14);
    assert_eq!(table.months_present(), vec![Month::April, Month::May]);
    assert_eq!(table.bases(), vec!["B02512", "B02598", "B02617", "B02682"]);
    assert_eq!(table.hour_bounds(), Some((0, 23)));

    let spec = FilterSpec {
        months: [Month::April].into_iter().collect(),
        bases: ["B02512", "B02598"]
            .iter()
            .map(|b| b.to_string())
            .collect::<BTreeSet<_>>(),
        hour_range: (0, 23),
    };
    let view = filter(table.records(), &spec);
    assert_eq!(view.len(), 6);

    let metrics = summarize(&view).expect("view is not empty");
    assert_eq!(metrics.total_rides, 6);
    assert_eq!(metrics.unique_days, 4);
    assert_eq!(metrics.most_active_base, "B02512");
}

#[test]
fn test_export_round_trips_through_the_loader() {
    let sources = discover_sources(&fixtures_dir()).expect("failed to scan fixtures");
    let table = load(&sources, &LoadOptions::default()).expect("failed to load fixtures");

    let spec = FilterSpec {
        months: [Month::May].into_iter().collect(),
        bases: table.bases().into_iter().collect(),
        hour_range: (6, 21),
    };
    let view = filter(table.records(), &spec);
    assert!(!view.is_empty());

    let export_path = std::env::temp_dir().join("ride_lens_integration_roundtrip.csv");
    let _ = std::fs::remove_file(&export_path);

    export_csv(&view, &export_path).expect("failed to write extract");
    let reloaded = load(&[&export_path], &LoadOptions::default()).expect("failed to re-ingest");

    assert_eq!(reloaded.len(), view.len());
    assert_eq!(reloaded.records(), view.records());

    std::fs::remove_file(&export_path).unwrap();
}
