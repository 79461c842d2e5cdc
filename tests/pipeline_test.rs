//! End-to-end runs of the scrape pipeline over saved pages.

use recycle_scout::scraping::FileSource;
use recycle_scout::tools::scrape::{self, EmptyPageHint};
use recycle_scout::ScoutConfig;
use std::path::Path;

fn init_logger() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn config_in(dir: &Path, output: &str) -> ScoutConfig {
    ScoutConfig {
        output_path: dir.join(output),
        debug_html_path: Some(dir.join("debug_page_source.html")),
        ..ScoutConfig::default()
    }
}

#[tokio::test]
async fn saved_results_page_is_exported_and_truncated() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let fixture = Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/results_page.html");

    let mut config = config_in(dir.path(), "facilities.csv");
    config.max_results = 2;

    let outcome = scrape::run(&config, &FileSource::new(&fixture)).await.unwrap();
    println!(
        "found {} kept {} from {}",
        outcome.total_found,
        outcome.records.len(),
        outcome.url
    );

    assert!(outcome.saved);
    assert_eq!(outcome.total_found, 3);
    assert_eq!(outcome.records.len(), 2);
    assert!(outcome.hint.is_none());
    assert_eq!(outcome.url.query_pairs().count(), 3);

    let csv = std::fs::read_to_string(&config.output_path).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[0],
        "business_name,last_update_date,street_address,materials_accepted"
    );
    assert!(lines[1].starts_with("Lower East Side Ecology Center,N/A,"));
    assert!(lines[2].starts_with("Chelsea Electronics Depot,N/A,"));

    let dump = outcome.debug_html_path.expect("debug dump path");
    let saved_html = std::fs::read_to_string(dump).unwrap();
    assert_eq!(saved_html, std::fs::read_to_string(&fixture).unwrap());
}

#[tokio::test]
async fn json_output_is_selected_by_extension() {
    let dir = tempfile::tempdir().unwrap();
    let fixture =
        Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/trailing_phone_page.html");
    let mut config = config_in(dir.path(), "facilities.json");
    config.debug_html_path = None;

    let outcome = scrape::run(&config, &FileSource::new(&fixture)).await.unwrap();
    assert!(outcome.saved);
    assert!(outcome.debug_html_path.is_none());
    assert!(!dir.path().join("debug_page_source.html").exists());

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&config.output_path).unwrap()).unwrap();
    let rows = json.as_array().unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0]["business_name"], "Chelsea Electronics Depot");
    assert!(rows[0]["last_update_date"].is_null());
}

#[tokio::test]
async fn empty_page_saves_nothing_and_explains_why() {
    init_logger();
    let dir = tempfile::tempdir().unwrap();
    let page = dir.path().join("blank.html");
    std::fs::write(&page, "<html><body></body></html>").unwrap();
    let config = config_in(dir.path(), "facilities.csv");

    let outcome = scrape::run(&config, &FileSource::new(&page)).await.unwrap();
    assert!(!outcome.saved);
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.hint, Some(EmptyPageHint::MinimalContent));
    assert!(!config.output_path.exists());
    assert!(outcome.debug_html_path.is_some());
}

#[tokio::test]
async fn missing_saved_page_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(dir.path(), "facilities.csv");
    let result = scrape::run(&config, &FileSource::new(dir.path().join("gone.html"))).await;
    assert!(result.is_err());
    assert!(!config.output_path.exists());
}
