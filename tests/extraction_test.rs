//! Extraction tests against saved results-page fixtures.

use recycle_scout::extract::{extract_segments, FacilityExtractor};
use recycle_scout::types::{StrategyKind, NOT_AVAILABLE};

const RESULTS_PAGE: &str = include_str!("fixtures/results_page.html");
const TRAILING_PHONE_PAGE: &str = include_str!("fixtures/trailing_phone_page.html");

fn init_logger() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

#[test]
fn results_page_yields_one_record_per_phone() {
    init_logger();
    let report = FacilityExtractor::new(3).extract(RESULTS_PAGE);

    assert_eq!(report.len(), 3);
    assert!(!report.ran(StrategyKind::Containers), "fallback should not run");

    let names: Vec<&str> = report
        .facilities
        .iter()
        .map(|f| f.record.business_name.as_str())
        .collect();
    assert_eq!(
        names,
        vec![
            "Lower East Side Ecology Center",
            "Chelsea Electronics Depot",
            "Queens Computer Recycling",
        ]
    );

    let first = &report.facilities[0].record;
    assert_eq!(
        first.street_address.as_deref(),
        Some("469 Union Street, New York, NY 10001")
    );
    assert_eq!(
        first.materials_accepted.as_deref(),
        Some("Computers Monitors Printers")
    );

    let second = &report.facilities[1].record;
    assert_eq!(
        second.street_address.as_deref(),
        Some("180 Tenth Avenue, New York, NY 10011")
    );
    assert_eq!(
        second.materials_accepted.as_deref(),
        Some("Cell Phones Batteries Cables Ink Cartridges Televisions Laptops Tablets Cameras")
    );

    let third = &report.facilities[2].record;
    assert_eq!(third.street_address.as_deref(), Some("35-10 Steinway St"));
    assert_eq!(third.materials_accepted.as_deref(), Some("Computers Laptops"));
}

#[test]
fn phone_numbers_inside_scripts_do_not_create_segments() {
    let page = recycle_scout::extract::ParsedPage::parse(RESULTS_PAGE);
    assert!(!page.text().contains("(800) 555-0000"));
    assert_eq!(extract_segments(&page.text()).summary.candidates, 3);
}

#[test]
fn extraction_is_deterministic() {
    let extractor = FacilityExtractor::new(3);
    assert_eq!(extractor.extract(RESULTS_PAGE), extractor.extract(RESULTS_PAGE));
    assert_eq!(
        extractor.extract(TRAILING_PHONE_PAGE),
        extractor.extract(TRAILING_PHONE_PAGE)
    );
}

#[test]
fn every_record_has_address_or_materials() {
    for html in [RESULTS_PAGE, TRAILING_PHONE_PAGE] {
        let report = FacilityExtractor::new(5).extract(html);
        for facility in &report.facilities {
            let row = facility.record.csv_row();
            assert!(
                row[2] != NOT_AVAILABLE || row[3] != NOT_AVAILABLE,
                "record without substance: {:?}",
                facility.record
            );
            assert_eq!(facility.record.last_update_date, None);
        }
    }
}

#[test]
fn segment_records_respect_token_and_name_caps() {
    let report = FacilityExtractor::new(3).extract(RESULTS_PAGE);
    for facility in report
        .facilities
        .iter()
        .filter(|f| f.strategy == StrategyKind::Segments)
    {
        if let Some(materials) = &facility.record.materials_accepted {
            assert!(materials.split(' ').count() <= 10);
        }
        assert!(facility.record.business_name.chars().count() <= 50);
    }
}

#[test]
fn fallback_appends_container_records_when_segments_fall_short() {
    init_logger();
    let report = FacilityExtractor::new(3).extract(TRAILING_PHONE_PAGE);

    assert!(report.ran(StrategyKind::Containers));
    assert_eq!(report.count_from(StrategyKind::Segments), 1);
    assert_eq!(report.count_from(StrategyKind::Containers), 2);
    assert_eq!(report.facilities[0].strategy, StrategyKind::Segments);

    let from_segments = &report.facilities[0].record;
    assert_eq!(from_segments.business_name, "Chelsea Electronics Depot");
    assert_eq!(from_segments.street_address.as_deref(), Some("180 Tenth Avenue"));

    let first_container = &report.facilities[1].record;
    assert_eq!(
        first_container.business_name,
        "Facility at Lower East Side Ecology Center..."
    );
    assert_eq!(first_container.street_address.as_deref(), Some("469 Union Street"));
    assert_eq!(
        first_container.materials_accepted.as_deref(),
        Some("Computers Monitors Printers")
    );

    let second_container = &report.facilities[2].record;
    assert_eq!(
        second_container.business_name,
        "Facility at Chelsea Electronics Depot..."
    );
}

#[test]
fn fallback_stops_at_combined_minimum() {
    let report = FacilityExtractor::new(2).extract(TRAILING_PHONE_PAGE);
    assert_eq!(report.len(), 2);
    assert_eq!(report.count_from(StrategyKind::Containers), 1);
}

#[test]
fn phone_free_input_triggers_fallback_with_nothing_to_find() {
    let report = FacilityExtractor::new(3).extract("<html><body><p>Nothing here</p></body></html>");
    assert!(report.is_empty());
    assert!(report.ran(StrategyKind::Segments));
    assert!(report.ran(StrategyKind::Containers));
    assert_eq!(report.summaries[0].candidates, 0);

    let report = FacilityExtractor::new(3).extract("");
    assert!(report.is_empty());
    assert!(report.ran(StrategyKind::Containers));
}

#[test]
fn plain_text_acme_listing() {
    let text = "Results\n(000) 000-0000\nACME Recycling\n123 Main St\nNew York, NY 10001\n\
                Materials accepted: batteries cables +5 more\nFor residents...";
    let report = FacilityExtractor::new(1).extract(text);
    assert_eq!(report.len(), 1);
    let record = &report.facilities[0].record;
    assert_eq!(record.business_name, "ACME Recycling");
    assert_eq!(
        record.street_address.as_deref(),
        Some("123 Main St, New York, NY 10001")
    );
    assert_eq!(record.materials_accepted.as_deref(), Some("batteries cables"));
}
