//! Fallback strategy: treat each block container holding a phone number and a
//! materials list as one facility.

use super::patterns::{self, materials_tail, truncate_chars, MATERIALS_MARKER};
use super::{ExtractionStrategy, StrategyOutput};
use crate::core::types::{FacilityRecord, SkipReason, StrategyKind};
use crate::extract::page::ParsedPage;

/// Shorter blocks are fragments of a listing, not a whole one.
const MIN_CONTAINER_CHARS: usize = 100;
const NAME_PREFIX_CHARS: usize = 30;
const MAX_MATERIALS_CHARS: usize = 200;

pub struct ContainerStrategy;

impl ExtractionStrategy for ContainerStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Containers
    }

    fn extract(&self, page: &ParsedPage, wanted: usize) -> StrategyOutput {
        extract_containers(&page.container_texts(), wanted)
    }
}

/// Scan flattened container texts in order, stopping once `wanted` records
/// have been kept.
pub fn extract_containers<S: AsRef<str>>(texts: &[S], wanted: usize) -> StrategyOutput {
    let mut output = StrategyOutput::new(StrategyKind::Containers);

    for (index, text) in texts.iter().enumerate() {
        if output.records.len() >= wanted {
            break;
        }
        let text = text.as_ref();
        if !qualifies(text) {
            continue;
        }

        output.summary.candidates += 1;
        match parse_container(text) {
            Ok(record) => output.push(record),
            Err(reason) => output.skip(index, reason),
        }
    }

    output
}

fn qualifies(text: &str) -> bool {
    text.contains(MATERIALS_MARKER)
        && patterns::phone().is_match(text)
        && text.chars().count() > MIN_CONTAINER_CHARS
}

fn parse_container(text: &str) -> Result<FacilityRecord, SkipReason> {
    let lines: Vec<&str> = text
        .split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();

    let business_name = match lines.first() {
        Some(first) => format!("Facility at {}...", truncate_chars(first, NAME_PREFIX_CHARS)),
        None => "Unknown Facility".to_string(),
    };

    let street_address = lines
        .iter()
        .find(|line| patterns::container_street_line().is_match(line))
        .map(|line| line.to_string())
        .ok_or(SkipReason::MissingAddress)?;

    let materials_accepted = materials_tail(text)
        .map(|m| truncate_chars(m, MAX_MATERIALS_CHARS).trim().to_string())
        .filter(|m| !m.is_empty());

    Ok(FacilityRecord {
        business_name,
        last_update_date: None,
        street_address: Some(street_address),
        materials_accepted,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(name: &str, street: &str) -> String {
        format!(
            "{}\n{}\n(212) 555-0100\nMaterials accepted:\nComputers, Monitors, Printers (call first)\nFor residents of the five boroughs only",
            name, street
        )
    }

    #[test]
    fn qualifying_container_becomes_record() {
        let texts = vec![listing("Lower East Side Ecology Center Warehouse", "469 Union Street")];
        let output = extract_containers(&texts, 3);
        assert_eq!(output.records.len(), 1);
        let record = &output.records[0];
        assert_eq!(
            record.business_name,
            "Facility at Lower East Side Ecology Center..."
        );
        assert_eq!(record.street_address.as_deref(), Some("469 Union Street"));
        assert_eq!(
            record.materials_accepted.as_deref(),
            Some("Computers, Monitors, Printers")
        );
    }

    #[test]
    fn short_or_markerless_containers_are_ignored() {
        let short = "Depot\n1 Main St\n(212) 555-0100\nMaterials accepted: TVs".to_string();
        let no_phone = listing("Depot", "1 Main St").replace("(212) 555-0100", "call us");
        let output = extract_containers(&[short, no_phone], 3);
        assert!(output.records.is_empty());
        assert_eq!(output.summary.candidates, 0);
    }

    #[test]
    fn container_without_street_is_skipped() {
        let texts = vec![listing("Depot without a street line anywhere", "Brooklyn Navy Yard")];
        let output = extract_containers(&texts, 3);
        assert!(output.records.is_empty());
        assert_eq!(output.summary.skipped, vec![(0, SkipReason::MissingAddress)]);
    }

    #[test]
    fn scanning_stops_once_enough_records_are_kept() {
        let texts = vec![
            listing("First Facility Name Here", "10 Canal Street"),
            listing("Second Facility Name Here", "20 Canal Street"),
            listing("Third Facility Name Here", "30 Canal Street"),
        ];
        let output = extract_containers(&texts, 2);
        assert_eq!(output.records.len(), 2);
        assert_eq!(output.summary.candidates, 2);
    }

    #[test]
    fn materials_are_capped() {
        let long = "glass ".repeat(60);
        let text = format!("Big Depot\n5 Elm Ave\n(212) 555-0100\nMaterials accepted: {}", long);
        let output = extract_containers(&[text], 1);
        let materials = output.records[0].materials_accepted.as_deref().unwrap();
        assert!(materials.chars().count() <= 200);
        assert!(materials.starts_with("glass glass"));
    }

    #[test]
    fn length_check_is_strictly_over_one_hundred_chars() {
        let head = "Depot\n1 Main St\n(212) 555-0100\nMaterials accepted: ";
        assert_eq!(head.chars().count(), 51);

        let at_limit = format!("{}{}", head, "x".repeat(49));
        assert!(extract_containers(&[at_limit], 1).records.is_empty());

        let over_limit = format!("{}{}", head, "x".repeat(50));
        assert_eq!(extract_containers(&[over_limit], 1).records.len(), 1);
    }

    #[test]
    fn line_separators_count_towards_length() {
        // 98 characters of text across four nodes, 101 once joined with newlines.
        let html = format!(
            "<div><b>Depot</b><p>1 Main St</p><p>(212) 555-0100</p><p>Materials accepted: {}</p></div>",
            "x".repeat(50)
        );
        let page = ParsedPage::parse(&html);
        let texts = page.container_texts();
        assert_eq!(texts[0].chars().count(), 101);

        let output = ContainerStrategy.extract(&page, 1);
        assert_eq!(output.records.len(), 1);
        assert_eq!(output.records[0].business_name, "Facility at Depot...");
        assert_eq!(output.records[0].street_address.as_deref(), Some("1 Main St"));
    }
}
