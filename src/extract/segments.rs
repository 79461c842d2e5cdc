//! Primary strategy: split the page text on phone numbers and read one
//! facility out of the text that follows each number.

use super::patterns::{
    self, materials_tail, truncate_chars, CITY_STATE_TEXT, MATERIALS_MARKER,
};
use super::{ExtractionStrategy, StrategyOutput};
use crate::core::types::{FacilityRecord, SkipReason, StrategyKind};
use crate::extract::page::ParsedPage;

const ADDRESS_SCAN_LINES: usize = 10;
const NAME_SCAN_LINES: usize = 5;
const MIN_NAME_CHARS: usize = 5;
const MAX_NAME_CHARS: usize = 50;
const MAX_MATERIAL_TOKENS: usize = 10;

pub struct SegmentStrategy;

impl ExtractionStrategy for SegmentStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::Segments
    }

    /// Segments are always read in full; `wanted` only matters to later passes.
    fn extract(&self, page: &ParsedPage, _wanted: usize) -> StrategyOutput {
        extract_segments(&page.text())
    }
}

/// Run the phone-anchored pass over already-flattened page text.
pub fn extract_segments(text: &str) -> StrategyOutput {
    let mut output = StrategyOutput::new(StrategyKind::Segments);

    // Everything before the first phone number is page chrome.
    for (index, segment) in patterns::phone().split(text).skip(1).enumerate() {
        output.summary.candidates += 1;
        match parse_segment(segment, index) {
            Ok(record) => output.push(record),
            Err(reason) => output.skip(index, reason),
        }
    }

    output
}

fn parse_segment(segment: &str, index: usize) -> Result<FacilityRecord, SkipReason> {
    let lines: Vec<&str> = segment
        .split('\n')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect();
    if lines.is_empty() {
        return Err(SkipReason::EmptySegment);
    }

    let street_address = address_from_lines(&lines);
    let materials_accepted = materials_from_segment(segment);
    let business_name = name_from_lines(&lines).unwrap_or_else(|| {
        synthesized_name(
            street_address.as_deref(),
            materials_accepted.is_some(),
            index,
        )
    });

    let record = FacilityRecord {
        business_name,
        last_update_date: None,
        street_address,
        materials_accepted,
    };

    if record.has_substance() {
        Ok(record)
    } else {
        Err(SkipReason::NoSubstantiveFields)
    }
}

/// Street and city lines ahead of the materials section, joined with `", "`.
fn address_from_lines(lines: &[&str]) -> Option<String> {
    let mut found = Vec::new();
    let mut materials_started = false;

    for line in lines.iter().take(ADDRESS_SCAN_LINES) {
        if line.starts_with(MATERIALS_MARKER) {
            materials_started = true;
            continue;
        }
        if materials_started {
            break;
        }
        if patterns::street_line().is_match(line) || patterns::city_line().is_match(line) {
            found.push(*line);
        }
    }

    (!found.is_empty()).then(|| found.join(", "))
}

fn materials_from_segment(segment: &str) -> Option<String> {
    let tail = materials_tail(segment)?;
    let tokens: Vec<&str> = tail
        .split_whitespace()
        .filter(|t| *t != "more" && !patterns::pagination_token().is_match(t))
        .take(MAX_MATERIAL_TOKENS)
        .collect();

    (!tokens.is_empty()).then(|| tokens.join(" "))
}

fn name_from_lines(lines: &[&str]) -> Option<String> {
    lines
        .iter()
        .take(NAME_SCAN_LINES)
        .find(|line| {
            line.chars().count() > MIN_NAME_CHARS
                && !patterns::phone().is_match(line)
                && !line.contains(CITY_STATE_TEXT)
                && !line.starts_with(MATERIALS_MARKER)
                && !line.chars().all(|c| c.is_ascii_digit())
        })
        .map(|line| truncate_chars(line, MAX_NAME_CHARS).to_string())
}

fn synthesized_name(street_address: Option<&str>, has_materials: bool, index: usize) -> String {
    let street = street_address
        .and_then(|addr| patterns::street_prefix().captures(addr))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str());

    match street {
        Some(street) => format!("Recycling Center at {}", street),
        None if has_materials => "Electronics Recycling Center".to_string(),
        None => format!("Recycling Facility {}", index + 1),
    }
}
