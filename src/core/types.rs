use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentinel written to tabular output for absent fields.
pub const NOT_AVAILABLE: &str = "N/A";

/// Fixed export column order.
pub const CSV_COLUMNS: [&str; 4] = [
    "business_name",
    "last_update_date",
    "street_address",
    "materials_accepted",
];

/// One recycling facility recovered from a results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacilityRecord {
    pub business_name: String,
    /// No strategy populates this yet; it stays in the schema so exports keep
    /// their column layout.
    #[serde(default)]
    pub last_update_date: Option<String>,
    #[serde(default)]
    pub street_address: Option<String>,
    #[serde(default)]
    pub materials_accepted: Option<String>,
}

impl FacilityRecord {
    /// A record is worth keeping once it carries an address or a materials list.
    pub fn has_substance(&self) -> bool {
        self.street_address.is_some() || self.materials_accepted.is_some()
    }

    /// Row in `CSV_COLUMNS` order, absent fields rendered as `N/A`.
    pub fn csv_row(&self) -> [&str; 4] {
        [
            self.business_name.as_str(),
            self.last_update_date.as_deref().unwrap_or(NOT_AVAILABLE),
            self.street_address.as_deref().unwrap_or(NOT_AVAILABLE),
            self.materials_accepted.as_deref().unwrap_or(NOT_AVAILABLE),
        ]
    }
}

/// Which extraction pass produced a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    /// Page text split on phone numbers.
    Segments,
    /// Block-level `div`/`section`/`article` containers.
    Containers,
}

impl StrategyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::Segments => "segments",
            StrategyKind::Containers => "containers",
        }
    }
}

/// Why a candidate segment or container produced no record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("segment has no non-empty lines")]
    EmptySegment,
    #[error("no street address or materials found")]
    NoSubstantiveFields,
    #[error("container has no street address line")]
    MissingAddress,
}

/// A record together with the pass that found it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedFacility {
    pub strategy: StrategyKind,
    pub record: FacilityRecord,
}

/// Per-strategy tally, kept for logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategySummary {
    pub strategy: StrategyKind,
    pub candidates: usize,
    pub extracted: usize,
    pub skipped: Vec<(usize, SkipReason)>,
}

/// Everything one extraction run produced, in page order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ExtractionReport {
    pub facilities: Vec<ExtractedFacility>,
    pub summaries: Vec<StrategySummary>,
}

impl ExtractionReport {
    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    pub fn ran(&self, strategy: StrategyKind) -> bool {
        self.summaries.iter().any(|s| s.strategy == strategy)
    }

    pub fn count_from(&self, strategy: StrategyKind) -> usize {
        self.facilities
            .iter()
            .filter(|f| f.strategy == strategy)
            .count()
    }

    /// Drop provenance and keep the plain records.
    pub fn into_records(self) -> Vec<FacilityRecord> {
        self.facilities.into_iter().map(|f| f.record).collect()
    }
}
