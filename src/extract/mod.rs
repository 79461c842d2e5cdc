//! Facility extraction from rendered results pages.
//!
//! Extraction is a chain of [`ExtractionStrategy`] passes over one parsed page.
//! The first pass always runs; later passes only run while the combined record
//! count is below `min_results`, and their records are appended after the
//! earlier ones. Every pass is a pure function of the page, so the same HTML
//! always produces the same report.
//!
//! A candidate that yields nothing usable is recorded as a [`SkipReason`] and
//! the pass moves on; no single candidate can abort a run.

mod containers;
mod page;
pub mod patterns;
mod segments;

pub use containers::{extract_containers, ContainerStrategy};
pub use page::ParsedPage;
pub use segments::{extract_segments, SegmentStrategy};

use crate::core::config::DEFAULT_MIN_RESULTS;
use crate::core::types::{
    ExtractedFacility, ExtractionReport, FacilityRecord, SkipReason, StrategyKind,
    StrategySummary,
};
use tracing::{debug, info};

/// One extraction pass.
pub trait ExtractionStrategy: Send + Sync {
    fn kind(&self) -> StrategyKind;

    /// `wanted` is how many more records would bring the run up to its minimum.
    fn extract(&self, page: &ParsedPage, wanted: usize) -> StrategyOutput;
}

/// Records kept by one pass plus its tally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyOutput {
    pub records: Vec<FacilityRecord>,
    pub summary: StrategySummary,
}

impl StrategyOutput {
    pub fn new(strategy: StrategyKind) -> Self {
        Self {
            records: Vec::new(),
            summary: StrategySummary {
                strategy,
                candidates: 0,
                extracted: 0,
                skipped: Vec::new(),
            },
        }
    }

    pub(crate) fn push(&mut self, record: FacilityRecord) {
        info!(
            "[{}] Extracted: {}",
            self.summary.strategy.as_str(),
            record.business_name
        );
        self.summary.extracted += 1;
        self.records.push(record);
    }

    pub(crate) fn skip(&mut self, index: usize, reason: SkipReason) {
        debug!(
            "[{}] candidate {} skipped: {}",
            self.summary.strategy.as_str(),
            index,
            reason
        );
        self.summary.skipped.push((index, reason));
    }
}

/// Runs the strategy chain over a page.
pub struct FacilityExtractor {
    min_results: usize,
    strategies: Vec<Box<dyn ExtractionStrategy>>,
}

impl FacilityExtractor {
    /// Segments first, containers as the fallback.
    pub fn new(min_results: usize) -> Self {
        let strategies: Vec<Box<dyn ExtractionStrategy>> =
            vec![Box::new(SegmentStrategy), Box::new(ContainerStrategy)];
        Self::with_strategies(min_results, strategies)
    }

    pub fn with_strategies(min_results: usize, strategies: Vec<Box<dyn ExtractionStrategy>>) -> Self {
        Self {
            min_results,
            strategies,
        }
    }

    pub fn min_results(&self) -> usize {
        self.min_results
    }

    pub fn extract(&self, html: &str) -> ExtractionReport {
        let page = ParsedPage::parse(html);
        self.extract_page(&page)
    }

    pub fn extract_page(&self, page: &ParsedPage) -> ExtractionReport {
        let mut report = ExtractionReport::default();

        for (position, strategy) in self.strategies.iter().enumerate() {
            if position > 0 {
                if report.len() >= self.min_results {
                    break;
                }
                info!(
                    "Only {} of {} wanted facilities found, trying {} pass",
                    report.len(),
                    self.min_results,
                    strategy.kind().as_str()
                );
            }

            let wanted = self.min_results.saturating_sub(report.len());
            let output = strategy.extract(page, wanted);
            info!(
                "{} pass: {} candidates, {} extracted, {} skipped",
                output.summary.strategy.as_str(),
                output.summary.candidates,
                output.summary.extracted,
                output.summary.skipped.len()
            );

            let kind = output.summary.strategy;
            report
                .facilities
                .extend(output.records.into_iter().map(|record| ExtractedFacility {
                    strategy: kind,
                    record,
                }));
            report.summaries.push(output.summary);
        }

        report
    }
}

impl Default for FacilityExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_RESULTS)
    }
}
