use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use url::Url;

use crate::core::config::ScoutConfig;
use crate::core::types::{FacilityRecord, StrategySummary};
use crate::extract::FacilityExtractor;
use crate::scraping::PageSource;
use crate::tools::export;

/// Pages smaller than this almost certainly failed to render.
const MINIMAL_PAGE_BYTES: usize = 1000;

/// Best guess at why a page produced no facilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyPageHint {
    NoResults,
    MinimalContent,
    StructureChanged,
}

impl EmptyPageHint {
    pub fn diagnose(html: &str) -> Self {
        if html.to_lowercase().contains("no results found") {
            EmptyPageHint::NoResults
        } else if html.len() < MINIMAL_PAGE_BYTES {
            EmptyPageHint::MinimalContent
        } else {
            EmptyPageHint::StructureChanged
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            EmptyPageHint::NoResults => {
                "The search returned no results. Try different search parameters."
            }
            EmptyPageHint::MinimalContent => {
                "Page content seems minimal. There might be a loading issue."
            }
            EmptyPageHint::StructureChanged => {
                "Page loaded but structure might have changed. Check the debug HTML file."
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScrapeOutcome {
    pub url: Url,
    /// Records found before truncation to `max_results`.
    pub total_found: usize,
    /// Records that were exported, in page order.
    pub records: Vec<FacilityRecord>,
    pub summaries: Vec<StrategySummary>,
    pub output_path: PathBuf,
    pub saved: bool,
    pub debug_html_path: Option<PathBuf>,
    pub hint: Option<EmptyPageHint>,
}

/// Fetch, dump, extract, truncate, export.
pub async fn run(config: &ScoutConfig, source: &dyn PageSource) -> Result<ScrapeOutcome> {
    info!(
        "Searching for: {} near {} within {} miles",
        config.search_term, config.zip_code, config.radius
    );

    let url = config.search_url()?;
    info!("Navigating to: {} (source: {})", url, source.name());
    let html = source.fetch(&url).await?;

    let debug_html_path = match &config.debug_html_path {
        Some(path) => write_debug_dump(path, &html).await.then(|| path.clone()),
        None => None,
    };

    let extractor = FacilityExtractor::new(config.min_results);
    info!(
        "Extracting facility data (fallback below {} records)...",
        extractor.min_results()
    );
    let report = extractor.extract(&html);
    let total_found = report.len();
    let summaries = report.summaries.clone();

    let mut records = report.into_records();
    records.truncate(config.max_results);

    let (saved, hint) = if records.is_empty() {
        let hint = EmptyPageHint::diagnose(&html);
        warn!("No facility data was extracted. Hint: {}", hint.message());
        (false, Some(hint))
    } else {
        (export::save_records(&records, &config.output_path)?, None)
    };

    Ok(ScrapeOutcome {
        url,
        total_found,
        records,
        summaries,
        output_path: config.output_path.clone(),
        saved,
        debug_html_path,
        hint,
    })
}

/// Save the fetched page for offline inspection. Failure is logged, not fatal.
pub async fn write_debug_dump(path: &Path, html: &str) -> bool {
    match tokio::fs::write(path, html).await {
        Ok(()) => {
            info!("Saved page source to {}", path.display());
            true
        }
        Err(e) => {
            warn!("Could not write debug page source to {}: {}", path.display(), e);
            false
        }
    }
}
