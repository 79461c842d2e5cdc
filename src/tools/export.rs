use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{info, warn};

use crate::core::types::{FacilityRecord, CSV_COLUMNS};

const PREVIEW_MATERIALS_CHARS: usize = 80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// `.json` → JSON, anything else → CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => ExportFormat::Json,
            _ => ExportFormat::Csv,
        }
    }
}

/// Header row plus one row per record, columns in `CSV_COLUMNS` order.
pub fn write_csv<W: Write>(writer: W, records: &[FacilityRecord]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_COLUMNS)?;
    for record in records {
        csv_writer.write_record(record.csv_row())?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn write_json<W: Write>(writer: W, records: &[FacilityRecord]) -> Result<()> {
    serde_json::to_writer_pretty(writer, records)?;
    Ok(())
}

/// Write `records` to `path`. Returns `Ok(false)` without touching the
/// filesystem when there is nothing to write.
pub fn save_records(records: &[FacilityRecord], path: &Path) -> Result<bool> {
    if records.is_empty() {
        warn!("No data to save!");
        return Ok(false);
    }

    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    match ExportFormat::from_path(path) {
        ExportFormat::Csv => write_csv(&mut out, records)?,
        ExportFormat::Json => write_json(&mut out, records)?,
    }
    out.flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;

    info!("Successfully saved {} records to '{}'", records.len(), path.display());
    Ok(true)
}

/// Human-readable listing of what was saved.
pub fn render_preview(records: &[FacilityRecord]) -> String {
    let mut out = String::from("=== CSV PREVIEW ===\n");
    for (i, r) in records.iter().enumerate() {
        let [_, updated, address, materials] = r.csv_row();
        let materials: String = materials.chars().take(PREVIEW_MATERIALS_CHARS).collect();
        out.push_str(&format!("{}. {}\n", i + 1, r.business_name));
        out.push_str(&format!("   Address: {}\n", address));
        out.push_str(&format!("   Materials: {}...\n", materials));
        out.push_str(&format!("   Last Update: {}\n\n", updated));
    }
    out
}
