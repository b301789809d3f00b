// 📄 CSV Export
// Point stream → fixed-column CSV, and CSV → API records

use crate::point::{LocationRecord, CSV_HEADER};
use crate::router::RoutedDocument;
use crate::timestamp::DateRange;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use tracing::info;

/// ExportSummary - counters reported after a CSV export
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Rows written
    pub written: usize,
    /// Points dropped by the date range
    pub filtered: usize,
    /// Entries that produced no point
    pub skipped: usize,
}

/// Write one CSV row per extracted point.
///
/// Points without timestamp always pass the date filter.
pub fn write_csv<W: Write>(writer: W, document: &RoutedDocument, range: &DateRange) -> Result<ExportSummary> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer.write_record(CSV_HEADER).context("Failed to write CSV header")?;

    let mut summary = ExportSummary::default();

    for result in document.points() {
        let point = match result {
            Ok(point) => point,
            Err(_) => {
                summary.skipped += 1;
                continue;
            }
        };

        if let Some(ts) = point.timestamp {
            if !range.contains(ts) {
                summary.filtered += 1;
                continue;
            }
        }

        csv_writer
            .write_record(point.to_csv_row())
            .context("Failed to write CSV row")?;
        summary.written += 1;
    }

    csv_writer.flush().context("Failed to flush CSV output")?;
    Ok(summary)
}

/// Export to a file path
pub fn export_csv(path: &Path, document: &RoutedDocument, range: &DateRange) -> Result<ExportSummary> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create file: {}", path.display()))?;
    let summary = write_csv(file, document, range)?;

    info!(
        path = %path.display(),
        written = summary.written,
        filtered = summary.filtered,
        skipped = summary.skipped,
        "csv export finished"
    );
    Ok(summary)
}

// ============================================================================
// READING BACK
// ============================================================================

/// CsvRow - one exported row, every cell optional
#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    accuracy: Option<f64>,
    source: Option<String>,
    place_id: Option<String>,
    semantic_type: Option<String>,
    activity_type: Option<String>,
    altitude: Option<f64>,
    speed: Option<f64>,
}

impl CsvRow {
    fn into_record(self) -> Option<LocationRecord> {
        Some(LocationRecord {
            timestamp: non_empty(self.timestamp),
            lat: self.lat?,
            lon: self.lon?,
            accuracy: self.accuracy,
            source: non_empty(self.source),
            place_id: non_empty(self.place_id),
            semantic_type: non_empty(self.semantic_type),
            activity_type: non_empty(self.activity_type),
            altitude: self.altitude,
            speed: self.speed,
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.is_empty())
}

/// Read exported CSV rows as API records. Rows missing lat or lon are dropped.
pub fn read_records_from<R: Read>(reader: R) -> Result<Vec<LocationRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(reader);

    let mut records = Vec::new();

    for (line_num, result) in csv_reader.deserialize::<CsvRow>().enumerate() {
        let row = result.with_context(|| format!("Failed to parse CSV line {}", line_num + 2))?;
        if let Some(record) = row.into_record() {
            records.push(record);
        }
    }

    Ok(records)
}

/// Read exported CSV from a file path
pub fn read_records(path: &Path) -> Result<Vec<LocationRecord>> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    read_records_from(file).with_context(|| format!("Failed to read {}", path.display()))
}

// ============================================================================
// TESTS
// ============================================================================
