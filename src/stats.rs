// 📊 Statistics Aggregator
// Counts per source tag, per year, and the covered time span

use crate::extractor::SkipReason;
use crate::point::Point;
use crate::router::RoutedDocument;
use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// LocationStats - one pass over a routed document
#[derive(Debug, Clone, Default, Serialize)]
pub struct LocationStats {
    pub total_entries: usize,
    pub parsed: usize,
    pub failed: usize,
    /// Source tag → count; failed object entries count as `unparsed:<keys>`
    pub by_type: HashMap<String, usize>,
    pub by_year: BTreeMap<i32, usize>,
    pub earliest: Option<DateTime<Utc>>,
    pub latest: Option<DateTime<Utc>>,
}

impl LocationStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Aggregate every entry of a routed document
    pub fn from_document(document: &RoutedDocument) -> Self {
        let mut stats = LocationStats::new();
        for (entry, result) in document.entries.iter().zip(document.points()) {
            stats.record(entry, &result);
        }
        stats
    }

    /// Add one entry and its extraction outcome
    pub fn record(&mut self, entry: &Value, result: &Result<Point, SkipReason>) {
        self.total_entries += 1;

        match result {
            Ok(point) => {
                self.parsed += 1;
                *self.by_type.entry(point.source.clone()).or_insert(0) += 1;

                if let Some(ts) = point.timestamp {
                    self.earliest = Some(self.earliest.map_or(ts, |e| e.min(ts)));
                    self.latest = Some(self.latest.map_or(ts, |l| l.max(ts)));
                    *self.by_year.entry(ts.year()).or_insert(0) += 1;
                }
            }
            Err(reason) => {
                self.failed += 1;
                debug!(reason = %reason, "entry skipped");

                if let Some(label) = unparsed_label(entry) {
                    *self.by_type.entry(label).or_insert(0) += 1;
                }
            }
        }
    }

    /// Most frequent tags first; ties broken by name
    pub fn top_types(&self, limit: usize) -> Vec<(&str, usize)> {
        let mut types: Vec<(&str, usize)> = self
            .by_type
            .iter()
            .map(|(name, count)| (name.as_str(), *count))
            .collect();
        types.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        types.truncate(limit);
        types
    }

    /// Whole days between earliest and latest timestamp
    pub fn span_days(&self) -> Option<i64> {
        match (self.earliest, self.latest) {
            (Some(earliest), Some(latest)) => Some((latest - earliest).num_days()),
            _ => None,
        }
    }

    pub fn timestamped(&self) -> usize {
        self.by_year.values().sum()
    }
}

/// `unparsed:` followed by the first three keys in sorted order
fn unparsed_label(entry: &Value) -> Option<String> {
    let map = entry.as_object()?;
    let mut keys: Vec<&str> = map.keys().map(String::as_str).collect();
    keys.sort_unstable();
    keys.truncate(3);
    Some(format!("unparsed:{}", keys.join(",")))
}

// ============================================================================
// TESTS
// ============================================================================
