// 🧭 Document Router
// Top-level export document → ordered sequence of raw entries
//
// Supported layouts (tested in this order):
// - {"locations": [...]}                         legacy Records-style export
// - {"semanticSegments": [...], "rawSignals": [...]}  on-device timeline export
// - {"timelineObjects": [...]}
// - {"Records": [...]}
// - [...]                                        bare list of entries

use crate::extractor::{extract_point, SkipReason, PATH_POINT_TAG, RAW_POSITION_TAG, SYNTHETIC_TAG};
use crate::point::Point;
use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, warn};

/// Files above this size get a memory warning before loading
pub const LARGE_FILE_WARN_MB: f64 = 2000.0;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

// ============================================================================
// LAYOUT
// ============================================================================

/// Layout - which document shape the entries were read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Layout {
    BareList,
    Locations,
    SemanticSegments,
    /// Only `rawSignals` produced entries
    RawSignals,
    TimelineObjects,
    Records,
    /// No known key; carries the top-level keys actually found
    Unrecognized { keys: Vec<String> },
}

impl Layout {
    /// Top-level key used when re-serializing routed entries
    pub fn top_key(&self) -> &str {
        match self {
            Layout::Locations => "locations",
            Layout::SemanticSegments => "semanticSegments",
            Layout::TimelineObjects => "timelineObjects",
            Layout::Records => "Records",
            Layout::BareList | Layout::RawSignals | Layout::Unrecognized { .. } => "locations",
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, Layout::Unrecognized { .. })
    }
}

// ============================================================================
// ROUTED DOCUMENT
// ============================================================================

/// RoutedDocument - output of route()
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedDocument {
    pub entries: Vec<Value>,
    pub layout: Layout,
}

impl RoutedDocument {
    pub fn new(entries: Vec<Value>, layout: Layout) -> Self {
        RoutedDocument { entries, layout }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_key(&self) -> &str {
        self.layout.top_key()
    }

    /// Lazily extract one result per entry, in document order
    pub fn points(&self) -> impl Iterator<Item = Result<Point, SkipReason>> + '_ {
        self.entries.iter().map(extract_point)
    }

    /// Wrap the entries back under their top-level key
    pub fn into_document(self) -> Value {
        let key = self.top_key().to_string();
        let mut map = Map::new();
        map.insert(key, Value::Array(self.entries));
        Value::Object(map)
    }
}

// ============================================================================
// ROUTING
// ============================================================================

/// Route a parsed document into its raw entries.
///
/// Never fails: an unknown shape yields no entries plus a warning listing
/// the top-level keys that were found.
pub fn route(document: Value) -> RoutedDocument {
    let mut map = match document {
        Value::Array(entries) => return RoutedDocument::new(entries, Layout::BareList),
        Value::Object(map) => map,
        other => {
            warn!(kind = json_type_name(&other), "unrecognized document: top level is not an object or list");
            return RoutedDocument::new(Vec::new(), Layout::Unrecognized { keys: Vec::new() });
        }
    };

    let keys: Vec<String> = map.keys().cloned().collect();

    if let Some(locations) = map.remove("locations") {
        return RoutedDocument::new(into_entries("locations", locations), Layout::Locations);
    }

    let has_segments = map.contains_key("semanticSegments");
    let has_signals = map.contains_key("rawSignals");
    let mut entries = Vec::new();

    if let Some(segments) = map.remove("semanticSegments") {
        for segment in into_entries("semanticSegments", segments) {
            expand_segment(segment, &mut entries);
        }
    }

    // Raw positions are appended after the segments, whatever those produced
    if let Some(signals) = map.remove("rawSignals") {
        for signal in into_entries("rawSignals", signals) {
            if let Value::Object(mut signal) = signal {
                if let Some(position) = signal.remove("position") {
                    entries.push(synthesize(RAW_POSITION_TAG, position));
                }
            }
        }
    }

    if !entries.is_empty() {
        let layout = if has_segments { Layout::SemanticSegments } else { Layout::RawSignals };
        return RoutedDocument::new(entries, layout);
    }

    if let Some(objects) = map.remove("timelineObjects") {
        return RoutedDocument::new(into_entries("timelineObjects", objects), Layout::TimelineObjects);
    }

    if let Some(records) = map.remove("Records") {
        return RoutedDocument::new(into_entries("Records", records), Layout::Records);
    }

    if has_segments || has_signals {
        warn!(keys = ?keys, "no entries found under semanticSegments/rawSignals");
        let layout = if has_segments { Layout::SemanticSegments } else { Layout::RawSignals };
        return RoutedDocument::new(Vec::new(), layout);
    }

    warn!(keys = ?keys, "unrecognized document layout");
    RoutedDocument::new(Vec::new(), Layout::Unrecognized { keys })
}

/// Segments with `visit`/`activity` pass through; `timelinePath` expands to
/// one synthetic entry per path point; anything else passes through too.
fn expand_segment(segment: Value, entries: &mut Vec<Value>) {
    match segment {
        Value::Object(mut seg)
            if !seg.contains_key("visit") && !seg.contains_key("activity") && seg.contains_key("timelinePath") =>
        {
            let path = seg.remove("timelinePath").unwrap_or(Value::Null);
            for path_point in into_entries("timelinePath", path) {
                entries.push(synthesize(PATH_POINT_TAG, path_point));
            }
        }
        other => entries.push(other),
    }
}

/// Synthetic entry: the tag first, then the source object's own fields
fn synthesize(tag: &str, fields: Value) -> Value {
    let mut entry = Map::new();
    entry.insert(SYNTHETIC_TAG.to_string(), Value::String(tag.to_string()));
    if let Value::Object(fields) = fields {
        entry.extend(fields);
    }
    Value::Object(entry)
}

fn into_entries(key: &str, value: Value) -> Vec<Value> {
    match value {
        Value::Array(entries) => entries,
        other => {
            warn!(key, kind = json_type_name(&other), "expected a list of entries");
            Vec::new()
        }
    }
}

// ============================================================================
// LOADING
// ============================================================================

/// File size in MB (1 MB = 1024 * 1024 bytes)
pub fn file_size_mb(path: &Path) -> Result<f64> {
    let metadata = std::fs::metadata(path)
        .with_context(|| format!("Failed to stat file: {}", path.display()))?;
    Ok(metadata.len() as f64 / BYTES_PER_MB)
}

/// Read and deserialize a whole export document into memory
pub fn load_document(path: &Path) -> Result<Value> {
    let size_mb = file_size_mb(path)?;
    info!(path = %path.display(), size_mb, "loading document");

    if size_mb > LARGE_FILE_WARN_MB {
        warn!(
            size_mb,
            "file is larger than 2 GB and may not fit in memory; narrow with --after/--before or use split"
        );
    }

    let file = File::open(path)
        .with_context(|| format!("Failed to open file: {}", path.display()))?;
    let document: Value = serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("Failed to parse JSON in {}", path.display()))?;

    info!(path = %path.display(), "document loaded");
    Ok(document)
}

/// Load and route in one step
pub fn load_and_route(path: &Path) -> Result<RoutedDocument> {
    Ok(route(load_document(path)?))
}

// ============================================================================
// STRUCTURE DESCRIPTION (peek)
// ============================================================================

/// Shape of one top-level value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    List { len: usize, first: Option<Box<Shape>>, first_keys: Option<Vec<String>> },
    Object { keys: Vec<String> },
    Scalar { kind: &'static str, preview: String },
}

/// KeySummary - one line of the structure overview
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeySummary {
    pub key: String,
    pub shape: Shape,
}

impl fmt::Display for KeySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.shape {
            Shape::List { len, first, first_keys } => {
                write!(f, "{}: list ({} items)", self.key, len)?;
                match (first_keys, first) {
                    (Some(keys), _) => write!(f, "\n   first element keys: {:?}", keys),
                    (None, Some(shape)) => write!(f, "\n   first element type: {}", shape_kind(shape)),
                    (None, None) => Ok(()),
                }
            }
            Shape::Object { keys } => write!(f, "{}: dict (keys: {:?}...)", self.key, keys),
            Shape::Scalar { kind, preview } => write!(f, "{}: {} = {}", self.key, kind, preview),
        }
    }
}

fn shape_kind(shape: &Shape) -> &'static str {
    match shape {
        Shape::List { .. } => "list",
        Shape::Object { .. } => "object",
        Shape::Scalar { kind, .. } => kind,
    }
}

/// Summarize the top level of a document. A bare list is reported under `(root)`.
pub fn describe_document(document: &Value) -> Vec<KeySummary> {
    match document {
        Value::Object(map) => map
            .iter()
            .map(|(key, value)| KeySummary { key: key.clone(), shape: describe_value(value) })
            .collect(),
        other => vec![KeySummary { key: "(root)".to_string(), shape: describe_value(other) }],
    }
}

fn describe_value(value: &Value) -> Shape {
    match value {
        Value::Array(items) => {
            let first = items.first();
            Shape::List {
                len: items.len(),
                first_keys: first.and_then(Value::as_object).map(|m| m.keys().cloned().collect()),
                first: first.map(|v| Box::new(describe_value(v))),
            }
        }
        Value::Object(map) => Shape::Object { keys: map.keys().take(5).cloned().collect() },
        scalar => {
            let text = match scalar {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            Shape::Scalar { kind: json_type_name(scalar), preview: text.chars().take(100).collect() }
        }
    }
}

pub fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}

// ============================================================================
// TESTS
// ============================================================================
