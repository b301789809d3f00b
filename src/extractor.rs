// 🧩 Entry Extractor
// One schema-specific entry → normalized Point
//
// Classification is a single step (EntryKind::classify) with a fixed priority:
//   latitudeE7 → pathPoint tag → rawPosition tag → visit → activity → timelinePoint
// Each kind then deserializes only the fields it needs.

use crate::coordinate::parse_coordinate_pair;
use crate::point::Point;
use crate::timestamp::parse_timestamp;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::fmt;

/// Key the router uses to tag synthesized entries
pub const SYNTHETIC_TAG: &str = "_type";
/// Tag value for one point of an expanded `timelinePath`
pub const PATH_POINT_TAG: &str = "pathPoint";
/// Tag value for one `rawSignals[].position`
pub const RAW_POSITION_TAG: &str = "rawPosition";

/// Divisor for E7-scaled coordinates
const E7: f64 = 1e7;

// ============================================================================
// CLASSIFICATION
// ============================================================================

/// EntryKind - which export variant an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Legacy,
    PathPoint,
    RawPosition,
    Visit,
    Activity,
    TimelinePoint,
    Unrecognized,
}

impl EntryKind {
    /// Classify by key presence. First match wins.
    pub fn classify(entry: &Value) -> EntryKind {
        let Some(map) = entry.as_object() else {
            return EntryKind::Unrecognized;
        };

        if map.contains_key("latitudeE7") {
            return EntryKind::Legacy;
        }

        match map.get(SYNTHETIC_TAG).and_then(Value::as_str) {
            Some(PATH_POINT_TAG) => return EntryKind::PathPoint,
            Some(RAW_POSITION_TAG) => return EntryKind::RawPosition,
            _ => {}
        }

        if map.contains_key("visit") {
            EntryKind::Visit
        } else if map.contains_key("activity") {
            EntryKind::Activity
        } else if map.contains_key("timelinePoint") {
            EntryKind::TimelinePoint
        } else {
            EntryKind::Unrecognized
        }
    }

    pub fn name(&self) -> &str {
        match self {
            EntryKind::Legacy => "legacy",
            EntryKind::PathPoint => "pathPoint",
            EntryKind::RawPosition => "rawPosition",
            EntryKind::Visit => "visit",
            EntryKind::Activity => "activity",
            EntryKind::TimelinePoint => "timelinePoint",
            EntryKind::Unrecognized => "unrecognized",
        }
    }
}

/// SkipReason - why an entry produced no point
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// No extraction rule matched
    Unrecognized,
    /// A rule matched but no coordinate could be derived
    MissingCoordinate(EntryKind),
    /// A rule matched but its fields have the wrong JSON types
    Malformed(EntryKind),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unrecognized => write!(f, "unrecognized entry"),
            SkipReason::MissingCoordinate(kind) => write!(f, "{} entry without coordinate", kind.name()),
            SkipReason::Malformed(kind) => write!(f, "malformed {} entry", kind.name()),
        }
    }
}

// ============================================================================
// EXTRACTION
// ============================================================================

/// Extract a normalized point from one routed entry.
///
/// Malformed input never panics: it comes back as a `SkipReason`.
pub fn extract_point(entry: &Value) -> Result<Point, SkipReason> {
    Entry::from_value(entry)?.into_point()
}

/// Entry - classified entry carrying only the fields its variant uses
#[derive(Debug)]
pub enum Entry {
    Legacy(LegacyEntry),
    PathPoint(PathPointEntry),
    RawPosition(RawPositionEntry),
    Visit(VisitEntry),
    Activity(ActivityEntry),
    TimelinePoint(TimelinePointEntry),
}

impl Entry {
    /// Classify, then deserialize the variant payload
    pub fn from_value(entry: &Value) -> Result<Entry, SkipReason> {
        let kind = EntryKind::classify(entry);
        let malformed = |_: serde_json::Error| SkipReason::Malformed(kind);

        match kind {
            EntryKind::Legacy => LegacyEntry::deserialize(entry).map(Entry::Legacy).map_err(malformed),
            EntryKind::PathPoint => PathPointEntry::deserialize(entry).map(Entry::PathPoint).map_err(malformed),
            EntryKind::RawPosition => RawPositionEntry::deserialize(entry).map(Entry::RawPosition).map_err(malformed),
            EntryKind::Visit => VisitEntry::deserialize(entry).map(Entry::Visit).map_err(malformed),
            EntryKind::Activity => ActivityEntry::deserialize(entry).map(Entry::Activity).map_err(malformed),
            EntryKind::TimelinePoint => TimelinePointEntry::deserialize(entry).map(Entry::TimelinePoint).map_err(malformed),
            EntryKind::Unrecognized => Err(SkipReason::Unrecognized),
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::Legacy(_) => EntryKind::Legacy,
            Entry::PathPoint(_) => EntryKind::PathPoint,
            Entry::RawPosition(_) => EntryKind::RawPosition,
            Entry::Visit(_) => EntryKind::Visit,
            Entry::Activity(_) => EntryKind::Activity,
            Entry::TimelinePoint(_) => EntryKind::TimelinePoint,
        }
    }

    pub fn into_point(self) -> Result<Point, SkipReason> {
        let kind = self.kind();
        let point = match self {
            Entry::Legacy(e) => Some(e.into_point()),
            Entry::PathPoint(e) => e.into_point(),
            Entry::RawPosition(e) => e.into_point(),
            Entry::Visit(e) => e.into_point(),
            Entry::Activity(e) => e.into_point(),
            Entry::TimelinePoint(e) => e.into_point(),
        };
        point.ok_or(SkipReason::MissingCoordinate(kind))
    }
}

// ----------------------------------------------------------------------------
// Legacy: {"latitudeE7", "longitudeE7", "timestamp" | "timestampMs", ...}
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct LegacyEntry {
    #[serde(rename = "latitudeE7")]
    latitude_e7: f64,
    #[serde(rename = "longitudeE7")]
    longitude_e7: f64,
    #[serde(default)]
    timestamp: Value,
    #[serde(default, rename = "timestampMs")]
    timestamp_ms: Value,
    #[serde(default, deserialize_with = "lenient_f64")]
    accuracy: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    source: Option<String>,
}

impl LegacyEntry {
    // No range validation: (0, 0) is accepted
    fn into_point(self) -> Point {
        let stamp = first_truthy(&self.timestamp, &self.timestamp_ms);
        Point::new(self.latitude_e7 / E7, self.longitude_e7 / E7, self.source.unwrap_or_default())
            .with_timestamp(parse_timestamp(stamp))
            .with_accuracy(self.accuracy)
    }
}

// ----------------------------------------------------------------------------
// Path point: {"_type": "pathPoint", "point": "<lat>°, <lon>°", "time": ...}
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PathPointEntry {
    #[serde(default, deserialize_with = "lenient_string")]
    point: Option<String>,
    #[serde(default)]
    time: Value,
}

impl PathPointEntry {
    fn into_point(self) -> Option<Point> {
        let (lat, lon) = parse_coordinate_pair(self.point.as_deref().unwrap_or(""))?;
        Some(Point::new(lat, lon, "path").with_timestamp(parse_timestamp(&self.time)))
    }
}

// ----------------------------------------------------------------------------
// Raw signal position: {"_type": "rawPosition", "LatLng" | "lat"/"lng" | "latE7"/"lngE7", ...}
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPositionEntry {
    #[serde(default, rename = "LatLng", deserialize_with = "lenient_string")]
    lat_lng: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    lng: Option<f64>,
    #[serde(default, rename = "latE7", deserialize_with = "lenient_f64")]
    lat_e7: Option<f64>,
    #[serde(default, rename = "lngE7", deserialize_with = "lenient_f64")]
    lng_e7: Option<f64>,
    #[serde(default)]
    timestamp: Value,
    #[serde(default, deserialize_with = "lenient_f64")]
    accuracy_meters: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    altitude_meters: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    speed_meters_per_second: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    source: Option<String>,
}

impl RawPositionEntry {
    fn coordinates(&self) -> Option<(f64, f64)> {
        // A present LatLng is authoritative, even when it does not parse
        if let Some(text) = self.lat_lng.as_deref() {
            return parse_coordinate_pair(text);
        }

        let lat = self.lat.or(self.lat_e7.map(|v| v / E7))?;
        let lon = self.lng.or(self.lng_e7.map(|v| v / E7))?;
        Some((lat, lon))
    }

    fn into_point(self) -> Option<Point> {
        let (lat, lon) = self.coordinates()?;
        let source = format!("raw:{}", self.source.unwrap_or_default());

        Some(
            Point::new(lat, lon, source)
                .with_timestamp(parse_timestamp(&self.timestamp))
                .with_accuracy(self.accuracy_meters)
                .with_motion(self.altitude_meters, self.speed_meters_per_second),
        )
    }
}

// ----------------------------------------------------------------------------
// Visit segment: {"visit": {"topCandidate": {...}}, "startTime", "endTime"}
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitEntry {
    visit: Visit,
    #[serde(default)]
    start_time: Value,
    #[serde(default)]
    end_time: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Visit {
    #[serde(default)]
    top_candidate: VisitCandidate,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VisitCandidate {
    #[serde(default, deserialize_with = "lenient_string")]
    place_id: Option<String>,
    #[serde(default)]
    place_location: PlaceLocation,
    #[serde(default, deserialize_with = "lenient_string")]
    semantic_type: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaceLocation {
    #[serde(default, deserialize_with = "lenient_string")]
    lat_lng: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    name: Option<String>,
}

impl VisitEntry {
    fn into_point(self) -> Option<Point> {
        let candidate = self.visit.top_candidate;
        let (lat, lon) = parse_coordinate_pair(candidate.place_location.lat_lng.as_deref().unwrap_or(""))?;
        let stamp = first_truthy(&self.start_time, &self.end_time);

        Some(
            Point::new(lat, lon, "visit")
                .with_timestamp(parse_timestamp(stamp))
                .with_place(candidate.place_id, candidate.place_location.name, candidate.semantic_type),
        )
    }
}

// ----------------------------------------------------------------------------
// Activity segment: {"activity": {"start": ..., "topCandidate": {"type"}}, "startTime"}
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityEntry {
    activity: Activity,
    #[serde(default)]
    start_time: Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Activity {
    #[serde(default)]
    start: StartLocation,
    #[serde(default)]
    top_candidate: ActivityCandidate,
}

/// Activity start: either a bare "lat, lon" string or `{"latLng": "..."}`
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StartLocation {
    Text(String),
    Nested {
        #[serde(rename = "latLng")]
        lat_lng: String,
    },
    Other(IgnoredAny),
}

impl Default for StartLocation {
    fn default() -> Self {
        StartLocation::Other(IgnoredAny)
    }
}

#[derive(Debug, Default, Deserialize)]
struct ActivityCandidate {
    #[serde(default, rename = "type", deserialize_with = "lenient_string")]
    kind: Option<String>,
}

impl ActivityEntry {
    fn into_point(self) -> Option<Point> {
        let text = match &self.activity.start {
            StartLocation::Text(s) => s.as_str(),
            StartLocation::Nested { lat_lng } => lat_lng.as_str(),
            StartLocation::Other(_) => "",
        };
        let (lat, lon) = parse_coordinate_pair(text)?;

        Some(
            Point::new(lat, lon, "activity")
                .with_timestamp(parse_timestamp(&self.start_time))
                .with_activity_type(self.activity.top_candidate.kind),
        )
    }
}

// ----------------------------------------------------------------------------
// Timeline point: {"timelinePoint": {"latE7"/"lngE7" | "lat"/"lng", "timestamp", "accuracy"}}
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimelinePointEntry {
    timeline_point: TimelinePoint,
}

#[derive(Debug, Default, Deserialize)]
struct TimelinePoint {
    #[serde(default, rename = "latE7", deserialize_with = "lenient_f64")]
    lat_e7: Option<f64>,
    #[serde(default, rename = "lngE7", deserialize_with = "lenient_f64")]
    lng_e7: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    lat: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    lng: Option<f64>,
    #[serde(default)]
    timestamp: Value,
    #[serde(default, deserialize_with = "lenient_f64")]
    accuracy: Option<f64>,
}

impl TimelinePointEntry {
    fn into_point(self) -> Option<Point> {
        let tp = self.timeline_point;
        let lat = tp.lat_e7.map(|v| v / E7).or(tp.lat)?;
        let lon = tp.lng_e7.map(|v| v / E7).or(tp.lng)?;

        // latitude 0 counts as missing in this variant
        if lat == 0.0 {
            return None;
        }

        Some(
            Point::new(lat, lon, "timelinePoint")
                .with_timestamp(parse_timestamp(&tp.timestamp))
                .with_accuracy(tp.accuracy),
        )
    }
}

// ============================================================================
// HELPERS
// ============================================================================

/// First value that is not null, false, zero or an empty string
fn first_truthy<'a>(primary: &'a Value, fallback: &'a Value) -> &'a Value {
    if is_truthy(primary) {
        primary
    } else {
        fallback
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|v| v != 0.0).unwrap_or(true),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}

/// Any JSON value; numbers and numeric strings become `Some`, everything else `None`
fn lenient_f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Number(n) => Ok(n.as_f64()),
        Value::String(s) => Ok(s.trim().parse::<f64>().ok()),
        _ => Ok(None),
    }
}

/// Any JSON value; strings become `Some`, everything else `None`
fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(Some(s)),
        _ => Ok(None),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_classify_priority_legacy_wins() {
        // latitudeE7 beats every other key, even a synthetic tag
        let entry = json!({"latitudeE7": 1, "longitudeE7": 2, "_type": "pathPoint", "visit": {}});
        assert_eq!(EntryKind::classify(&entry), EntryKind::Legacy);
    }

    #[test]
    fn test_classify_visit_before_activity() {
        let entry = json!({"visit": {}, "activity": {}});
        assert_eq!(EntryKind::classify(&entry), EntryKind::Visit);
    }

    #[test]
    fn test_classify_non_object() {
        assert_eq!(EntryKind::classify(&json!([1, 2])), EntryKind::Unrecognized);
        assert_eq!(EntryKind::classify(&json!("visit")), EntryKind::Unrecognized);
    }

    #[test]
    fn test_legacy_entry() {
        let entry = json!({
            "latitudeE7": 338968768,
            "longitudeE7": 1308413181,
            "timestamp": "2023-05-01T00:00:00Z",
            "accuracy": 10,
            "source": "gps"
        });
        let point = extract_point(&entry).unwrap();

        assert!((point.lat - 33.8968768).abs() < 1e-9);
        assert!((point.lon - 130.8413181).abs() < 1e-9);
        assert_eq!(point.source, "gps");
        assert_eq!(point.accuracy, Some(10.0));
        assert_eq!(point.timestamp, Some(Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_legacy_timestamp_ms_fallback() {
        let entry = json!({"latitudeE7": 0, "longitudeE7": 0, "timestampMs": "1682899200000"});
        let point = extract_point(&entry).unwrap();

        assert_eq!(point.lat, 0.0);
        assert_eq!(point.lon, 0.0);
        assert_eq!(point.source, "");
        assert_eq!(point.timestamp, Some(Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_legacy_e7_division() {
        for (lat_e7, lon_e7) in [(-337000000_i64, 1510000000_i64), (1, -1), (900000000, -1800000000)] {
            let entry = json!({"latitudeE7": lat_e7, "longitudeE7": lon_e7});
            let point = extract_point(&entry).unwrap();
            assert_eq!(point.lat, lat_e7 as f64 / 1e7);
            assert_eq!(point.lon, lon_e7 as f64 / 1e7);
        }
    }

    #[test]
    fn test_legacy_missing_longitude_is_malformed() {
        let entry = json!({"latitudeE7": 1});
        assert_eq!(extract_point(&entry), Err(SkipReason::Malformed(EntryKind::Legacy)));
    }

    #[test]
    fn test_path_point() {
        let entry = json!({"_type": "pathPoint", "point": "35.1°, 139.2°", "time": "2024-02-01T10:00:00.000+09:00"});
        let point = extract_point(&entry).unwrap();

        assert_eq!((point.lat, point.lon), (35.1, 139.2));
        assert_eq!(point.source, "path");
        assert_eq!(point.accuracy, None);
        assert_eq!(point.timestamp, Some(Utc.with_ymd_and_hms(2024, 2, 1, 1, 0, 0).unwrap()));
    }

    #[test]
    fn test_path_point_bad_coordinate_does_not_fall_through() {
        // Carries a visit too, but the path rule already matched
        let entry = json!({
            "_type": "pathPoint",
            "point": "garbage",
            "visit": {"topCandidate": {"placeLocation": {"latLng": "1°, 2°"}}}
        });
        assert_eq!(extract_point(&entry), Err(SkipReason::MissingCoordinate(EntryKind::PathPoint)));
    }

    #[test]
    fn test_raw_position_latlng_string() {
        let entry = json!({
            "_type": "rawPosition",
            "LatLng": "31.589°, 130.551°",
            "accuracyMeters": 13,
            "altitudeMeters": 42.5,
            "speedMetersPerSecond": 1.25,
            "source": "WIFI",
            "timestamp": "2024-03-01T00:00:00Z"
        });
        let point = extract_point(&entry).unwrap();

        assert_eq!((point.lat, point.lon), (31.589, 130.551));
        assert_eq!(point.source, "raw:WIFI");
        assert_eq!(point.accuracy, Some(13.0));
        assert_eq!(point.altitude, Some(42.5));
        assert_eq!(point.speed, Some(1.25));
    }

    #[test]
    fn test_raw_position_numeric_fields() {
        let entry = json!({"_type": "rawPosition", "lat": 10.5, "lng": 20.25});
        let point = extract_point(&entry).unwrap();
        assert_eq!((point.lat, point.lon), (10.5, 20.25));
        assert_eq!(point.source, "raw:");

        let entry = json!({"_type": "rawPosition", "latE7": 105000000, "lngE7": 202500000});
        let point = extract_point(&entry).unwrap();
        assert_eq!((point.lat, point.lon), (10.5, 20.25));
    }

    #[test]
    fn test_raw_position_bad_latlng_no_fallback() {
        let entry = json!({"_type": "rawPosition", "LatLng": "garbage", "lat": 1.0, "lng": 2.0});
        assert_eq!(extract_point(&entry), Err(SkipReason::MissingCoordinate(EntryKind::RawPosition)));
    }

    #[test]
    fn test_raw_position_without_coordinate() {
        let entry = json!({"_type": "rawPosition", "accuracyMeters": 5});
        assert_eq!(extract_point(&entry), Err(SkipReason::MissingCoordinate(EntryKind::RawPosition)));
    }

    #[test]
    fn test_visit_segment() {
        let entry = json!({
            "visit": {
                "topCandidate": {
                    "placeId": "p1",
                    "placeLocation": {"latLng": "33.5°, 130.5°", "name": "Home"},
                    "semanticType": "HOME"
                }
            },
            "startTime": "2023-01-01T00:00:00Z"
        });
        let point = extract_point(&entry).unwrap();

        assert_eq!((point.lat, point.lon), (33.5, 130.5));
        assert_eq!(point.source, "visit");
        assert_eq!(point.place_id.as_deref(), Some("p1"));
        assert_eq!(point.place_name.as_deref(), Some("Home"));
        assert_eq!(point.semantic_type.as_deref(), Some("HOME"));
        assert_eq!(point.accuracy, None);
    }

    #[test]
    fn test_visit_end_time_fallback() {
        let entry = json!({
            "visit": {"topCandidate": {"placeLocation": {"latLng": "1.0, 2.0"}}},
            "endTime": "2023-01-02T00:00:00Z"
        });
        let point = extract_point(&entry).unwrap();
        assert_eq!(point.timestamp, Some(Utc.with_ymd_and_hms(2023, 1, 2, 0, 0, 0).unwrap()));
    }

    #[test]
    fn test_visit_without_location() {
        let entry = json!({"visit": {"topCandidate": {"placeId": "p1"}}});
        assert_eq!(extract_point(&entry), Err(SkipReason::MissingCoordinate(EntryKind::Visit)));
    }

    #[test]
    fn test_activity_string_start() {
        let entry = json!({
            "activity": {"start": "geo:35.0,135.0", "topCandidate": {"type": "IN_BUS"}},
            "startTime": "2023-06-01T08:00:00Z"
        });
        let point = extract_point(&entry).unwrap();

        assert_eq!((point.lat, point.lon), (35.0, 135.0));
        assert_eq!(point.source, "activity");
        assert_eq!(point.activity_type.as_deref(), Some("IN_BUS"));
    }

    #[test]
    fn test_activity_nested_start() {
        let entry = json!({"activity": {"start": {"latLng": "35.5°, 135.5°"}}});
        let point = extract_point(&entry).unwrap();
        assert_eq!((point.lat, point.lon), (35.5, 135.5));
        assert_eq!(point.activity_type, None);
    }

    #[test]
    fn test_activity_without_start() {
        let entry = json!({"activity": {"topCandidate": {"type": "WALKING"}}});
        assert_eq!(extract_point(&entry), Err(SkipReason::MissingCoordinate(EntryKind::Activity)));

        let entry = json!({"activity": {"start": 42}});
        assert_eq!(extract_point(&entry), Err(SkipReason::MissingCoordinate(EntryKind::Activity)));
    }

    #[test]
    fn test_timeline_point() {
        let entry = json!({"timelinePoint": {"latE7": 350000000, "lngE7": 1390000000, "accuracy": 20}});
        let point = extract_point(&entry).unwrap();
        assert_eq!((point.lat, point.lon), (35.0, 139.0));
        assert_eq!(point.source, "timelinePoint");
        assert_eq!(point.accuracy, Some(20.0));

        let entry = json!({"timelinePoint": {"lat": 35.25, "lng": 139.5}});
        let point = extract_point(&entry).unwrap();
        assert_eq!((point.lat, point.lon), (35.25, 139.5));
    }

    #[test]
    fn test_numeric_strings_are_accepted() {
        let entry = json!({"latitudeE7": 1, "longitudeE7": 2, "accuracy": "10"});
        assert_eq!(extract_point(&entry).unwrap().accuracy, Some(10.0));

        let entry = json!({"timelinePoint": {"lat": "35.5", "lng": " 139.5 "}});
        let point = extract_point(&entry).unwrap();
        assert_eq!((point.lat, point.lon), (35.5, 139.5));

        let entry = json!({"timelinePoint": {"lat": "north", "lng": "139.5"}});
        assert_eq!(extract_point(&entry), Err(SkipReason::MissingCoordinate(EntryKind::TimelinePoint)));
    }

    #[test]
    fn test_timeline_point_zero_latitude_rejected() {
        let entry = json!({"timelinePoint": {"lat": 0, "lng": 139.5}});
        assert_eq!(extract_point(&entry), Err(SkipReason::MissingCoordinate(EntryKind::TimelinePoint)));
    }

    #[test]
    fn test_unrecognized_entry() {
        let entry = json!({"placeVisit": {"location": {}}});
        assert_eq!(extract_point(&entry), Err(SkipReason::Unrecognized));
    }

    #[test]
    fn test_skip_reason_display() {
        assert_eq!(SkipReason::Unrecognized.to_string(), "unrecognized entry");
        assert_eq!(
            SkipReason::MissingCoordinate(EntryKind::Visit).to_string(),
            "visit entry without coordinate"
        );
    }
}
