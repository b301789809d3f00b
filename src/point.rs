// 📌 Point - normalized, schema-independent location record
//
// Core fields (lat, lon, source) are always present.
// Everything else depends on which export variant produced the point.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Column order of the tabular export
pub const CSV_HEADER: [&str; 10] = [
    "timestamp",
    "lat",
    "lon",
    "accuracy",
    "source",
    "place_id",
    "semantic_type",
    "activity_type",
    "altitude",
    "speed",
];

/// Timestamp layout used in the tabular export
pub const CSV_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%z";

/// Point - Output of extract_point()
///
/// Immutable once built: created per entry, consumed by one downstream pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    // Core fields
    pub timestamp: Option<DateTime<Utc>>,
    pub lat: f64,
    pub lon: f64,
    pub accuracy: Option<f64>,
    pub source: String,

    // Visit
    pub place_id: Option<String>,
    pub place_name: Option<String>,
    pub semantic_type: Option<String>,

    // Activity
    pub activity_type: Option<String>,

    // Raw signal
    pub altitude: Option<f64>,
    pub speed: Option<f64>,
}

impl Point {
    /// Create a new Point with required fields
    pub fn new(lat: f64, lon: f64, source: impl Into<String>) -> Self {
        Point {
            timestamp: None,
            lat,
            lon,
            accuracy: None,
            source: source.into(),
            place_id: None,
            place_name: None,
            semantic_type: None,
            activity_type: None,
            altitude: None,
            speed: None,
        }
    }

    /// Builder pattern: add optional timestamp
    pub fn with_timestamp(mut self, timestamp: Option<DateTime<Utc>>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Builder pattern: add optional accuracy (meters)
    pub fn with_accuracy(mut self, accuracy: Option<f64>) -> Self {
        self.accuracy = accuracy;
        self
    }

    /// Builder pattern: add visit place details
    pub fn with_place(
        mut self,
        place_id: Option<String>,
        place_name: Option<String>,
        semantic_type: Option<String>,
    ) -> Self {
        self.place_id = place_id;
        self.place_name = place_name;
        self.semantic_type = semantic_type;
        self
    }

    /// Builder pattern: add activity type
    pub fn with_activity_type(mut self, activity_type: Option<String>) -> Self {
        self.activity_type = activity_type;
        self
    }

    /// Builder pattern: add raw-signal motion details
    pub fn with_motion(mut self, altitude: Option<f64>, speed: Option<f64>) -> Self {
        self.altitude = altitude;
        self.speed = speed;
        self
    }

    /// Timestamp in export layout, empty when absent
    pub fn timestamp_string(&self) -> String {
        self.timestamp
            .map(|ts| ts.format(CSV_TIMESTAMP_FORMAT).to_string())
            .unwrap_or_default()
    }

    /// One CSV row in `CSV_HEADER` order; absent fields become empty strings
    pub fn to_csv_row(&self) -> [String; 10] {
        [
            self.timestamp_string(),
            self.lat.to_string(),
            self.lon.to_string(),
            opt_to_string(self.accuracy),
            self.source.clone(),
            self.place_id.clone().unwrap_or_default(),
            self.semantic_type.clone().unwrap_or_default(),
            self.activity_type.clone().unwrap_or_default(),
            opt_to_string(self.altitude),
            opt_to_string(self.speed),
        ]
    }
}

fn opt_to_string(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// LocationRecord - one row of the tabular export, as posted to the API
///
/// Empty CSV cells are `None` and serialize as JSON `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub timestamp: Option<String>,
    pub lat: f64,
    pub lon: f64,
    pub accuracy: Option<f64>,
    pub source: Option<String>,
    pub place_id: Option<String>,
    pub semantic_type: Option<String>,
    pub activity_type: Option<String>,
    pub altitude: Option<f64>,
    pub speed: Option<f64>,
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_point_builder() {
        let ts = Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap();
        let point = Point::new(33.5, 130.5, "visit")
            .with_timestamp(Some(ts))
            .with_place(Some("p1".to_string()), Some("Home".to_string()), Some("HOME".to_string()));

        assert_eq!(point.lat, 33.5);
        assert_eq!(point.source, "visit");
        assert_eq!(point.place_name, Some("Home".to_string()));
        assert_eq!(point.accuracy, None);
        assert_eq!(point.timestamp, Some(ts));
    }

    #[test]
    fn test_csv_row_order_and_blanks() {
        let ts = Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap();
        let point = Point::new(33.8968768, 130.8413181, "gps")
            .with_timestamp(Some(ts))
            .with_accuracy(Some(10.0));

        let row = point.to_csv_row();
        assert_eq!(row[0], "2023-05-01T00:00:00+0000");
        assert_eq!(row[1], "33.8968768");
        assert_eq!(row[2], "130.8413181");
        assert_eq!(row[3], "10");
        assert_eq!(row[4], "gps");
        assert!(row[5..].iter().all(|cell| cell.is_empty()));
    }

    #[test]
    fn test_csv_row_without_timestamp() {
        let point = Point::new(1.0, 2.0, "path");
        assert_eq!(point.to_csv_row()[0], "");
    }
}
