#![cfg(feature = "api")]
//! Sync client tests that touch the filesystem: config files and dry-run batches.

use location_history::config::{Config, DEFAULT_API_URL};
use location_history::sync::batch_file_name;
use location_history::{read_records, write_batches};
use serde_json::Value;
use std::fs;
use std::time::Duration;
use tempfile::tempdir;

const CSV: &str = "timestamp,lat,lon,accuracy,source,place_id,semantic_type,activity_type,altitude,speed\n\
2023-05-01T00:00:00+0000,33.5,130.5,10,gps,,,,,\n\
2023-05-01T00:01:00+0000,33.6,130.6,,visit,p1,HOME,,,\n\
,33.7,130.7,,path,,,,,\n";

#[test]
fn test_config_from_file() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("location-sync.toml");
    fs::write(
        &path,
        "[api]\ntoken = \"secret\"\n\n[backfill]\ndelay_secs = 2.0\nretry_multiplier = 3.0\n",
    )
    .unwrap();

    let config = Config::load(Some(path.as_path())).unwrap();

    assert_eq!(config.api.url, DEFAULT_API_URL);
    assert_eq!(config.api.token.as_deref(), Some("secret"));
    assert_eq!(config.import.chunk_size, 500);
    assert_eq!(config.backfill.retry_delay(), Duration::from_secs(6));
}

#[test]
fn test_config_missing_explicit_file() {
    let dir = tempdir().unwrap();
    let err = Config::load(Some(dir.path().join("absent.toml").as_path())).unwrap_err();
    assert!(format!("{:#}", err).contains("absent.toml"));
}

#[test]
fn test_config_invalid_toml() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(&path, "[import]\nchunk_size = \"many\"\n").unwrap();
    assert!(Config::from_file(&path).is_err());
}

#[test]
fn test_dry_run_batches() {
    let dir = tempdir().unwrap();
    let csv_path = dir.path().join("locations.csv");
    fs::write(&csv_path, CSV).unwrap();

    let records = read_records(&csv_path).unwrap();
    let out_dir = dir.path().join("chunks");
    let written = write_batches(&out_dir, &records, 2).unwrap();

    assert_eq!(written.len(), 2);
    assert_eq!(written[0].path, out_dir.join(batch_file_name(0)));
    assert_eq!(written[1].entries, 1);

    let first: Value = serde_json::from_slice(&fs::read(&written[0].path).unwrap()).unwrap();
    let locations = first["locations"].as_array().unwrap();
    assert_eq!(locations.len(), 2);
    assert_eq!(locations[0]["lat"], 33.5);
    assert_eq!(locations[0]["place_id"], Value::Null);
    assert_eq!(locations[1]["semantic_type"], "HOME");

    for chunk in &written {
        assert_eq!(fs::metadata(&chunk.path).unwrap().len() as usize, chunk.size_bytes);
    }

    let second: Value = serde_json::from_slice(&fs::read(&written[1].path).unwrap()).unwrap();
    assert_eq!(second["locations"][0]["timestamp"], Value::Null);
}
