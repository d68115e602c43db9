// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

mod common;

use common::{cache_in, km_ride};
use eddington_tracker::store::CacheData;
use std::fs;

fn write_legacy(path: &std::path::Path, count: u64) {
    let data = CacheData {
        trips: (0..count).map(|i| km_ride(i, 10, "2024-01-01")).collect(),
        timestamp: 1_700_000_000,
    };
    fs::write(path, serde_json::to_string(&data).unwrap()).unwrap();
}

#[test]
fn test_save_load_clear() {
    let dir = tempfile::tempdir().unwrap();
    let cache = cache_in(dir.path());
    assert!(cache.load().is_none());
    assert!(!cache.info().exists);

    let rides = vec![km_ride(1, 42, "2025-01-01"), km_ride(2, 21, "2025-01-02")];
    cache.save(&rides).unwrap();

    let data = cache.load().unwrap();
    assert_eq!(data.trips, rides);
    assert!(data.timestamp > 0);

    let info = cache.info();
    assert!(info.exists);
    assert!(info.size > 0);
    assert!(info.last_modified.is_some());

    assert!(cache.clear().unwrap());
    assert!(!cache.clear().unwrap());
    assert!(cache.load().is_none());
}

#[test]
fn test_largest_legacy_cache_is_migrated() {
    let dir = tempfile::tempdir().unwrap();
    write_legacy(&dir.path().join("rwgps_cache_miles.json"), 3);
    write_legacy(&dir.path().join("rwgps_cache_km.json"), 5);

    let cache = cache_in(dir.path());
    let data = cache.load().unwrap();
    assert_eq!(data.trips.len(), 5);

    // The shared file now exists and wins on the next load.
    assert!(cache.exists());
    write_legacy(&dir.path().join("rwgps_cache_miles.json"), 9);
    assert_eq!(cache.load().unwrap().trips.len(), 5);
}

#[test]
fn test_corrupt_cache_loads_as_none() {
    let dir = tempfile::tempdir().unwrap();
    let cache = cache_in(dir.path());
    fs::write(cache.path(), "not json").unwrap();
    assert!(cache.load().is_none());
}

#[test]
fn test_unknown_ride_fields_survive_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let cache = cache_in(dir.path());
    fs::write(
        cache.path(),
        r#"{"trips": [{"id": 7, "distance": "1234.5", "departed_at": "2025-01-01T08:00:00Z",
            "avg_speed": 21.3}], "timestamp": 1}"#,
    )
    .unwrap();

    let trips = cache.load().unwrap().trips;
    assert_eq!(trips[0].distance, Some(1234.5));
    cache.save(&trips).unwrap();

    let raw = fs::read_to_string(cache.path()).unwrap();
    assert!(raw.contains("avg_speed"));
}
