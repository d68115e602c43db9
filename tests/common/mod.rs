// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use chrono::NaiveDate;
use eddington_tracker::models::Ride;
use eddington_tracker::store::{RideCache, SettingsStore};
use eddington_tracker::services::DistanceUnit;
use std::path::Path;

pub const METERS_PER_MILE: f64 = 1609.344;

/// Ride with an id, a distance in meters and a departure time.
#[allow(dead_code)]
pub fn ride(id: u64, meters: f64, departed_at: &str) -> Ride {
    Ride {
        id: Some(id),
        distance: Some(meters),
        departed_at: Some(departed_at.to_string()),
        name: Some(format!("Ride {id}")),
        ..Default::default()
    }
}

/// Ride of a whole number of kilometers on a given day.
#[allow(dead_code)]
pub fn km_ride(id: u64, km: u32, day: &str) -> Ride {
    ride(id, f64::from(km) * 1000.0, &format!("{day}T08:00:00Z"))
}

/// Ride of a whole number of miles on a given day.
#[allow(dead_code)]
pub fn mile_ride(id: u64, miles: u32, day: &str) -> Ride {
    ride(id, f64::from(miles) * METERS_PER_MILE, &format!("{day}T08:00:00Z"))
}

#[allow(dead_code)]
pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Settings store in a temp directory.
#[allow(dead_code)]
pub fn settings_in(dir: &Path) -> SettingsStore {
    SettingsStore::open(dir.join(".goal_config.json"), DistanceUnit::Miles)
}

/// Ride cache in a temp directory.
#[allow(dead_code)]
pub fn cache_in(dir: &Path) -> RideCache {
    RideCache::new(dir.join("rwgps_cache.json"))
}
