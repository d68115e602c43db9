// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

mod common;

use common::{cache_in, km_ride};
use eddington_tracker::error::{AppError, Result};
use eddington_tracker::models::Ride;
use eddington_tracker::services::{RideSource, RideSync};
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory account, newest ride first.
#[derive(Default)]
struct FakeAccount {
    rides: Vec<Ride>,
    fail_latest: Option<&'static str>,
    full_fetches: AtomicUsize,
    missing_fetches: AtomicUsize,
}

impl FakeAccount {
    fn with_rides(ids: &[u64]) -> Self {
        Self {
            rides: ids.iter().map(|id| km_ride(*id, 20, "2025-05-01")).collect(),
            ..Default::default()
        }
    }
}

impl RideSource for FakeAccount {
    async fn latest_ride(&self) -> Result<Option<Ride>> {
        if let Some(msg) = self.fail_latest {
            return Err(AppError::RwgpsApi(msg.to_string()));
        }
        Ok(self.rides.first().cloned())
    }

    async fn all_rides(&self) -> Result<Vec<Ride>> {
        self.full_fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.rides.clone())
    }

    async fn missing_rides(&self, cached: &[Ride], _latest: &Ride) -> Result<Vec<Ride>> {
        self.missing_fetches.fetch_add(1, Ordering::SeqCst);
        let newest = cached.iter().filter_map(|r| r.id).max().unwrap_or(0);
        Ok(self
            .rides
            .iter()
            .filter(|r| r.id.is_some_and(|id| id > newest))
            .cloned()
            .collect())
    }
}

fn ids(rides: &[Ride]) -> Vec<u64> {
    rides.iter().filter_map(|r| r.id).collect()
}

#[tokio::test]
async fn test_empty_cache_fetches_everything() {
    let dir = tempfile::tempdir().unwrap();
    let cache = cache_in(dir.path());
    let account = FakeAccount::with_rides(&[3, 2, 1]);

    let rides = RideSync::new(&account, &cache).update(false).await.unwrap();
    assert_eq!(ids(&rides), vec![3, 2, 1]);
    assert_eq!(account.full_fetches.load(Ordering::SeqCst), 1);
    assert_eq!(ids(&cache.load().unwrap().trips), vec![3, 2, 1]);
}

#[tokio::test]
async fn test_new_rides_are_merged_in_front() {
    let dir = tempfile::tempdir().unwrap();
    let cache = cache_in(dir.path());
    cache
        .save(&[km_ride(2, 20, "2025-04-01"), km_ride(1, 20, "2025-03-01")])
        .unwrap();
    let account = FakeAccount::with_rides(&[4, 3, 2, 1]);

    let rides = RideSync::new(&account, &cache).update(false).await.unwrap();
    assert_eq!(ids(&rides), vec![4, 3, 2, 1]);
    assert_eq!(account.full_fetches.load(Ordering::SeqCst), 0);
    assert_eq!(account.missing_fetches.load(Ordering::SeqCst), 1);
    assert_eq!(ids(&cache.load().unwrap().trips), vec![4, 3, 2, 1]);
}

#[tokio::test]
async fn test_up_to_date_cache_is_reused() {
    let dir = tempfile::tempdir().unwrap();
    let cache = cache_in(dir.path());
    cache.save(&[km_ride(2, 20, "2025-04-01")]).unwrap();
    let account = FakeAccount::with_rides(&[2]);

    let rides = RideSync::new(&account, &cache).update(false).await.unwrap();
    assert_eq!(ids(&rides), vec![2]);
    assert_eq!(account.missing_fetches.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_refresh_ignores_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cache = cache_in(dir.path());
    cache.save(&[km_ride(9, 20, "2025-04-01")]).unwrap();
    let account = FakeAccount::with_rides(&[2, 1]);

    let rides = RideSync::new(&account, &cache).update(true).await.unwrap();
    assert_eq!(ids(&rides), vec![2, 1]);
    assert_eq!(account.full_fetches.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_network_failure_falls_back_to_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cache = cache_in(dir.path());
    cache.save(&[km_ride(5, 20, "2025-04-01")]).unwrap();
    let account = FakeAccount {
        fail_latest: Some("connection reset"),
        ..FakeAccount::with_rides(&[6, 5])
    };

    let rides = RideSync::new(&account, &cache).update(false).await.unwrap();
    assert_eq!(ids(&rides), vec![5]);
}

#[tokio::test]
async fn test_token_error_is_not_masked_by_cache() {
    let dir = tempfile::tempdir().unwrap();
    let cache = cache_in(dir.path());
    cache.save(&[km_ride(5, 20, "2025-04-01")]).unwrap();
    let account = FakeAccount {
        fail_latest: Some(AppError::RWGPS_TOKEN_ERROR),
        ..FakeAccount::with_rides(&[6, 5])
    };

    let err = RideSync::new(&account, &cache)
        .update(false)
        .await
        .unwrap_err();
    assert!(err.is_rwgps_token_error());
}
