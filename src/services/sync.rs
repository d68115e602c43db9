// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Keeps the local ride cache in step with RWGPS.

use std::collections::HashSet;
use std::future::Future;

use crate::error::Result;
use crate::models::ride::Ride;
use crate::services::rwgps::RwgpsClient;
use crate::store::cache::RideCache;

/// Where rides come from. Implemented by [`RwgpsClient`].
pub trait RideSource {
    /// Newest ride on the account.
    fn latest_ride(&self) -> impl Future<Output = Result<Option<Ride>>> + Send;

    /// Every ride on the account.
    fn all_rides(&self) -> impl Future<Output = Result<Vec<Ride>>> + Send;

    /// Rides newer than anything in `cached`.
    fn missing_rides(
        &self,
        cached: &[Ride],
        latest: &Ride,
    ) -> impl Future<Output = Result<Vec<Ride>>> + Send;
}

impl RideSource for RwgpsClient {
    async fn latest_ride(&self) -> Result<Option<Ride>> {
        self.get_latest_trip().await
    }

    async fn all_rides(&self) -> Result<Vec<Ride>> {
        self.get_all_trips().await
    }

    async fn missing_rides(&self, cached: &[Ride], latest: &Ride) -> Result<Vec<Ride>> {
        self.get_missing_trips(cached, latest).await
    }
}

/// Brings the cache up to date from a [`RideSource`].
pub struct RideSync<'a, S> {
    source: &'a S,
    cache: &'a RideCache,
}

impl<'a, S: RideSource> RideSync<'a, S> {
    pub fn new(source: &'a S, cache: &'a RideCache) -> Self {
        Self { source, cache }
    }

    /// Current ride history.
    ///
    /// With `refresh` or an empty cache everything is fetched. Otherwise only
    /// rides newer than the newest cached one are fetched and merged in. If
    /// the incremental fetch fails the cached rides are returned as-is,
    /// except for auth token errors, which the caller has to handle.
    pub async fn update(&self, refresh: bool) -> Result<Vec<Ride>> {
        let cached = if refresh {
            None
        } else {
            self.cache.load().map(|data| data.trips)
        };

        let cached = match cached {
            Some(trips) if !trips.is_empty() => trips,
            _ => return self.fetch_all().await,
        };

        match self.fetch_new(&cached).await {
            Ok(Some(rides)) => Ok(rides),
            Ok(None) => {
                tracing::info!(count = cached.len(), "Ride cache is up to date");
                Ok(cached)
            }
            Err(e) if e.is_rwgps_token_error() => Err(e),
            Err(e) => {
                tracing::warn!(error = %e, "Could not check for new rides, using cache");
                Ok(cached)
            }
        }
    }

    async fn fetch_all(&self) -> Result<Vec<Ride>> {
        tracing::info!("Fetching full ride history");
        let rides = self.source.all_rides().await?;
        self.cache.save(&rides)?;
        Ok(rides)
    }

    /// Merged history if there were new rides, `None` if nothing changed.
    async fn fetch_new(&self, cached: &[Ride]) -> Result<Option<Vec<Ride>>> {
        let Some(latest) = self.source.latest_ride().await? else {
            return Ok(None);
        };
        let newest_cached = cached.iter().filter_map(|r| r.id).max();
        let is_newer = match (latest.id, newest_cached) {
            (Some(latest_id), Some(cached_id)) => latest_id > cached_id,
            (Some(_), None) => true,
            (None, _) => false,
        };
        if !is_newer {
            return Ok(None);
        }

        let missing = self.source.missing_rides(cached, &latest).await?;
        if missing.is_empty() {
            return Ok(None);
        }
        tracing::info!(new = missing.len(), "Merging new rides into cache");

        let merged = merge_rides(missing, cached);
        self.cache.save(&merged)?;
        Ok(Some(merged))
    }
}

/// New rides first, then cached ones; later duplicates of an id are dropped.
/// Rides without an id are always kept.
pub fn merge_rides(new: Vec<Ride>, cached: &[Ride]) -> Vec<Ride> {
    let mut seen = HashSet::new();
    new.into_iter()
        .chain(cached.iter().cloned())
        .filter(|ride| ride.id.is_none_or(|id| seen.insert(id)))
        .collect()
}
