// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Local JSON cache of the ride history.
//!
//! Rides are stored in meters, so one cache serves both display units. Older
//! versions kept one cache per unit (`<stem>_miles.json`, `<stem>_km.json`);
//! those are migrated on first load.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::ride::Ride;

const LEGACY_UNITS: [&str; 2] = ["miles", "km"];

/// Contents of the cache file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheData {
    pub trips: Vec<Ride>,
    /// Unix seconds when the cache was written
    #[serde(default)]
    pub timestamp: i64,
}

/// File metadata for the `status` command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheInfo {
    pub exists: bool,
    pub path: PathBuf,
    pub size: u64,
    pub last_modified: Option<DateTime<Utc>>,
}

/// Ride cache stored at a single path.
#[derive(Debug, Clone)]
pub struct RideCache {
    path: PathBuf,
}

impl RideCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the cache, falling back to (and migrating) a per-unit legacy file.
    ///
    /// Missing or unreadable files yield `None`; a corrupt cache is treated
    /// like an empty one and refetched.
    pub fn load(&self) -> Option<CacheData> {
        if self.path.exists() {
            return read_cache(&self.path);
        }

        let best = self
            .legacy_paths()
            .into_iter()
            .filter_map(|path| read_cache(&path).map(|data| (path, data)))
            .max_by_key(|(_, data)| data.trips.len());

        let (legacy_path, data) = best?;
        tracing::info!(
            from = %legacy_path.display(),
            to = %self.path.display(),
            rides = data.trips.len(),
            "Migrating legacy ride cache"
        );
        if let Err(e) = write_cache(&self.path, &data) {
            tracing::warn!(error = %e, "Failed to migrate legacy ride cache");
        }
        Some(data)
    }

    /// Replace the cached rides, stamping the current time.
    pub fn save(&self, rides: &[Ride]) -> Result<()> {
        let data = CacheData {
            trips: rides.to_vec(),
            timestamp: Utc::now().timestamp(),
        };
        write_cache(&self.path, &data)?;
        tracing::info!(path = %self.path.display(), rides = rides.len(), "Ride cache saved");
        Ok(())
    }

    /// Delete the cache file. Returns whether there was one.
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn info(&self) -> CacheInfo {
        let metadata = fs::metadata(&self.path).ok();
        CacheInfo {
            exists: metadata.is_some(),
            path: self.path.clone(),
            size: metadata.as_ref().map(|m| m.len()).unwrap_or(0),
            last_modified: metadata
                .and_then(|m| m.modified().ok())
                .map(DateTime::<Utc>::from),
        }
    }

    /// `<stem>_<unit>.<ext>` next to the cache file.
    fn legacy_paths(&self) -> Vec<PathBuf> {
        let stem = self
            .path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let ext = self
            .path
            .extension()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "json".to_string());

        LEGACY_UNITS
            .iter()
            .map(|unit| self.path.with_file_name(format!("{stem}_{unit}.{ext}")))
            .collect()
    }
}

fn read_cache(path: &Path) -> Option<CacheData> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::error!(path = %path.display(), error = %e, "Failed to read ride cache");
            }
            return None;
        }
    };
    match serde_json::from_str(&contents) {
        Ok(data) => {
            tracing::debug!(path = %path.display(), "Loaded ride cache");
            Some(data)
        }
        Err(e) => {
            tracing::error!(path = %path.display(), error = %e, "Ride cache is corrupt");
            None
        }
    }
}

fn write_cache(path: &Path, data: &CacheData) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_vec(data)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_legacy_paths() {
        let cache = RideCache::new("/tmp/data/rwgps_cache.json");
        assert_eq!(
            cache.legacy_paths(),
            vec![
                PathBuf::from("/tmp/data/rwgps_cache_miles.json"),
                PathBuf::from("/tmp/data/rwgps_cache_km.json"),
            ]
        );
    }
}
