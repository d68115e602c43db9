// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! File-backed persistence: ride cache, goal settings and credentials.

pub mod cache;
pub mod credentials;
pub mod settings;

pub use cache::{CacheData, CacheInfo, RideCache};
pub use credentials::{CredentialSource, CredentialStore, Credentials};
pub use settings::SettingsStore;
