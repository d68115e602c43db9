// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is read first if present.

use std::env;
use std::path::PathBuf;

use crate::services::units::DistanceUnit;

pub const DEFAULT_BASE_URL: &str = "https://ridewithgps.com/api/v1";
pub const DEFAULT_CACHE_FILE: &str = "rwgps_cache.json";
pub const DEFAULT_SETTINGS_FILE: &str = ".goal_config.json";
pub const DEFAULT_CREDENTIALS_FILE: &str = "credentials.json";

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    /// RWGPS API key; only needed for commands that fetch rides
    pub api_key: Option<String>,
    /// Account email, overrides the credentials file
    pub email: Option<String>,
    /// Account password, overrides the credentials file
    pub password: Option<String>,
    /// RWGPS API base URL
    pub base_url: String,
    /// Ride cache file
    pub cache_file: PathBuf,
    /// Goal and unit settings file
    pub settings_file: PathBuf,
    /// Saved email/password file
    pub credentials_file: PathBuf,
    /// Unit used until the user picks one
    pub default_unit: DistanceUnit,
}

impl Default for Config {
    /// Default config for testing only.
    fn default() -> Self {
        Self {
            api_key: None,
            email: None,
            password: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            cache_file: PathBuf::from(DEFAULT_CACHE_FILE),
            settings_file: PathBuf::from(DEFAULT_SETTINGS_FILE),
            credentials_file: PathBuf::from(DEFAULT_CREDENTIALS_FILE),
            default_unit: DistanceUnit::Miles,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let default_unit = match non_empty_var("EDDINGTON_DEFAULT_UNIT") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                var: "EDDINGTON_DEFAULT_UNIT",
                value,
            })?,
            None => DistanceUnit::Miles,
        };

        Ok(Self {
            api_key: non_empty_var("RWGPS_API_KEY"),
            email: non_empty_var("RWGPS_EMAIL"),
            password: env::var("RWGPS_PASSWORD").ok().filter(|v| !v.is_empty()),
            base_url: non_empty_var("RWGPS_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            cache_file: non_empty_var("EDDINGTON_CACHE_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CACHE_FILE)),
            settings_file: non_empty_var("EDDINGTON_SETTINGS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_FILE)),
            credentials_file: non_empty_var("EDDINGTON_CREDENTIALS_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CREDENTIALS_FILE)),
            default_unit,
        })
    }

    /// API key, required before talking to RWGPS.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .ok_or(ConfigError::Missing("RWGPS_API_KEY"))
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {value}")]
    Invalid { var: &'static str, value: String },
}
