// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Application error types.

use crate::config::ConfigError;
use crate::models::goal::GoalError;
use crate::services::units::UnitError;

/// Application error type shared by the collaborators and the CLI.
///
/// The calculation engine itself never fails on imperfect ride data; only
/// I/O, network and invalid goal construction surface here.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Authentication required")]
    Unauthorized,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("RWGPS API error: {0}")]
    RwgpsApi(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error(transparent)]
    Goal(#[from] GoalError),

    #[error(transparent)]
    Unit(#[from] UnitError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    /// Message used when RWGPS answers 429.
    pub const RWGPS_RATE_LIMIT: &'static str = "Rate limit exceeded";
    /// Message used when RWGPS rejects the auth token.
    pub const RWGPS_TOKEN_ERROR: &'static str = "Invalid or expired auth token";

    /// Whether this error means the stored auth token should be discarded.
    pub fn is_rwgps_token_error(&self) -> bool {
        match self {
            AppError::Unauthorized => true,
            AppError::RwgpsApi(msg) => {
                let msg = msg.to_ascii_lowercase();
                msg.contains("token") && (msg.contains("invalid") || msg.contains("expired"))
            }
            _ => false,
        }
    }

    /// Whether this error came from the rate limiter.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, AppError::RwgpsApi(msg) if msg == Self::RWGPS_RATE_LIMIT)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(format!("JSON error: {}", err))
    }
}

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, AppError>;
