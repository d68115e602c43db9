// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Computed goal progress snapshots. Never persisted.

use rust_decimal::Decimal;
use serde::Serialize;

/// Pace difference (percentage points) still reported as on track.
pub const ON_TRACK_TOLERANCE: f64 = 2.0;

/// Average days per month used for monthly pacing.
pub const AVERAGE_DAYS_PER_MONTH: f64 = 30.44;

/// Whether progress is ahead of, behind, or level with elapsed time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PaceStatus {
    Ahead,
    Behind,
    OnTrack,
}

impl PaceStatus {
    /// Classify a pace difference; `|diff| <= 2.0` is on track.
    pub fn classify(pace_difference: f64) -> Self {
        if pace_difference.abs() <= ON_TRACK_TOLERANCE {
            PaceStatus::OnTrack
        } else if pace_difference > 0.0 {
            PaceStatus::Ahead
        } else {
            PaceStatus::Behind
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaceStatus::Ahead => "ahead",
            PaceStatus::Behind => "behind",
            PaceStatus::OnTrack => "on_track",
        }
    }
}

/// Progress and pacing for one goal at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GoalProgress {
    /// Target, in `unit`
    pub target: Decimal,
    /// Progress so far, in `unit`
    pub current: Decimal,
    /// Display unit for `target`, `current` and the pacing targets
    pub unit: String,
    pub days_passed: i64,
    pub days_remaining: i64,
    pub total_days: i64,
    pub percent_elapsed: f64,
    pub percent_goal_completed: f64,
    pub status: PaceStatus,
    pub pace_difference: f64,
    pub daily_target: f64,
    pub weekly_target: f64,
    pub monthly_target: f64,
}
