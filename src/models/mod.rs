// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod goal;
pub mod progress;
pub mod ride;
pub mod stats;

pub use goal::{Goal, GoalDefinition, GoalError, GoalType, LegacyGoal, NewGoal, WindowState};
pub use progress::{GoalProgress, PaceStatus};
pub use ride::Ride;
pub use stats::{EddingtonProgress, RideMetrics, RideStatistics, YearSummary, YearlyTarget};
