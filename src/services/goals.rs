// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Goal progress and pacing.
//!
//! Every goal type reduces to a [`Measurement`] (current value and target in
//! one display unit) over a [`GoalWindow`]. A single pacing routine turns that
//! pair into a [`GoalProgress`] snapshot, for tracked goals and for the legacy
//! annual distance goal alike.

use chrono::{Datelike, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::collections::BTreeSet;

use crate::models::goal::{Goal, GoalDefinition, GoalType, LegacyGoal};
use crate::models::progress::{GoalProgress, PaceStatus, AVERAGE_DAYS_PER_MONTH};
use crate::models::ride::Ride;
use crate::services::units::{
    convert, meters_to, meters_to_elevation, DistanceUnit, ElevationUnit,
};
use crate::time_utils::calendar_year_bounds;

const SECONDS_PER_HOUR: Decimal = dec!(3600);

/// Unit label for rides counted by ride-count and frequency goals.
pub const RIDES_UNIT: &str = "rides";
/// Unit label for time goals.
pub const HOURS_UNIT: &str = "h";

/// Inclusive date range a goal is measured over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// Elapsed-time position of `today` within a [`GoalWindow`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowProgress {
    pub days_passed: i64,
    pub days_remaining: i64,
    pub total_days: i64,
    pub percent_elapsed: f64,
}

impl GoalWindow {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Calendar year `year`, or `None` outside chrono's range.
    pub fn calendar_year(year: i32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, 1, 1).map(|jan1| {
            let (start, end) = calendar_year_bounds(jan1);
            Self { start, end }
        })
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Days passed (today clamped to the window end), remaining and total.
    ///
    /// A window that has not started yet has zero days passed; one that has
    /// ended has zero days remaining.
    pub fn progress_on(&self, today: NaiveDate) -> WindowProgress {
        let total_days = (self.end - self.start).num_days() + 1;
        let days_passed = ((today.min(self.end) - self.start).num_days() + 1).max(0);
        let days_remaining = (total_days - days_passed).max(0);
        let percent_elapsed = if total_days > 0 {
            days_passed as f64 / total_days as f64 * 100.0
        } else {
            100.0
        };

        WindowProgress {
            days_passed,
            days_remaining,
            total_days,
            percent_elapsed,
        }
    }

    /// Rides that departed inside the window; undated rides are dropped.
    pub fn rides<'a>(&self, rides: &'a [Ride]) -> Vec<&'a Ride> {
        rides
            .iter()
            .filter(|ride| {
                ride.departed_on()
                    .is_some_and(|departed| self.contains(departed.date()))
            })
            .collect()
    }
}

/// Current value and target of a goal, both in `unit`.
#[derive(Debug, Clone, PartialEq)]
pub struct Measurement {
    pub current: Decimal,
    pub target: Decimal,
    pub unit: String,
}

/// Unit a goal's progress is reported in.
pub fn get_goal_display_unit(goal: &Goal, display_unit: DistanceUnit) -> &'static str {
    match goal.goal_type {
        GoalType::Distance => display_unit.as_str(),
        GoalType::Elevation => display_unit.elevation_unit().as_str(),
        GoalType::RideCount | GoalType::Frequency => RIDES_UNIT,
        GoalType::Time => HOURS_UNIT,
    }
}

fn sum_distance(rides: &[&Ride], unit: DistanceUnit) -> Decimal {
    rides
        .iter()
        .filter_map(|ride| ride.distance_meters())
        .map(|meters| meters_to(unit, meters))
        .sum()
}

fn sum_elevation(rides: &[&Ride], unit: ElevationUnit) -> Decimal {
    let meters: Decimal = rides.iter().map(|ride| ride.elevation_gain_meters()).sum();
    meters_to_elevation(unit, meters)
}

fn sum_hours(rides: &[&Ride]) -> Decimal {
    let seconds: Decimal = rides.iter().map(|ride| ride.moving_time_seconds()).sum();
    seconds / SECONDS_PER_HOUR
}

fn count_distinct_rides(rides: &[&Ride]) -> Decimal {
    let ids: BTreeSet<u64> = rides.iter().filter_map(|ride| ride.id).collect();
    Decimal::from(ids.len())
}

/// Measure a tracked goal over rides already restricted to its window.
///
/// Distance and elevation targets are converted from the goal's stored unit
/// (or the display unit when none was stored) into the display unit. Count
/// and time targets are used as stored.
pub fn measure(goal: &Goal, window_rides: &[&Ride], display_unit: DistanceUnit) -> Measurement {
    let unit = get_goal_display_unit(goal, display_unit);
    let base_unit = if goal.unit.is_empty() {
        unit
    } else {
        goal.unit.as_str()
    };

    let (current, target) = match goal.goal_type {
        GoalType::Distance => (
            sum_distance(window_rides, display_unit),
            convert(goal.target, base_unit, unit),
        ),
        GoalType::Elevation => (
            sum_elevation(window_rides, display_unit.elevation_unit()),
            convert(goal.target, base_unit, unit),
        ),
        GoalType::Time => (sum_hours(window_rides), goal.target),
        GoalType::RideCount | GoalType::Frequency => {
            (count_distinct_rides(window_rides), goal.target)
        }
    };

    Measurement {
        current,
        target,
        unit: unit.to_string(),
    }
}

/// Completion, pace status and remaining-work targets for a measurement.
pub fn pace(measurement: Measurement, window: GoalWindow, today: NaiveDate) -> GoalProgress {
    let WindowProgress {
        days_passed,
        days_remaining,
        total_days,
        percent_elapsed,
    } = window.progress_on(today);

    let Measurement {
        current,
        target,
        unit,
    } = measurement;

    let percent_goal_completed = if target > Decimal::ZERO {
        current
            .checked_div(target)
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .and_then(|percent| percent.to_f64())
            .unwrap_or(0.0)
    } else {
        0.0
    };

    let pace_difference = percent_goal_completed - percent_elapsed;
    let status = PaceStatus::classify(pace_difference);

    let remaining = (target - current).to_f64().unwrap_or(0.0).max(0.0);
    let (daily_target, monthly_target) = if days_remaining > 0 {
        let months_remaining = days_remaining as f64 / AVERAGE_DAYS_PER_MONTH;
        (
            remaining / days_remaining as f64,
            remaining / months_remaining,
        )
    } else {
        (0.0, 0.0)
    };

    GoalProgress {
        target,
        current,
        unit,
        days_passed,
        days_remaining,
        total_days,
        percent_elapsed,
        percent_goal_completed,
        status,
        pace_difference,
        daily_target,
        weekly_target: daily_target * 7.0,
        monthly_target,
    }
}

/// Progress of any tracked goal type as of `today`.
pub fn calculate_goal_progress_v2(
    goal: &Goal,
    rides: &[Ride],
    display_unit: DistanceUnit,
    today: NaiveDate,
) -> GoalProgress {
    let window = GoalWindow::new(goal.start_date, goal.end_date);
    let window_rides = window.rides(rides);
    tracing::debug!(
        goal_id = %goal.goal_id,
        goal_type = %goal.goal_type,
        rides = window_rides.len(),
        "Measuring goal"
    );
    pace(measure(goal, &window_rides, display_unit), window, today)
}

/// Legacy annual distance goal over the calendar year containing `today`.
///
/// `goal_distance` must already be in `unit`.
pub fn calculate_goal_progress(
    goal_distance: Decimal,
    rides: &[Ride],
    unit: DistanceUnit,
    today: NaiveDate,
) -> GoalProgress {
    annual_distance_progress(goal_distance, rides, unit, today.year(), today)
}

fn annual_distance_progress(
    goal_distance: Decimal,
    rides: &[Ride],
    unit: DistanceUnit,
    year: i32,
    today: NaiveDate,
) -> GoalProgress {
    let window = GoalWindow::calendar_year(year).unwrap_or(GoalWindow::new(today, today));
    let measurement = Measurement {
        current: sum_distance(&window.rides(rides), unit),
        target: goal_distance,
        unit: unit.to_string(),
    };
    pace(measurement, window, today)
}

impl LegacyGoal {
    /// Progress over the goal's own calendar year, in `display_unit`.
    pub fn progress(
        &self,
        rides: &[Ride],
        display_unit: DistanceUnit,
        today: NaiveDate,
    ) -> GoalProgress {
        annual_distance_progress(
            self.target_in(display_unit),
            rides,
            display_unit,
            self.year,
            today,
        )
    }
}

impl GoalDefinition {
    /// Progress for either goal format.
    pub fn progress(
        &self,
        rides: &[Ride],
        display_unit: DistanceUnit,
        today: NaiveDate,
    ) -> GoalProgress {
        match self {
            GoalDefinition::Legacy(goal) => goal.progress(rides, display_unit, today),
            GoalDefinition::Tracked(goal) => {
                calculate_goal_progress_v2(goal, rides, display_unit, today)
            }
        }
    }
}
