// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Goal definitions and their persisted record shape.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::services::units::{convert, DistanceUnit, ElevationUnit};

/// What a goal measures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalType {
    Distance,
    RideCount,
    Elevation,
    Time,
    Frequency,
}

impl GoalType {
    pub const ALL: [GoalType; 5] = [
        GoalType::Distance,
        GoalType::RideCount,
        GoalType::Elevation,
        GoalType::Time,
        GoalType::Frequency,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            GoalType::Distance => "distance",
            GoalType::RideCount => "ride_count",
            GoalType::Elevation => "elevation",
            GoalType::Time => "time",
            GoalType::Frequency => "frequency",
        }
    }

    /// Default title, e.g. "Ride Count Goal".
    pub fn default_title(self) -> String {
        let words: Vec<String> = self
            .as_str()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect(),
                    None => String::new(),
                }
            })
            .collect();
        format!("{} Goal", words.join(" "))
    }
}

impl fmt::Display for GoalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GoalType {
    type Err = GoalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GoalType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| GoalError::UnknownGoalType(s.to_string()))
    }
}

/// A goal with a target over an inclusive date window.
#[derive(Debug, Clone, PartialEq)]
pub struct Goal {
    pub goal_id: String,
    pub title: String,
    pub goal_type: GoalType,
    pub target: Decimal,
    /// `km`/`miles` for distance, `m`/`ft` for elevation, `h` for time,
    /// `rides` or empty for counts
    pub unit: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub created_at: NaiveDateTime,
}

/// Where a goal's window sits relative to a reference day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Active,
    Future,
    Past,
}

impl Goal {
    /// Whether `day` falls inside the goal window.
    pub fn is_active_on(&self, day: NaiveDate) -> bool {
        self.start_date <= day && day <= self.end_date
    }

    pub fn window_state(&self, day: NaiveDate) -> WindowState {
        if self.is_active_on(day) {
            WindowState::Active
        } else if day < self.start_date {
            WindowState::Future
        } else {
            WindowState::Past
        }
    }
}

/// Annual distance goal in the original settings format.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyGoal {
    pub year: i32,
    pub distance: Decimal,
    pub unit: DistanceUnit,
}

impl LegacyGoal {
    /// Stored distance expressed in `display_unit`.
    pub fn target_in(&self, display_unit: DistanceUnit) -> Decimal {
        convert(self.distance, self.unit.as_str(), display_unit.as_str())
    }
}

/// Either goal format, as loaded from settings.
#[derive(Debug, Clone, PartialEq)]
pub enum GoalDefinition {
    Legacy(LegacyGoal),
    Tracked(Goal),
}

/// Persisted goal record.
///
/// Targets are decimal strings and dates are ISO strings so the file stays
/// exact and human-editable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalRecord {
    pub goal_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type")]
    pub goal_type: String,
    pub target: String,
    #[serde(default)]
    pub unit: String,
    pub start_date: String,
    pub end_date: String,
    pub created_at: String,
}

/// Persisted legacy annual goal: `{"distance": "5000", "unit": "km"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegacyGoalRecord {
    pub distance: String,
    pub unit: String,
}

/// Field replacements for an existing goal. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GoalUpdate {
    pub title: Option<String>,
    pub target: Option<Decimal>,
    pub unit: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}

impl GoalUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.target.is_none()
            && self.unit.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }

    /// Write the replacements into a persisted record.
    pub fn apply(&self, record: &mut GoalRecord) {
        if let Some(title) = &self.title {
            record.title = Some(title.clone());
        }
        if let Some(target) = self.target {
            record.target = target.to_string();
        }
        if let Some(unit) = &self.unit {
            record.unit = unit.clone();
        }
        if let Some(start) = self.start_date {
            record.start_date = start.to_string();
        }
        if let Some(end) = self.end_date {
            record.end_date = end.to_string();
        }
    }
}

/// Validated input for creating a goal.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGoal {
    pub title: String,
    pub goal_type: GoalType,
    pub target: Decimal,
    pub unit: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

/// Errors from building or validating goals.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GoalError {
    #[error("Unknown goal type: {0}")]
    UnknownGoalType(String),

    #[error("Invalid target format: {0}")]
    InvalidTarget(String),

    #[error("Target must be positive")]
    TargetNotPositive,

    #[error("{goal_type} target seems unreasonably large (limit {limit})")]
    TargetTooLarge { goal_type: GoalType, limit: u32 },

    #[error("{goal_type} goals require unit: {expected}")]
    InvalidUnit {
        goal_type: GoalType,
        expected: &'static str,
    },

    #[error("Invalid {field}: {value}")]
    InvalidDate { field: &'static str, value: String },

    #[error("Start date must be before end date")]
    InvalidWindow,
}

impl TryFrom<GoalRecord> for Goal {
    type Error = GoalError;

    fn try_from(record: GoalRecord) -> Result<Self, Self::Error> {
        let goal_type = record.goal_type.parse()?;
        let target = Decimal::from_str(record.target.trim())
            .map_err(|_| GoalError::InvalidTarget(record.target.clone()))?;
        let start_date = parse_iso_date("start_date", &record.start_date)?;
        let end_date = parse_iso_date("end_date", &record.end_date)?;
        let created_at = parse_created_at(&record.created_at)?;
        let title = match record.title {
            Some(title) if !title.is_empty() => title,
            _ => record.goal_id.clone(),
        };

        Ok(Goal {
            goal_id: record.goal_id,
            title,
            goal_type,
            target,
            unit: record.unit,
            start_date,
            end_date,
            created_at,
        })
    }
}

impl From<&Goal> for GoalRecord {
    fn from(goal: &Goal) -> Self {
        GoalRecord {
            goal_id: goal.goal_id.clone(),
            title: Some(goal.title.clone()),
            goal_type: goal.goal_type.as_str().to_string(),
            target: goal.target.to_string(),
            unit: goal.unit.clone(),
            start_date: goal.start_date.to_string(),
            end_date: goal.end_date.to_string(),
            created_at: goal.created_at.format("%Y-%m-%dT%H:%M:%S%.f").to_string(),
        }
    }
}

impl LegacyGoalRecord {
    pub fn to_goal(&self, year: i32) -> Result<LegacyGoal, GoalError> {
        let distance = Decimal::from_str(self.distance.trim())
            .map_err(|_| GoalError::InvalidTarget(self.distance.clone()))?;
        let unit = self.unit.parse().map_err(|_| GoalError::InvalidUnit {
            goal_type: GoalType::Distance,
            expected: "km or miles",
        })?;
        Ok(LegacyGoal {
            year,
            distance,
            unit,
        })
    }
}

/// Parse a `YYYY-MM-DD` date field.
pub fn parse_iso_date(field: &'static str, value: &str) -> Result<NaiveDate, GoalError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| GoalError::InvalidDate {
        field,
        value: value.to_string(),
    })
}

/// `created_at` has been written as a naive ISO timestamp, RFC3339, or a bare date.
fn parse_created_at(value: &str) -> Result<NaiveDateTime, GoalError> {
    let trimmed = value.trim();
    if let Ok(parsed) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Ok(parsed);
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.naive_utc());
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| GoalError::InvalidDate {
            field: "created_at",
            value: value.to_string(),
        })
}

/// Check a goal target and unit at creation time and fill in default units.
///
/// The progress engine itself accepts any unit string, so this is where bad
/// units get rejected.
pub fn validate_goal_input(
    goal_type: GoalType,
    target: &str,
    unit: &str,
    preferred: DistanceUnit,
) -> Result<(Decimal, String), GoalError> {
    let target_val = Decimal::from_str(target.trim())
        .map_err(|_| GoalError::InvalidTarget(target.to_string()))?;
    if target_val <= Decimal::ZERO {
        return Err(GoalError::TargetNotPositive);
    }

    let (unit, limit) = match goal_type {
        GoalType::Distance => {
            let unit = if unit.is_empty() { preferred.as_str() } else { unit };
            unit.parse::<DistanceUnit>()
                .map_err(|_| GoalError::InvalidUnit {
                    goal_type,
                    expected: "km or miles",
                })?;
            (unit.to_string(), 100_000)
        }
        GoalType::Elevation => {
            let unit = if unit.is_empty() { "m" } else { unit };
            unit.parse::<ElevationUnit>()
                .map_err(|_| GoalError::InvalidUnit {
                    goal_type,
                    expected: "m or ft",
                })?;
            (unit.to_string(), 500_000)
        }
        GoalType::Time => ("h".to_string(), 10_000),
        GoalType::RideCount | GoalType::Frequency => ("rides".to_string(), 1_000),
    };

    if target_val > Decimal::from(limit) {
        return Err(GoalError::TargetTooLarge { goal_type, limit });
    }

    Ok((target_val, unit))
}

/// Build a validated [`NewGoal`] from raw CLI strings.
pub fn new_goal_from_input(
    goal_type: GoalType,
    target: &str,
    unit: &str,
    title: &str,
    start: &str,
    end: &str,
    preferred: DistanceUnit,
) -> Result<NewGoal, GoalError> {
    let start_date = parse_iso_date("start_date", start)?;
    let end_date = parse_iso_date("end_date", end)?;
    if start_date >= end_date {
        return Err(GoalError::InvalidWindow);
    }

    let (target, unit) = validate_goal_input(goal_type, target, unit, preferred)?;
    let title = if title.trim().is_empty() {
        goal_type.default_title()
    } else {
        title.trim().to_string()
    };

    Ok(NewGoal {
        title,
        goal_type,
        target,
        unit,
        start_date,
        end_date,
    })
}
