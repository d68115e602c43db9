// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Goal and unit settings persisted as JSON.
//!
//! File layout:
//!
//! ```json
//! {
//!   "goals":    { "2025": { "distance": "5000", "unit": "km" } },
//!   "goals_v2": { "<uuid>": { "goal_id": "<uuid>", "type": "distance", ... } },
//!   "default_unit": "miles"
//! }
//! ```

use chrono::{Datelike, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::goal::{
    Goal, GoalDefinition, GoalError, GoalRecord, GoalUpdate, LegacyGoal, LegacyGoalRecord,
    NewGoal,
};
use crate::services::units::DistanceUnit;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
struct SettingsFile {
    /// Legacy annual goals keyed by year
    #[serde(default)]
    goals: BTreeMap<String, LegacyGoalRecord>,
    /// Tracked goals keyed by id
    #[serde(default)]
    goals_v2: BTreeMap<String, GoalRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default_unit: Option<String>,
}

/// Handle on the settings file. Every mutation is written through.
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    settings: SettingsFile,
    fallback_unit: DistanceUnit,
}

impl SettingsStore {
    /// Open the settings at `path`.
    ///
    /// A missing file starts empty. An unreadable or corrupt file is logged
    /// and also starts empty; it is overwritten on the next change.
    pub fn open(path: impl Into<PathBuf>, fallback_unit: DistanceUnit) -> Self {
        let path = path.into();
        let settings = load_settings(&path);
        Self {
            path,
            settings,
            fallback_unit,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(&self.settings)?)?;
        tracing::debug!(path = %self.path.display(), "Settings saved");
        Ok(())
    }

    // ── Unit preference ────────────────────────────────────────────────────

    /// Stored distance unit, or the fallback when unset or invalid.
    pub fn preferred_unit(&self) -> DistanceUnit {
        match self.settings.default_unit.as_deref() {
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::warn!(unit = raw, "Invalid unit in settings, using default");
                self.fallback_unit
            }),
            None => self.fallback_unit,
        }
    }

    pub fn set_preferred_unit(&mut self, unit: DistanceUnit) -> Result<()> {
        self.settings.default_unit = Some(unit.as_str().to_string());
        self.save()?;
        tracing::info!(%unit, "Unit preference saved");
        Ok(())
    }

    // ── Legacy annual goals ────────────────────────────────────────────────

    /// Set the annual distance goal for `year`, replacing any existing one.
    pub fn set_goal(&mut self, year: i32, distance: Decimal, unit: DistanceUnit) -> Result<()> {
        self.settings.goals.insert(
            year.to_string(),
            LegacyGoalRecord {
                distance: distance.to_string(),
                unit: unit.as_str().to_string(),
            },
        );
        self.save()
    }

    pub fn get_goal(&self, year: i32) -> Result<Option<LegacyGoal>> {
        match self.settings.goals.get(&year.to_string()) {
            Some(record) => Ok(Some(record.to_goal(year)?)),
            None => Ok(None),
        }
    }

    /// Annual goal for the year containing `today`.
    pub fn get_current_goal(&self, today: NaiveDate) -> Result<Option<LegacyGoal>> {
        self.get_goal(today.year())
    }

    /// All legacy goals, oldest year first.
    pub fn legacy_goals(&self) -> Result<Vec<LegacyGoal>> {
        let mut goals = self
            .settings
            .goals
            .iter()
            .map(|(year, record)| -> std::result::Result<LegacyGoal, GoalError> {
                let year = year.trim().parse::<i32>().map_err(|_| GoalError::InvalidDate {
                    field: "year",
                    value: year.clone(),
                })?;
                record.to_goal(year)
            })
            .collect::<std::result::Result<Vec<_>, GoalError>>()?;
        goals.sort_by_key(|g| g.year);
        Ok(goals)
    }

    // ── Tracked goals ──────────────────────────────────────────────────────

    /// Store a new goal under a fresh id.
    pub fn add_goal(&mut self, new_goal: NewGoal) -> Result<Goal> {
        let goal = Goal {
            goal_id: uuid::Uuid::new_v4().to_string(),
            title: new_goal.title,
            goal_type: new_goal.goal_type,
            target: new_goal.target,
            unit: new_goal.unit,
            start_date: new_goal.start_date,
            end_date: new_goal.end_date,
            created_at: Utc::now().naive_utc(),
        };
        self.settings
            .goals_v2
            .insert(goal.goal_id.clone(), GoalRecord::from(&goal));
        self.save()?;
        tracing::info!(goal_id = %goal.goal_id, goal_type = %goal.goal_type, "Goal created");
        Ok(goal)
    }

    /// All tracked goals ordered by start date.
    ///
    /// A stored record that cannot be turned back into a goal is an error.
    pub fn list_goals(&self) -> Result<Vec<Goal>> {
        let mut goals = self
            .settings
            .goals_v2
            .values()
            .cloned()
            .map(Goal::try_from)
            .collect::<std::result::Result<Vec<_>, GoalError>>()?;
        goals.sort_by(|a, b| {
            a.start_date
                .cmp(&b.start_date)
                .then_with(|| a.goal_id.cmp(&b.goal_id))
        });
        Ok(goals)
    }

    pub fn find_goal(&self, goal_id: &str) -> Result<Option<Goal>> {
        match self.settings.goals_v2.get(goal_id) {
            Some(record) => Ok(Some(Goal::try_from(record.clone())?)),
            None => Ok(None),
        }
    }

    /// Remove a goal. Returns whether it existed.
    pub fn delete_goal(&mut self, goal_id: &str) -> Result<bool> {
        if self.settings.goals_v2.remove(goal_id).is_none() {
            return Ok(false);
        }
        self.save()?;
        tracing::info!(goal_id, "Goal deleted");
        Ok(true)
    }

    /// Replace fields of a goal. Returns `false` if there is no such goal.
    ///
    /// The edited record must still form a valid goal with its start before
    /// its end; otherwise nothing is changed.
    pub fn edit_goal(&mut self, goal_id: &str, update: &GoalUpdate) -> Result<bool> {
        let Some(record) = self.settings.goals_v2.get(goal_id) else {
            return Ok(false);
        };

        let mut edited = record.clone();
        update.apply(&mut edited);
        let goal = Goal::try_from(edited.clone())?;
        if goal.start_date >= goal.end_date {
            return Err(GoalError::InvalidWindow.into());
        }

        self.settings.goals_v2.insert(goal_id.to_string(), edited);
        self.save()?;
        tracing::info!(goal_id, "Goal updated");
        Ok(true)
    }

    /// Tracked goals whose window contains `today`.
    pub fn get_active_goals(&self, today: NaiveDate) -> Result<Vec<Goal>> {
        Ok(self
            .list_goals()?
            .into_iter()
            .filter(|g| g.is_active_on(today))
            .collect())
    }

    /// This year's legacy goal (if any) followed by the active tracked goals.
    pub fn current_definitions(&self, today: NaiveDate) -> Result<Vec<GoalDefinition>> {
        let mut definitions: Vec<GoalDefinition> = self
            .get_current_goal(today)?
            .map(GoalDefinition::Legacy)
            .into_iter()
            .collect();
        definitions.extend(
            self.get_active_goals(today)?
                .into_iter()
                .map(GoalDefinition::Tracked),
        );
        Ok(definitions)
    }
}

fn load_settings(path: &Path) -> SettingsFile {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return SettingsFile::default(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Failed to read goal settings");
            return SettingsFile::default();
        }
    };
    serde_json::from_str(&contents).unwrap_or_else(|e| {
        tracing::warn!(path = %path.display(), error = %e, "Failed to parse goal settings");
        SettingsFile::default()
    })
}
