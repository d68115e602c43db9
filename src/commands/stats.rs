// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Statistics reports over the ride history.

use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::App;
use crate::cli::ReportCommand;
use crate::format;
use crate::models::goal::{Goal, LegacyGoal};
use crate::models::progress::GoalProgress;
use crate::models::ride::Ride;
use crate::services::eddington::{
    analyze_ride_distribution, bucket_distances, calculate_overall_e_progress,
    calculate_yearly_eddington,
};
use crate::services::goals::calculate_goal_progress_v2;
use crate::services::metrics::{
    analyze_ride_metrics, calculate_statistics, get_ride_titles, process_trips, summarize_year,
};
use crate::services::units::DistanceUnit;
use crate::store::SettingsStore;

/// Ride history with distances resolved in one unit.
pub struct Report<'a> {
    rides: &'a [Ride],
    distances: Vec<Decimal>,
    unit: DistanceUnit,
    today: NaiveDate,
}

impl<'a> Report<'a> {
    pub fn new(rides: &'a [Ride], unit: DistanceUnit, today: NaiveDate) -> Self {
        Self {
            rides,
            distances: process_trips(rides, unit),
            unit,
            today,
        }
    }

    pub fn ride_count(&self) -> usize {
        self.distances.len()
    }

    pub fn eddington(&self) -> String {
        format::eddington_section(&calculate_overall_e_progress(&self.distances), self.unit)
    }

    pub fn ytd(&self) -> String {
        format::ytd_section(
            &summarize_year(self.rides, self.today.year(), self.unit),
            self.unit,
        )
    }

    pub fn yearly(&self) -> String {
        format::yearly_section(&calculate_yearly_eddington(self.rides, self.unit))
    }

    pub fn metrics(&self) -> String {
        format::metrics_section(&calculate_statistics(&self.distances), self.unit)
    }

    pub fn distribution(&self) -> String {
        format::distribution_section(
            &bucket_distances(&self.distances, format::DISTRIBUTION_BUCKET),
            &analyze_ride_distribution(&self.distances),
            self.unit,
        )
    }

    pub fn milestones(&self) -> String {
        format::milestones_section(
            &analyze_ride_metrics(self.rides, self.unit).milestone_rides,
            self.unit,
        )
    }

    pub fn longest(&self) -> String {
        format::longest_section(
            &get_ride_titles(self.rides, &self.distances, self.unit),
            self.unit,
        )
    }

    pub fn monthly(&self) -> String {
        let metrics = analyze_ride_metrics(self.rides, self.unit);
        format::monthly_section(&metrics.recent_months(format::MONTHS_SHOWN), self.unit)
    }

    /// This year's annual goal and the active goals, in brief.
    pub fn goals(&self, settings: &SettingsStore) -> String {
        match self.goal_summary(settings) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!(error = %e, "Goal summary failed");
                format!("\n=== GOAL SUMMARY ===\nGoal tracking unavailable: {e}\n")
            }
        }
    }

    fn goal_summary(&self, settings: &SettingsStore) -> crate::error::Result<String> {
        let mut out = String::new();
        if let Some(goal) = settings.get_current_goal(self.today)? {
            out.push_str(&format::legacy_goal_summary(&self.legacy_progress(&goal)));
        }
        let active: Vec<(Goal, GoalProgress)> = settings
            .get_active_goals(self.today)?
            .into_iter()
            .map(|goal| {
                let progress = self.goal_progress(&goal);
                (goal, progress)
            })
            .collect();
        out.push_str(&format::active_goals_summary(&active));
        Ok(out)
    }

    pub fn legacy_progress(&self, goal: &LegacyGoal) -> GoalProgress {
        goal.progress(self.rides, self.unit, self.today)
    }

    pub fn goal_progress(&self, goal: &Goal) -> GoalProgress {
        calculate_goal_progress_v2(goal, self.rides, self.unit, self.today)
    }

    /// Every section, as printed by `summary`.
    pub fn summary(&self, settings: &SettingsStore) -> String {
        [
            self.goals(settings),
            self.eddington(),
            self.ytd(),
            self.yearly(),
            self.metrics(),
            self.distribution(),
            self.milestones(),
            self.longest(),
            self.monthly(),
        ]
        .concat()
    }
}

/// Print the report section for a statistics command.
pub fn cmd_report(app: &App, command: ReportCommand, rides: &[Ride]) -> Result<()> {
    let report = Report::new(rides, app.unit, app.today);

    let body = match command {
        ReportCommand::Summary => {
            print!("{}", format::header(app.unit, Some(report.ride_count())));
            report.summary(&app.settings)
        }
        ReportCommand::Eddington => report.eddington(),
        ReportCommand::Ytd => report.ytd(),
        ReportCommand::Yearly => report.yearly(),
        ReportCommand::Metrics => report.metrics(),
        ReportCommand::Distribution => report.distribution(),
        ReportCommand::Distance => report.milestones(),
        ReportCommand::Longest => report.longest(),
        ReportCommand::Monthly => report.monthly(),
    };

    if command != ReportCommand::Summary {
        print!("{}", format::header(app.unit, None));
    }
    print!("{body}");
    Ok(())
}
