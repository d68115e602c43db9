// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Text rendering for every report section.
//!
//! Each function returns a `String` so commands decide where it goes and
//! tests can check the exact output.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::fmt::Write;

use crate::models::goal::{Goal, LegacyGoal, WindowState};
use crate::models::progress::{GoalProgress, PaceStatus};
use crate::models::stats::{
    DistanceBucket, EddingtonProgress, MilestoneRides, MonthSummary, RideStatistics, YearSummary,
};
use crate::services::units::DistanceUnit;
use crate::store::cache::CacheInfo;
use crate::time_utils::format_utc_rfc3339;

/// Active goals shown in the summary before the rest are elided.
pub const SUMMARY_GOAL_LIMIT: usize = 3;

/// Rides listed in the longest-rides section.
pub const LONGEST_RIDES_SHOWN: usize = 5;

/// Months listed in the monthly section.
pub const MONTHS_SHOWN: usize = 12;

/// Bucket width of the distribution table.
pub const DISTRIBUTION_BUCKET: u32 = 50;

/// Round to `decimals` places and group the integer part with commas.
pub fn thousands(value: Decimal, decimals: u32) -> String {
    let rendered = format!("{:.*}", decimals as usize, value.round_dp(decimals));
    let (sign, digits) = match rendered.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", rendered.as_str()),
    };
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac)) => (int_part, Some(frac)),
        None => (digits, None),
    };

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

pub fn header(unit: DistanceUnit, ride_count: Option<usize>) -> String {
    let mut out = format!(
        "\n=== CYCLING STATISTICS (distances in {unit}) ===\n\
         Current unit: {unit} (use --unit option to change)\n"
    );
    if let Some(count) = ride_count {
        let _ = writeln!(out, "Total rides analyzed: {count}");
    }
    out
}

pub fn eddington_section(progress: &EddingtonProgress, unit: DistanceUnit) -> String {
    let e = progress.current;
    let next = e + 1;
    let after = e + 2;
    format!(
        "\n=== OVERALL EDDINGTON PROGRESS ===\n\
         Current overall Eddington: {e}\n\
         In progress: E={next} ({} rides of {next}+ {unit})\n\
         Need {} more rides of {next}+ {unit} for E={next}\n\
         Next goal after that: E={after} ({} rides of {after}+ {unit})\n\
         Will need {} more rides of {after}+ {unit} for E={after}\n",
        progress.rides_at_next,
        progress.rides_needed_next,
        progress.rides_at_next_next,
        progress.rides_needed_next_next,
    )
}

pub fn ytd_section(summary: &YearSummary, unit: DistanceUnit) -> String {
    let year = summary.year;
    let mut out = format!("\n=== EDDINGTON YEAR TO DATE ({year}) ===\n");
    if summary.ride_count == 0 {
        let _ = writeln!(out, "No rides recorded in {year} yet");
        return out;
    }
    let next = &summary.next;
    let _ = write!(
        out,
        "Rides this year: {}\n\
         Distance this year: {} {unit}\n\
         Current year Eddington: {}\n\
         In progress: E={} ({} rides of {}+ {unit})\n\
         Need {} more rides of {}+ {unit} for E={}\n",
        summary.ride_count,
        thousands(summary.statistics.total_distance, 1),
        summary.eddington,
        next.next_e,
        next.rides_at_target,
        next.next_e,
        next.rides_needed,
        next.next_e,
        next.next_e,
    );
    out
}

/// Newest year first; every year holding the best value is marked.
pub fn yearly_section(yearly: &BTreeMap<i32, u32>) -> String {
    let mut out = String::from("\n=== YEARLY EDDINGTON NUMBERS ===\n");
    let highest = yearly.values().copied().max().unwrap_or(0);
    for (year, e) in yearly.iter().rev() {
        let suffix = if *e == highest { " *Highest*" } else { "" };
        let _ = writeln!(out, "{year}: {e}{suffix}");
    }
    out
}

pub fn metrics_section(stats: &RideStatistics, unit: DistanceUnit) -> String {
    format!(
        "\n=== RIDE METRICS ===\n\
         Longest ride: {} {unit}\n\
         Average ride: {} {unit}\n\
         Total distance: {} {unit}\n",
        thousands(stats.longest_ride, 1),
        thousands(stats.average_ride, 1),
        thousands(stats.total_distance, 1),
    )
}

/// Range histogram followed by rides at or above each threshold.
pub fn distribution_section(
    buckets: &[DistanceBucket],
    thresholds: &BTreeMap<u32, u32>,
    unit: DistanceUnit,
) -> String {
    let mut out = String::from("\n=== RIDE DISTRIBUTION ===\n");
    let _ = writeln!(out, "{:<15} | {:<6} | {:<10}", "Range", "Count", "Percentage");
    let _ = writeln!(out, "{}-|{}|{}", "-".repeat(15), "-".repeat(8), "-".repeat(10));
    for bucket in buckets {
        let range = format!("{}-{}", bucket.lower, bucket.upper);
        let _ = writeln!(
            out,
            "{range:<15} | {:<6} | {:.2}%",
            bucket.count, bucket.percentage
        );
    }

    if !thresholds.is_empty() {
        let _ = writeln!(out, "\nRides at or above:");
        for (threshold, count) in thresholds {
            let _ = writeln!(out, "  {threshold:>3}+ {unit}: {count}");
        }
    }
    out
}

pub fn milestones_section(milestones: &MilestoneRides, unit: DistanceUnit) -> String {
    let mut out = String::from("\n=== DISTANCE ACHIEVEMENTS ===\n");
    for milestone in milestones.iter() {
        let line = match unit {
            DistanceUnit::Miles => format!(
                "{} ({}+ {unit}): {}",
                milestone.label, milestone.threshold, milestone.count
            ),
            DistanceUnit::Kilometers => {
                format!("{} {unit}: {}", milestone.label, milestone.count)
            }
        };
        out.push_str(&line);
        out.push('\n');
    }
    out
}

pub fn longest_section(titled: &[(Decimal, String)], unit: DistanceUnit) -> String {
    let mut out = format!("\n=== TOP {LONGEST_RIDES_SHOWN} LONGEST RIDES ===\n");
    for (i, (distance, title)) in titled.iter().take(LONGEST_RIDES_SHOWN).enumerate() {
        let _ = writeln!(out, "{}. {} {unit} - {title}", i + 1, thousands(*distance, 1));
    }
    out
}

pub fn monthly_section(months: &[MonthSummary], unit: DistanceUnit) -> String {
    let mut out = String::from("\n=== MONTHLY STATISTICS ===\n");
    for month in months {
        let _ = writeln!(
            out,
            "{}: {} rides, {} {unit}",
            month.month,
            month.rides,
            thousands(month.distance, 1)
        );
    }
    out
}

pub fn status_section(unit: DistanceUnit, cache: &CacheInfo) -> String {
    let mut out = format!(
        "\n=== CURRENT SETTINGS ===\n\
         Distance unit: {unit}\n\
         Cache file: {}\n",
        cache.path.display()
    );
    if cache.exists {
        let _ = writeln!(out, "Cache status: Available ({} bytes)", cache.size);
        if let Some(modified) = cache.last_modified {
            let _ = writeln!(out, "Last updated: {}", format_utc_rfc3339(modified));
        }
    } else {
        let _ = writeln!(out, "Cache status: Not available");
    }
    out
}

fn status_marker(status: PaceStatus) -> &'static str {
    match status {
        PaceStatus::Ahead => "🚀",
        PaceStatus::Behind => "⚠️",
        PaceStatus::OnTrack => "✅",
    }
}

fn status_text(progress: &GoalProgress) -> String {
    let diff = progress.pace_difference.abs();
    match progress.status {
        PaceStatus::Ahead => format!("Ahead of pace by {diff:.1}%"),
        PaceStatus::Behind => format!("Behind pace by {diff:.1}%"),
        PaceStatus::OnTrack => "On track".to_string(),
    }
}

/// Full progress report with pacing targets. `heading` names the goal period.
pub fn goal_progress(progress: &GoalProgress, heading: &str) -> String {
    let unit = &progress.unit;
    format!(
        "\n=== {heading} ===\n\
         Goal: {} {unit}\n\
         Current: {} {unit} ({:.1}% complete)\n\
         Period Progress: {:.1}% elapsed\n\
         Days passed: {} | Days remaining: {}\n\
         Status: {} {}\n\
         \n\
         === PACING TARGETS ===\n\
         To reach your goal, you need:\n\
         • Daily: {:.1} {unit}/day\n\
         • Weekly: {:.1} {unit}/week\n\
         • Monthly: {:.1} {unit}/month\n",
        thousands(progress.target, 0),
        thousands(progress.current, 1),
        progress.percent_goal_completed,
        progress.percent_elapsed,
        progress.days_passed,
        progress.days_remaining,
        status_marker(progress.status),
        status_text(progress),
        progress.daily_target,
        progress.weekly_target,
        progress.monthly_target,
    )
}

/// Report for this year's legacy goal.
pub fn annual_goal_progress(progress: &GoalProgress, year: i32) -> String {
    goal_progress(progress, &format!("ANNUAL GOAL PROGRESS ({year})"))
}

/// Report for one tracked goal, headed by its title and id.
pub fn tracked_goal_progress(goal: &Goal, progress: &GoalProgress) -> String {
    format!(
        "Goal: {} ({})\n{}",
        goal.title,
        goal.goal_id,
        goal_progress(
            progress,
            &format!("GOAL PROGRESS ({} to {})", goal.start_date, goal.end_date)
        )
    )
}

/// Short legacy goal block for the summary.
pub fn legacy_goal_summary(progress: &GoalProgress) -> String {
    let unit = &progress.unit;
    let diff = progress.pace_difference.abs();
    let status = match progress.status {
        PaceStatus::Ahead => format!("🚀 Ahead by {diff:.1}%"),
        PaceStatus::Behind => format!("⚠️ Behind by {diff:.1}%"),
        PaceStatus::OnTrack => "✅ On track".to_string(),
    };
    format!(
        "\n=== ANNUAL GOAL SUMMARY ===\n\
         Target: {} {unit}\n\
         Current: {} {unit} ({:.1}%)\n\
         Status: {status}\n\
         Daily target: {:.1} {unit}\n",
        thousands(progress.target, 0),
        thousands(progress.current, 1),
        progress.percent_goal_completed,
        progress.daily_target,
    )
}

/// One line per active goal, at most [`SUMMARY_GOAL_LIMIT`] of them.
pub fn active_goals_summary(goals: &[(Goal, GoalProgress)]) -> String {
    if goals.is_empty() {
        return String::new();
    }
    let mut out = format!("\n=== ACTIVE GOALS ({}) ===\n", goals.len());
    for (goal, progress) in goals.iter().take(SUMMARY_GOAL_LIMIT) {
        let icon = match progress.status {
            PaceStatus::OnTrack => "🟢",
            PaceStatus::Ahead => "🚀",
            PaceStatus::Behind => "⚠️",
        };
        let _ = writeln!(
            out,
            "{icon} {}: {}/{} {} ({:.1}%)",
            goal.title,
            thousands(progress.current, 0),
            thousands(progress.target, 0),
            progress.unit,
            progress.percent_goal_completed
        );
    }
    if goals.len() > SUMMARY_GOAL_LIMIT {
        let _ = writeln!(
            out,
            " ... and {} more (use 'goal progress --all' to see all)",
            goals.len() - SUMMARY_GOAL_LIMIT
        );
    }
    out
}

fn window_label(state: WindowState) -> &'static str {
    match state {
        WindowState::Active => "🟢 ACTIVE",
        WindowState::Future => "🟡 FUTURE",
        WindowState::Past => "🔴 PAST",
    }
}

/// Tracked goals (already sorted by start date) and legacy goals.
pub fn goal_list(goals: &[Goal], legacy: &[LegacyGoal], today: NaiveDate) -> String {
    if goals.is_empty() && legacy.is_empty() {
        return "No goals configured.\n".to_string();
    }

    let mut out = String::from("\n=== CONFIGURED GOALS ===\n");
    if !goals.is_empty() {
        out.push_str("\nGoals:\n");
        for goal in goals {
            let _ = writeln!(out, "  {}: {}", goal.goal_id, goal.title);
            let _ = writeln!(
                out,
                "    Type: {} | Target: {} {}",
                goal.goal_type,
                thousands(goal.target, 0),
                goal.unit
            );
            let _ = writeln!(
                out,
                "    Period: {} to {} | Status: {}",
                goal.start_date,
                goal.end_date,
                window_label(goal.window_state(today))
            );
        }
    }

    if !legacy.is_empty() {
        out.push_str("\nAnnual Distance Goals:\n");
        let current_year = chrono::Datelike::year(&today);
        for goal in legacy {
            let marker = if goal.year == current_year {
                " (current year)"
            } else {
                ""
            };
            let _ = writeln!(
                out,
                "  {}: {} {}{marker}",
                goal.year,
                thousands(goal.distance, 0),
                goal.unit
            );
        }
    }
    out
}

/// Goal overview without ride data.
pub fn goal_status(unit: DistanceUnit, legacy: Option<&LegacyGoal>, active: &[Goal]) -> String {
    let mut out = format!(
        "\n=== QUICK STATUS ===\n\
         Current unit preference: {unit}\n"
    );
    if legacy.is_none() && active.is_empty() {
        out.push_str("No goals configured.\n");
        return out;
    }
    if let Some(goal) = legacy {
        let _ = writeln!(
            out,
            "Annual goal: {} {} for {}",
            thousands(goal.distance, 0),
            goal.unit,
            goal.year
        );
    }
    if !active.is_empty() {
        let _ = writeln!(out, "Active goals: {}", active.len());
        for goal in active.iter().take(SUMMARY_GOAL_LIMIT) {
            let _ = writeln!(
                out,
                "  - {} ({}): {} {}",
                goal.title, goal.goal_type, goal.target, goal.unit
            );
        }
        if active.len() > SUMMARY_GOAL_LIMIT {
            let _ = writeln!(out, "  ... and {} more", active.len() - SUMMARY_GOAL_LIMIT);
        }
    }
    out.push_str("Use 'goal progress' for detailed analysis\n");
    out
}

/// Confirmation of a newly created goal.
pub fn goal_created(goal: &Goal) -> String {
    format!(
        "✅ Goal created: {}\n   Title: {}\n   Type: {}\n   Target: {} {}\n   Period: {} to {}\n",
        goal.goal_id,
        goal.title,
        goal.goal_type,
        thousands(goal.target, 0),
        goal.unit,
        goal.start_date,
        goal.end_date
    )
}
