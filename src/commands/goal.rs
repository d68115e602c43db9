// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! `goal` subcommands.

use anyhow::{bail, Context, Result};
use chrono::Datelike;
use dialoguer::{theme::ColorfulTheme, Confirm};
use std::io::{self, IsTerminal};

use super::{App, Report};
use crate::cli::GoalCommand;
use crate::format;
use crate::models::goal::{
    new_goal_from_input, parse_iso_date, validate_goal_input, Goal, GoalType, GoalUpdate,
};
use crate::services::units::DistanceUnit;

const GOAL_SEPARATOR_WIDTH: usize = 50;

pub async fn cmd_goal(app: &mut App, command: GoalCommand) -> Result<()> {
    match command {
        GoalCommand::Set { distance, year } => set_annual_goal(app, &distance, year),
        GoalCommand::Add {
            goal_type,
            target,
            unit,
            title,
            start,
            end,
        } => {
            let new_goal =
                new_goal_from_input(goal_type, &target, &unit, &title, &start, &end, app.unit)?;
            let goal = app.settings.add_goal(new_goal)?;
            print!("{}", format::goal_created(&goal));
            Ok(())
        }
        GoalCommand::Progress { id, all } => show_progress(app, id.as_deref(), all).await,
        GoalCommand::List => {
            print!(
                "{}",
                format::goal_list(
                    &app.settings.list_goals()?,
                    &app.settings.legacy_goals()?,
                    app.today
                )
            );
            Ok(())
        }
        GoalCommand::Delete { id, yes } => delete_goal(app, &id, yes),
        GoalCommand::Edit {
            id,
            title,
            target,
            unit,
            start,
            end,
        } => {
            let goal = find(app, &id)?;
            println!("Editing goal: {} ({})", goal.title, goal.goal_type);
            let update = build_update(&goal, title, target, unit, start, end, app.unit)?;
            if update.is_empty() {
                println!("No updates specified.");
                return Ok(());
            }
            app.settings.edit_goal(&id, &update)?;
            let updated = find(app, &id)?;
            println!("✅ Goal {id} updated successfully.");
            println!("   Title: {}", updated.title);
            println!(
                "   Target: {} {}",
                format::thousands(updated.target, 0),
                updated.unit
            );
            println!("   Period: {} to {}", updated.start_date, updated.end_date);
            Ok(())
        }
        GoalCommand::Status => {
            let legacy = app.settings.get_current_goal(app.today)?;
            let active = app.settings.get_active_goals(app.today)?;
            print!("{}", format::goal_status(app.unit, legacy.as_ref(), &active));
            Ok(())
        }
    }
}

fn set_annual_goal(app: &mut App, distance: &str, year: Option<i32>) -> Result<()> {
    let year = year.unwrap_or_else(|| app.today.year());
    let (distance, _) =
        validate_goal_input(GoalType::Distance, distance, app.unit.as_str(), app.unit)?;
    app.settings.set_goal(year, distance, app.unit)?;
    println!(
        "✅ Annual goal set: {} {} for {year}",
        format::thousands(distance, 0),
        app.unit
    );
    Ok(())
}

async fn show_progress(app: &App, id: Option<&str>, all: bool) -> Result<()> {
    let goals: Vec<Goal> = match id {
        Some(id) => vec![find(app, id)?],
        None if all => app.settings.get_active_goals(app.today)?,
        None => {
            let Some(legacy) = app.settings.get_current_goal(app.today)? else {
                bail!("No annual goal set for {}", app.today.year());
            };
            let rides = app.load_rides().await?;
            let report = Report::new(&rides, app.unit, app.today);
            print!(
                "{}",
                format::annual_goal_progress(&report.legacy_progress(&legacy), legacy.year)
            );
            return Ok(());
        }
    };

    if goals.is_empty() {
        println!("No active goals found.");
        return Ok(());
    }

    let rides = app.load_rides().await?;
    let report = Report::new(&rides, app.unit, app.today);
    for (i, goal) in goals.iter().enumerate() {
        if i > 0 {
            println!("\n{}\n", "=".repeat(GOAL_SEPARATOR_WIDTH));
        }
        print!(
            "{}",
            format::tracked_goal_progress(goal, &report.goal_progress(goal))
        );
    }
    Ok(())
}

fn delete_goal(app: &mut App, id: &str, yes: bool) -> Result<()> {
    let goal = find(app, id)?;
    println!("About to delete goal: {} ({})", goal.title, goal.goal_type);

    if !yes {
        if !io::stdin().is_terminal() {
            bail!("Refusing to delete without confirmation; pass --yes");
        }
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Are you sure?")
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        if !confirmed {
            println!("Delete cancelled.");
            return Ok(());
        }
    }

    if app.settings.delete_goal(id)? {
        println!("✅ Goal {id} deleted successfully.");
    } else {
        bail!("Failed to delete goal {id}");
    }
    Ok(())
}

fn find(app: &App, id: &str) -> Result<Goal> {
    app.settings
        .find_goal(id)?
        .with_context(|| format!("Goal {id} not found"))
}

/// Validate edit flags against the goal being changed.
fn build_update(
    goal: &Goal,
    title: Option<String>,
    target: Option<String>,
    unit: Option<String>,
    start: Option<String>,
    end: Option<String>,
    preferred: DistanceUnit,
) -> Result<GoalUpdate> {
    let (target, unit) = match (target, unit) {
        (None, None) => (None, None),
        (target, unit) => {
            let unit_str = unit.as_deref().unwrap_or(&goal.unit);
            let target_str = target.clone().unwrap_or_else(|| goal.target.to_string());
            let (value, checked_unit) =
                validate_goal_input(goal.goal_type, &target_str, unit_str, preferred)?;
            (target.map(|_| value), unit.map(|_| checked_unit))
        }
    };

    Ok(GoalUpdate {
        title: title.filter(|t| !t.trim().is_empty()),
        target,
        unit,
        start_date: start
            .map(|s| parse_iso_date("start_date", &s))
            .transpose()?,
        end_date: end.map(|s| parse_iso_date("end_date", &s)).transpose()?,
    })
}
