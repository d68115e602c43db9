// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Command-line arguments.

use clap::{Parser, Subcommand, ValueEnum};

use crate::models::goal::GoalType;
use crate::services::units::DistanceUnit;

#[derive(Debug, Parser)]
#[command(name = "eddington")]
#[command(author, version, about = "Cycling statistics and goal tracking for Ride with GPS")]
pub struct Cli {
    /// Distance unit (miles or km); saved as the new preference
    #[arg(long)]
    pub unit: Option<DistanceUnit>,

    /// Ignore the ride cache and fetch everything again
    #[arg(long, global = true)]
    pub refresh: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Log as JSON lines instead of text
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    #[command(flatten)]
    Report(ReportCommand),
    /// Current unit and cache status
    Status,
    /// Set or toggle the distance unit
    Unit {
        #[arg(value_enum, default_value = "toggle")]
        value: UnitChoice,
    },
    /// Manage goals
    Goal {
        #[command(subcommand)]
        command: GoalCommand,
    },
}

/// Commands that print statistics from the ride history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Subcommand)]
pub enum ReportCommand {
    /// Full statistics summary
    Summary,
    /// Overall Eddington number progress
    Eddington,
    /// Year-to-date statistics
    Ytd,
    /// Eddington number for each year
    Yearly,
    /// Longest, average and total distance
    Metrics,
    /// Ride distance distribution
    Distribution,
    /// Distance achievements (centuries, randonneur brackets)
    Distance,
    /// Top 5 longest rides
    Longest,
    /// Ride counts and distance for recent months
    Monthly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnitChoice {
    Miles,
    Km,
    Toggle,
}

impl UnitChoice {
    /// Unit to switch to from `current`.
    pub fn resolve(self, current: DistanceUnit) -> DistanceUnit {
        match self {
            UnitChoice::Miles => DistanceUnit::Miles,
            UnitChoice::Km => DistanceUnit::Kilometers,
            UnitChoice::Toggle => current.toggled(),
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum GoalCommand {
    /// Set an annual distance goal in the current unit
    Set {
        /// Goal distance
        distance: String,
        /// Year (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
    },
    /// Add a goal of any type
    Add {
        /// distance, ride_count, elevation, time or frequency
        #[arg(long = "type")]
        goal_type: GoalType,
        /// Target value
        #[arg(long)]
        target: String,
        /// Unit (km/miles for distance, m/ft for elevation)
        #[arg(long, default_value = "")]
        unit: String,
        /// Goal title
        #[arg(long, default_value = "")]
        title: String,
        /// Start date (YYYY-MM-DD)
        #[arg(long)]
        start: String,
        /// End date (YYYY-MM-DD)
        #[arg(long)]
        end: String,
    },
    /// Show goal progress
    Progress {
        /// Goal ID to show
        #[arg(long, conflicts_with = "all")]
        id: Option<String>,
        /// Show all active goals
        #[arg(long)]
        all: bool,
    },
    /// List all goals
    List,
    /// Delete a goal
    Delete {
        #[arg(long)]
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Edit a goal
    Edit {
        #[arg(long)]
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        target: Option<String>,
        #[arg(long)]
        unit: Option<String>,
        #[arg(long)]
        start: Option<String>,
        #[arg(long)]
        end: Option<String>,
    },
    /// Quick overview of configured goals
    Status,
}

impl Command {
    /// Commands that work without ride data.
    pub fn is_offline(&self) -> bool {
        match self {
            Command::Status | Command::Unit { .. } => true,
            Command::Goal { command } => matches!(
                command,
                GoalCommand::Set { .. }
                    | GoalCommand::List
                    | GoalCommand::Delete { .. }
                    | GoalCommand::Edit { .. }
                    | GoalCommand::Status
            ),
            Command::Report(_) => false,
        }
    }
}
