// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Eddington Tracker CLI
//!
//! Computes Eddington numbers, ride metrics and goal pacing from a
//! Ride with GPS ride history.

use clap::Parser;
use eddington_tracker::{cli::Cli, commands, config::Config};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.log_json);

    let config = Config::from_env()?;
    tracing::debug!(
        cache = %config.cache_file.display(),
        settings = %config.settings_file.display(),
        "Configuration loaded"
    );

    commands::run(cli, config).await
}

/// Log to stderr, as text or JSON lines.
///
/// `RUST_LOG` takes precedence over the default directives.
fn init_logging(verbose: bool, json: bool) {
    let crate_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("warn,eddington_tracker={crate_level}"))
    });

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(false)
                    .with_current_span(true)
                    .flatten_event(true)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}
