// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Command implementations for the CLI.

mod goal;
mod stats;
mod unit;

pub use goal::cmd_goal;
pub use stats::{cmd_report, Report};
pub use unit::{cmd_status, cmd_unit};

use anyhow::Result;
use chrono::{Local, NaiveDate};
use std::io::{self, IsTerminal};

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::error::AppError;
use crate::models::ride::Ride;
use crate::services::rwgps::RwgpsClient;
use crate::services::sync::RideSync;
use crate::services::units::DistanceUnit;
use crate::store::{CredentialSource, CredentialStore, RideCache, SettingsStore};

/// Everything a command needs: config, stores and the resolved unit.
pub struct App {
    pub config: Config,
    pub settings: SettingsStore,
    pub cache: RideCache,
    pub unit: DistanceUnit,
    pub refresh: bool,
    pub today: NaiveDate,
}

impl App {
    /// Open the stores and settle on a display unit.
    ///
    /// An explicit `unit` is saved as the new preference.
    pub fn new(config: Config, unit: Option<DistanceUnit>, refresh: bool) -> Result<Self> {
        let mut settings = SettingsStore::open(&config.settings_file, config.default_unit);
        let unit = match unit {
            Some(unit) => {
                settings.set_preferred_unit(unit)?;
                unit
            }
            None => settings.preferred_unit(),
        };
        let cache = RideCache::new(&config.cache_file);

        Ok(Self {
            config,
            settings,
            cache,
            unit,
            refresh,
            today: Local::now().date_naive(),
        })
    }

    /// Ride history, synced with RWGPS.
    ///
    /// A rejected auth token is discarded and the sync retried once with a
    /// fresh one.
    pub async fn load_rides(&self) -> Result<Vec<Ride>> {
        let api_key = self.config.require_api_key()?;
        let credentials = CredentialStore::from_config(&self.config);
        let client = RwgpsClient::new(&self.config.base_url, api_key)
            .with_progress(io::stderr().is_terminal());

        let token = match credentials.load_token() {
            Some(token) => token,
            None => self.authenticate(&client, &credentials).await?,
        };

        let client = client.with_token(token);
        let result = RideSync::new(&client, &self.cache)
            .update(self.refresh)
            .await;
        match result {
            Err(e) if e.is_rwgps_token_error() => {
                tracing::warn!("Auth token rejected, requesting a new one");
                credentials.clear_token()?;
                let token = self.authenticate(&client, &credentials).await?;
                let client = client.with_token(token);
                Ok(RideSync::new(&client, &self.cache)
                    .update(self.refresh)
                    .await?)
            }
            result => Ok(result?),
        }
    }

    async fn authenticate(
        &self,
        client: &RwgpsClient,
        credentials: &CredentialStore,
    ) -> Result<String> {
        let (creds, source) = credentials.resolve(&self.config)?;
        match client.authenticate(&creds.email, &creds.password).await {
            Ok(token) => {
                credentials.save_token(&token)?;
                Ok(token)
            }
            Err(AppError::Unauthorized) if source == CredentialSource::SavedFile => {
                credentials.clear_credentials()?;
                Err(anyhow::anyhow!(
                    "Saved RWGPS credentials were rejected and have been removed"
                ))
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Dispatch a parsed command line.
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    let mut app = App::new(config, cli.unit, cli.refresh)?;

    if app.refresh && !cli.command.is_offline() && app.cache.clear()? {
        eprintln!("Cache cleared. Fetching fresh data...");
    }

    match cli.command {
        Command::Unit { value } => cmd_unit(&mut app, value),
        Command::Status => cmd_status(&app),
        Command::Goal { command } => cmd_goal(&mut app, command).await,
        Command::Report(report) => {
            let rides = app.load_rides().await?;
            cmd_report(&app, report, &rides)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn config_in(dir: &std::path::Path) -> Config {
        Config {
            cache_file: dir.join("rwgps_cache.json"),
            settings_file: dir.join("settings.json"),
            credentials_file: dir.join("credentials.json"),
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_refresh_keeps_cache_for_offline_commands() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());
        RideCache::new(&config.cache_file).save(&[]).unwrap();

        for args in [
            ["eddington", "--refresh", "status"].as_slice(),
            ["eddington", "--refresh", "unit", "km"].as_slice(),
            ["eddington", "--refresh", "goal", "list"].as_slice(),
        ] {
            run(Cli::parse_from(args), config.clone()).await.unwrap();
            assert!(config.cache_file.exists(), "cache removed by {args:?}");
        }
    }
}
