// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! RWGPS account credentials and the cached auth token.
//!
//! The token lives at `~/.rwgps/token`. Email and password come from the
//! environment, then a saved credentials file, then an interactive prompt.

use anyhow::Context;
use dialoguer::{theme::ColorfulTheme, Confirm, Input, Password};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};

use crate::config::Config;
use crate::error::{AppError, Result};

const TOKEN_DIR: &str = ".rwgps";
const TOKEN_FILE: &str = "token";

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Credentials {
    pub fn is_valid(&self) -> bool {
        is_plausible_email(&self.email) && !self.password.is_empty()
    }
}

/// Where credentials were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    SavedFile,
    Prompt,
}

/// File-backed credential and token storage.
#[derive(Debug, Clone)]
pub struct CredentialStore {
    token_path: PathBuf,
    credentials_path: PathBuf,
}

/// `~/.rwgps/token`, or `.rwgps/token` when there is no home directory.
pub fn default_token_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_default()
        .join(TOKEN_DIR)
        .join(TOKEN_FILE)
}

impl CredentialStore {
    pub fn new(token_path: impl Into<PathBuf>, credentials_path: impl Into<PathBuf>) -> Self {
        Self {
            token_path: token_path.into(),
            credentials_path: credentials_path.into(),
        }
    }

    /// Store using the default token location and the configured credentials file.
    pub fn from_config(config: &Config) -> Self {
        Self::new(default_token_path(), config.credentials_file.clone())
    }

    pub fn token_path(&self) -> &Path {
        &self.token_path
    }

    pub fn credentials_path(&self) -> &Path {
        &self.credentials_path
    }

    // ── Auth token ─────────────────────────────────────────────────────────

    pub fn load_token(&self) -> Option<String> {
        fs::read_to_string(&self.token_path)
            .ok()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
    }

    pub fn save_token(&self, token: &str) -> Result<()> {
        if let Some(parent) = self.token_path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.token_path, token)?;
        restrict_permissions(&self.token_path);
        tracing::debug!(path = %self.token_path.display(), "Auth token saved");
        Ok(())
    }

    /// Remove a stale token. Returns whether one existed.
    pub fn clear_token(&self) -> Result<bool> {
        remove_if_exists(&self.token_path)
    }

    // ── Email/password ─────────────────────────────────────────────────────

    /// Saved credentials, if the file exists and holds a plausible pair.
    ///
    /// A file that cannot be parsed or fails validation is deleted.
    pub fn load_saved(&self) -> Option<Credentials> {
        let contents = fs::read_to_string(&self.credentials_path).ok()?;
        match serde_json::from_str::<Credentials>(&contents) {
            Ok(creds) if creds.is_valid() => Some(creds),
            Ok(_) | Err(_) => {
                tracing::warn!(
                    path = %self.credentials_path.display(),
                    "Saved credentials are invalid, removing"
                );
                if let Err(e) = remove_if_exists(&self.credentials_path) {
                    tracing::warn!(error = %e, "Failed to remove invalid credentials file");
                }
                None
            }
        }
    }

    pub fn save_credentials(&self, creds: &Credentials) -> Result<()> {
        if let Some(parent) = self
            .credentials_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.credentials_path, serde_json::to_string_pretty(creds)?)?;
        restrict_permissions(&self.credentials_path);
        tracing::info!(path = %self.credentials_path.display(), "Credentials saved");
        Ok(())
    }

    pub fn clear_credentials(&self) -> Result<bool> {
        remove_if_exists(&self.credentials_path)
    }

    /// Credentials from the environment or the saved file, without prompting.
    pub fn lookup(&self, config: &Config) -> Option<(Credentials, CredentialSource)> {
        if let (Some(email), Some(password)) = (&config.email, &config.password) {
            return Some((
                Credentials {
                    email: email.clone(),
                    password: password.clone(),
                },
                CredentialSource::Environment,
            ));
        }
        self.load_saved()
            .map(|creds| (creds, CredentialSource::SavedFile))
    }

    /// Find credentials, prompting on the terminal as a last resort.
    ///
    /// Prompted credentials are saved if the user agrees.
    pub fn resolve(&self, config: &Config) -> Result<(Credentials, CredentialSource)> {
        if let Some(found) = self.lookup(config) {
            return Ok(found);
        }

        if !io::stdin().is_terminal() {
            return Err(AppError::BadRequest(
                "No RWGPS credentials: set RWGPS_EMAIL and RWGPS_PASSWORD".to_string(),
            ));
        }

        let creds = prompt_credentials()?;
        let save = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("Save credentials for next time?")
            .default(false)
            .interact()
            .context("Failed to read confirmation")?;
        if save {
            self.save_credentials(&creds)?;
        }
        Ok((creds, CredentialSource::Prompt))
    }
}

fn prompt_credentials() -> Result<Credentials> {
    let theme = ColorfulTheme::default();
    eprintln!("Ride with GPS login required");

    let email: String = Input::with_theme(&theme)
        .with_prompt("Email")
        .validate_with(|input: &String| -> std::result::Result<(), &'static str> {
            if is_plausible_email(input) {
                Ok(())
            } else {
                Err("Enter a valid email address")
            }
        })
        .interact_text()
        .context("Failed to read email")?;

    let password = Password::with_theme(&theme)
        .with_prompt("Password")
        .interact()
        .context("Failed to read password")?;

    Ok(Credentials {
        email: email.trim().to_string(),
        password,
    })
}

/// Contains `@` with a dot somewhere in the domain.
pub fn is_plausible_email(email: &str) -> bool {
    match email.trim().split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.'),
        None => false,
    }
}

fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e.into()),
    }
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) {
    use std::os::unix::fs::PermissionsExt;
    if let Err(e) = fs::set_permissions(path, fs::Permissions::from_mode(0o600)) {
        tracing::warn!(path = %path.display(), error = %e, "Failed to restrict file permissions");
    }
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) {}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(dir: &Path) -> CredentialStore {
        CredentialStore::new(dir.join("rwgps/token"), dir.join("credentials.json"))
    }

    #[test]
    fn test_is_plausible_email() {
        assert!(is_plausible_email("rider@example.com"));
        assert!(!is_plausible_email("rider@localhost"));
        assert!(!is_plausible_email("rider.example.com"));
        assert!(!is_plausible_email("@example.com"));
    }

    #[test]
    fn test_token_roundtrip_and_clear() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());

        assert_eq!(store.load_token(), None);
        store.save_token("abc123").unwrap();
        assert_eq!(store.load_token().as_deref(), Some("abc123"));

        assert!(store.clear_token().unwrap());
        assert!(!store.clear_token().unwrap());
        assert_eq!(store.load_token(), None);
    }

    #[test]
    fn test_invalid_saved_credentials_are_removed() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        fs::write(
            store.credentials_path(),
            r#"{"email": "not-an-email", "password": "x"}"#,
        )
        .unwrap();

        assert_eq!(store.load_saved(), None);
        assert!(!store.credentials_path().exists());
    }

    #[test]
    fn test_environment_wins_over_saved_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = store(dir.path());
        store
            .save_credentials(&Credentials {
                email: "saved@example.com".to_string(),
                password: "saved".to_string(),
            })
            .unwrap();

        let config = Config {
            email: Some("env@example.com".to_string()),
            password: Some("env".to_string()),
            ..Config::default()
        };
        let (creds, source) = store.lookup(&config).unwrap();
        assert_eq!(creds.email, "env@example.com");
        assert_eq!(source, CredentialSource::Environment);

        let (creds, source) = store.lookup(&Config::default()).unwrap();
        assert_eq!(creds.email, "saved@example.com");
        assert_eq!(source, CredentialSource::SavedFile);
    }

    #[test]
    fn test_debug_redacts_password() {
        let creds = Credentials {
            email: "rider@example.com".to_string(),
            password: "hunter2".to_string(),
        };
        assert!(!format!("{creds:?}").contains("hunter2"));
    }
}
