//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::{AppError, Result};

/// Nested Telegram connectivity settings.
///
/// The bot token is loaded at runtime via OS keychain or environment
/// variable, never from the TOML config file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct TelegramConfig {
    /// Bot API base URL; overridable for tests and local API servers.
    #[serde(default = "default_api_base")]
    pub api_base: String,
    /// `getUpdates` long-poll timeout in seconds.
    #[serde(default = "default_poll_timeout")]
    pub poll_timeout_seconds: u64,
    /// Bot token (populated at runtime).
    #[serde(skip)]
    pub bot_token: String,
}

fn default_api_base() -> String {
    "https://api.telegram.org".into()
}

fn default_poll_timeout() -> u64 {
    30
}

/// Reminder sweep cadence and escalation window.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ReminderConfig {
    /// Seconds between sweep passes.
    #[serde(default = "default_sweep_seconds")]
    pub sweep_interval_seconds: u64,
    /// Minutes before the scheduled time when timeliness is escalated.
    #[serde(default = "default_lookahead_minutes")]
    pub lookahead_minutes: u32,
}

fn default_sweep_seconds() -> u64 {
    60
}

fn default_lookahead_minutes() -> u32 {
    30
}

fn default_send_spacing_ms() -> u64 {
    50
}

fn default_locale() -> String {
    "en".into()
}

fn default_utc_offset_hours() -> i8 {
    3
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Path to the `SQLite` database file.
    pub db_path: PathBuf,
    /// The single user id authorized to manage tasks, types, and workers.
    pub operator_id: i64,
    /// Default country calling code applied to national phone input.
    pub default_country_code: String,
    /// Locale used when a user's preferred locale is unsupported.
    #[serde(default = "default_locale")]
    pub default_locale: String,
    /// Fixed UTC offset (hours) used to interpret wall-clock time input.
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i8,
    /// Minimum spacing between consecutive fan-out sends, in milliseconds.
    #[serde(default = "default_send_spacing_ms")]
    pub send_spacing_ms: u64,
    /// Telegram connectivity settings.
    pub telegram: TelegramConfig,
    /// Reminder sweep settings.
    #[serde(default)]
    pub reminder: ReminderConfig,
}

impl Default for ReminderConfig {
    fn default() -> Self {
        Self {
            sweep_interval_seconds: default_sweep_seconds(),
            lookahead_minutes: default_lookahead_minutes(),
        }
    }
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        Self::from_toml_str(&raw)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the bot token from OS keychain with env-var fallback.
    ///
    /// Tries the `crewcall` keyring service first, then falls back to the
    /// `TELEGRAM_BOT_TOKEN` environment variable.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if neither source provides the token.
    pub async fn load_credentials(&mut self) -> Result<()> {
        self.telegram.bot_token =
            load_credential("telegram_bot_token", "TELEGRAM_BOT_TOKEN").await?;
        Ok(())
    }

    /// Minimum spacing between consecutive fan-out sends.
    #[must_use]
    pub fn send_spacing(&self) -> Duration {
        Duration::from_millis(self.send_spacing_ms)
    }

    /// Whether the given user id is the operator.
    #[must_use]
    pub fn is_operator(&self, user_id: i64) -> bool {
        user_id == self.operator_id
    }

    fn validate(&self) -> Result<()> {
        if self.operator_id == 0 {
            return Err(AppError::Config("operator_id must be set".into()));
        }

        if !self.default_country_code.starts_with('+')
            || self.default_country_code.len() < 2
            || !self.default_country_code[1..].bytes().all(|b| b.is_ascii_digit())
        {
            return Err(AppError::Config(
                "default_country_code must look like +<digits>".into(),
            ));
        }

        if self.reminder.sweep_interval_seconds == 0 {
            return Err(AppError::Config(
                "reminder.sweep_interval_seconds must be greater than zero".into(),
            ));
        }

        if !(-12..=14).contains(&self.utc_offset_hours) {
            return Err(AppError::Config("utc_offset_hours out of range".into()));
        }

        Ok(())
    }
}

/// Load a single credential from OS keychain with env-var fallback.
async fn load_credential(keyring_key: &str, env_key: &str) -> Result<String> {
    let key = keyring_key.to_owned();

    // Keyring is synchronous I/O; keep it off the async worker threads.
    let keychain_result = tokio::task::spawn_blocking(move || {
        keyring::Entry::new("crewcall", &key).and_then(|entry| entry.get_password())
    })
    .await
    .map_err(|err| AppError::Config(format!("keychain task panicked: {err}")))?;

    match keychain_result {
        Ok(value) if !value.is_empty() => return Ok(value),
        Ok(_) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Err(err) => {
            warn!(
                key = keyring_key,
                ?err,
                "keychain lookup failed, trying env var"
            );
        }
    }

    env::var(env_key).map_err(|_| {
        AppError::Config(format!(
            "credential {keyring_key} not found in keychain or {env_key} env var"
        ))
    })
}
