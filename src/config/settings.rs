//! Application settings and Telegram configuration.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{DEFAULT_BIRTHDAYS_PATH, DEFAULT_MESSAGES_PATH};

/// Telegram Bot API configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot token issued by `@BotFather`.
    pub bot_token: String,

    /// Destination chat (numeric id or `@channelusername`).
    pub chat_id: String,

    /// Base URL of the Bot API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Optional `parse_mode` sent with every message (`Markdown`, `HTML`, ...).
    #[serde(default)]
    pub parse_mode: Option<String>,
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_owned()
}

fn default_timeout_secs() -> u64 {
    30
}

impl TelegramConfig {
    /// Creates a new Telegram configuration with default API settings.
    #[must_use]
    pub fn new(bot_token: String, chat_id: String) -> Self {
        Self {
            bot_token,
            chat_id,
            api_url: default_api_url(),
            timeout_secs: default_timeout_secs(),
            parse_mode: None,
        }
    }

    /// Creates configuration from environment variables.
    ///
    /// Expects `TELEGRAM_BOT_TOKEN` and `TELEGRAM_CHAT_ID` to be set.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary variable lookup.
    ///
    /// Blank values are treated the same as missing ones.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        };

        let bot_token = get("TELEGRAM_BOT_TOKEN")
            .ok_or(ConfigError::MissingEnvVar("TELEGRAM_BOT_TOKEN"))?;
        let chat_id =
            get("TELEGRAM_CHAT_ID").ok_or(ConfigError::MissingEnvVar("TELEGRAM_CHAT_ID"))?;

        let api_url = get("TELEGRAM_API_URL")
            .map_or_else(default_api_url, |url| url.trim_end_matches('/').to_owned());

        let timeout_secs = match get("TELEGRAM_TIMEOUT_SECS") {
            Some(raw) => raw
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or(ConfigError::InvalidTimeout(raw))?,
            None => default_timeout_secs(),
        };

        Ok(Self {
            bot_token,
            chat_id,
            api_url,
            timeout_secs,
            parse_mode: get("TELEGRAM_PARSE_MODE"),
        })
    }

    /// Returns the request timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// The token must never end up in logs.
impl std::fmt::Debug for TelegramConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramConfig")
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .field("api_url", &self.api_url)
            .field("timeout_secs", &self.timeout_secs)
            .field("parse_mode", &self.parse_mode)
            .finish()
    }
}

/// Bot-specific settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotSettings {
    /// Path to the birthdays JSON file.
    #[serde(default = "default_birthdays_path")]
    pub birthdays_path: PathBuf,

    /// Path to the message templates JSON file.
    #[serde(default = "default_messages_path")]
    pub messages_path: PathBuf,
}

fn default_birthdays_path() -> PathBuf {
    PathBuf::from(DEFAULT_BIRTHDAYS_PATH)
}

fn default_messages_path() -> PathBuf {
    PathBuf::from(DEFAULT_MESSAGES_PATH)
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            birthdays_path: default_birthdays_path(),
            messages_path: default_messages_path(),
        }
    }
}

impl BotSettings {
    /// Creates bot settings from environment variables with defaults.
    #[must_use]
    pub fn from_env_with_defaults() -> Self {
        Self {
            birthdays_path: std::env::var("BIRTHDAYS_PATH")
                .map_or_else(|_| default_birthdays_path(), PathBuf::from),
            messages_path: std::env::var("MESSAGES_PATH")
                .map_or_else(|_| default_messages_path(), PathBuf::from),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Invalid TELEGRAM_TIMEOUT_SECS value {0:?} (must be a positive integer)")]
    InvalidTimeout(String),

    #[error("No message templates available")]
    NoTemplates,
}
