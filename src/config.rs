use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

pub const TELEGRAM_TOKEN_VAR: &str = "TELEGRAM_TOKEN";
pub const TRANSLATE_API_KEY_VAR: &str = "TRANSLATE_API_KEY";
pub const AUTHED_CHAT_VAR: &str = "AUTHED_CHAT";
pub const TRANSLATE_API_URL_VAR: &str = "TRANSLATE_API_URL";
pub const TELEGRAM_API_URL_VAR: &str = "TELEGRAM_API_URL";
pub const POLL_TIMEOUT_VAR: &str = "POLL_TIMEOUT";

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub translate: TranslateConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TelegramConfig {
    pub bot_token: String,
    /// The only chat allowed to issue commands
    pub authorized_chat_id: i64,
    /// Bot API base URL override (e.g. a local Bot API server)
    #[serde(default)]
    pub api_url: Option<String>,
    #[serde(default = "default_poll_timeout_secs")]
    pub poll_timeout_secs: u32,
}

impl TelegramConfig {
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(u64::from(self.poll_timeout_secs))
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TranslateConfig {
    pub api_key: String,
    #[serde(default = "default_translate_base_url")]
    pub base_url: String,
}

fn default_poll_timeout_secs() -> u32 {
    60
}

fn default_translate_base_url() -> String {
    "https://translation.googleapis.com".to_string()
}

/// Load `.env` into the process environment.
///
/// A missing file is not an error; a file that cannot be read or parsed is.
pub fn load_dotenv() -> Result<Option<PathBuf>> {
    dotenv_outcome(dotenvy::dotenv())
}

fn dotenv_outcome(result: dotenvy::Result<PathBuf>) -> Result<Option<PathBuf>> {
    match result {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e).context("Failed to load .env file"),
    }
}

impl Config {
    /// Load from a TOML file with `[telegram]` and `[translate]` sections.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{} must be set", key))
        };

        let authorized_chat_id = required(AUTHED_CHAT_VAR)?
            .trim()
            .parse::<i64>()
            .with_context(|| format!("{} must be a 64-bit integer", AUTHED_CHAT_VAR))?;

        let poll_timeout_secs = match lookup(POLL_TIMEOUT_VAR).filter(|v| !v.trim().is_empty()) {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .with_context(|| format!("{} must be a number of seconds", POLL_TIMEOUT_VAR))?,
            None => default_poll_timeout_secs(),
        };

        let config = Config {
            telegram: TelegramConfig {
                bot_token: required(TELEGRAM_TOKEN_VAR)?,
                authorized_chat_id,
                api_url: lookup(TELEGRAM_API_URL_VAR).filter(|v| !v.trim().is_empty()),
                poll_timeout_secs,
            },
            translate: TranslateConfig {
                api_key: required(TRANSLATE_API_KEY_VAR)?,
                base_url: lookup(TRANSLATE_API_URL_VAR)
                    .filter(|v| !v.trim().is_empty())
                    .unwrap_or_else(default_translate_base_url),
            },
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.telegram.bot_token.trim().is_empty() {
            anyhow::bail!("Telegram bot token is empty");
        }
        if self.translate.api_key.trim().is_empty() {
            anyhow::bail!("Translate API key is empty");
        }
        Ok(())
    }
}
