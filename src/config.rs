use std::time::Duration;
use thiserror::Error;

use crate::kernel::session::{DEFAULT_EMAIL, DEFAULT_NAME};

pub const ENV_API_BASE: &str = "CONCIERGE_API_BASE";
pub const ENV_BOT_DELAY_MS: &str = "CONCIERGE_BOT_DELAY_MS";
pub const ENV_TIMEOUT_MS: &str = "CONCIERGE_TIMEOUT_MS";
pub const ENV_BOT_TITLE: &str = "CONCIERGE_BOT_TITLE";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{key} must be a whole number of milliseconds, got '{value}'")]
    InvalidMillis { key: &'static str, value: String },

    #[error("{key} must not be empty")]
    Empty { key: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetConfig {
    /// Origin of the dialog backend, without a trailing path.
    pub api_base: String,
    /// Reading pause between a bot reply and the affordance that follows it.
    pub bot_delay: Duration,
    pub request_timeout: Duration,
    pub bot_title: String,
    /// Substituted when the pre-chat name is empty.
    pub default_name: String,
    /// Substituted when the pre-chat email does not validate.
    pub default_email: String,
    /// Values the pre-chat form opens with.
    pub prechat_name: String,
    pub prechat_email: String,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:5000".to_string(),
            bot_delay: Duration::from_millis(500),
            request_timeout: Duration::from_secs(10),
            bot_title: "Support Bot".to_string(),
            default_name: DEFAULT_NAME.to_string(),
            default_email: DEFAULT_EMAIL.to_string(),
            prechat_name: "John Doe".to_string(),
            prechat_email: "john.doe@example.com".to_string(),
        }
    }
}

impl WidgetConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as `from_env`, reading values through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(base) = lookup(ENV_API_BASE) {
            let base = base.trim();
            if base.is_empty() {
                return Err(ConfigError::Empty { key: ENV_API_BASE });
            }
            config.api_base = base.trim_end_matches('/').to_string();
        }
        if let Some(raw) = lookup(ENV_BOT_DELAY_MS) {
            config.bot_delay = parse_millis(ENV_BOT_DELAY_MS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_MS) {
            config.request_timeout = parse_millis(ENV_TIMEOUT_MS, &raw)?;
        }
        if let Some(title) = lookup(ENV_BOT_TITLE) {
            if !title.trim().is_empty() {
                config.bot_title = title.trim().to_string();
            }
        }

        Ok(config)
    }
}

fn parse_millis(key: &'static str, raw: &str) -> Result<Duration, ConfigError> {
    raw.trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|_| ConfigError::InvalidMillis { key, value: raw.to_string() })
}
