//! Configuration for Recipe Bot.
//!
//! Everything is read from environment variables. The binary loads `.env`
//! files with `dotenvy` first, so the same names work in either place.
//!
//! # Environment Variables
//!
//! Required:
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather
//! - `OPENAI_API_KEY`: Key for the completion API
//!
//! Optional:
//! - `OPENAI_MODEL`: Model name (default: gpt-4.1-mini)
//! - `OPENAI_API_URL`: Base URL of an OpenAI-compatible API
//! - `OPENAI_TIMEOUT_SECS`: HTTP timeout for one completion (default: 60)
//! - `STORAGE_TYPE`: `json` or `memory` (default: json)
//! - `STORAGE_PATH`: Directory for recipe files (default: ~/.recipe-bot/recipes)
//! - `LOG_LEVEL`: tracing filter directive (default: info)
//! - `WEBHOOK_URL`: Public URL for webhook mode
//! - `WEBHOOK_PORT`: Local port for webhook mode (default: 8443)
//! - `RECIPE_BOT_STATE_DIR`: Override the base state directory

use std::path::PathBuf;
use std::time::Duration;

use recipe_persistence::StorageKind;
use url::Url;

use crate::error::ConfigError;

pub const TELEGRAM_BOT_TOKEN_ENV: &str = "TELEGRAM_BOT_TOKEN";
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";
pub const OPENAI_MODEL_ENV: &str = "OPENAI_MODEL";
pub const OPENAI_API_URL_ENV: &str = "OPENAI_API_URL";
pub const OPENAI_TIMEOUT_ENV: &str = "OPENAI_TIMEOUT_SECS";
pub const STORAGE_TYPE_ENV: &str = "STORAGE_TYPE";
pub const STORAGE_PATH_ENV: &str = "STORAGE_PATH";
pub const LOG_LEVEL_ENV: &str = "LOG_LEVEL";
pub const WEBHOOK_URL_ENV: &str = "WEBHOOK_URL";
pub const WEBHOOK_PORT_ENV: &str = "WEBHOOK_PORT";
pub const STATE_DIR_ENV: &str = "RECIPE_BOT_STATE_DIR";

/// Default model for recipe generation.
pub const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Default base URL of the completion API.
pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1";

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_WEBHOOK_PORT: u16 = 8443;
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default state directory name under home.
const DEFAULT_STATE_DIR: &str = ".recipe-bot";
const RECIPES_SUBDIR: &str = "recipes";

/// Settings for the AI completion client.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    /// API key sent as a bearer token.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Base URL; `/chat/completions` is appended.
    pub api_url: String,
    /// Sampling temperature.
    pub temperature: f32,
    /// Maximum tokens in one completion.
    pub max_tokens: u32,
    /// HTTP timeout for one completion.
    pub timeout: Duration,
}

impl ModelConfig {
    /// Settings for `model` with every other value at its default.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            api_url: DEFAULT_API_URL.to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Points the client at a different OpenAI-compatible API.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    /// Sets the HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Full URL of the chat completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.api_url.trim_end_matches('/'))
    }
}

/// Bot configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_bot_token: String,
    pub model: ModelConfig,
    pub storage_kind: StorageKind,
    pub storage_path: PathBuf,
    pub log_level: String,
    pub webhook_url: Option<Url>,
    pub webhook_port: u16,
}

impl Config {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration through an arbitrary variable lookup.
    ///
    /// Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let telegram_bot_token =
            get(TELEGRAM_BOT_TOKEN_ENV).ok_or(ConfigError::Missing(TELEGRAM_BOT_TOKEN_ENV))?;
        let api_key = get(OPENAI_API_KEY_ENV).ok_or(ConfigError::Missing(OPENAI_API_KEY_ENV))?;

        let mut model = ModelConfig::new(
            api_key,
            get(OPENAI_MODEL_ENV).unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        );
        if let Some(api_url) = get(OPENAI_API_URL_ENV) {
            Url::parse(&api_url).map_err(|e| ConfigError::Invalid {
                var: OPENAI_API_URL_ENV,
                value: api_url.clone(),
                reason: e.to_string(),
            })?;
            model = model.with_api_url(api_url);
        }
        if let Some(secs) = get(OPENAI_TIMEOUT_ENV) {
            let parsed = secs.parse::<u64>().map_err(|e| ConfigError::Invalid {
                var: OPENAI_TIMEOUT_ENV,
                value: secs.clone(),
                reason: e.to_string(),
            })?;
            model = model.with_timeout(Duration::from_secs(parsed));
        }

        let storage_kind = match get(STORAGE_TYPE_ENV) {
            Some(kind) => kind.parse::<StorageKind>().map_err(|e| {
                ConfigError::Invalid {
                    var: STORAGE_TYPE_ENV,
                    value: kind.clone(),
                    reason: e.to_string(),
                }
            })?,
            None => StorageKind::default(),
        };

        let storage_path = match get(STORAGE_PATH_ENV) {
            Some(path) => PathBuf::from(shellexpand::tilde(&path).as_ref()),
            None => default_storage_path(get(STATE_DIR_ENV)),
        };

        let webhook_url = match get(WEBHOOK_URL_ENV) {
            Some(raw) => Some(Url::parse(&raw).map_err(|e| ConfigError::Invalid {
                var: WEBHOOK_URL_ENV,
                value: raw.clone(),
                reason: e.to_string(),
            })?),
            None => None,
        };

        let webhook_port = match get(WEBHOOK_PORT_ENV) {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                var: WEBHOOK_PORT_ENV,
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_WEBHOOK_PORT,
        };

        Ok(Self {
            telegram_bot_token,
            model,
            storage_kind,
            storage_path,
            log_level: get(LOG_LEVEL_ENV).unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
            webhook_url,
            webhook_port,
        })
    }
}

/// Get the Recipe Bot state directory.
///
/// The state directory is determined by:
/// 1. `RECIPE_BOT_STATE_DIR` environment variable if set
/// 2. `~/.recipe-bot` if home directory is available
/// 3. `.recipe-bot` in current directory as fallback
pub fn state_dir() -> PathBuf {
    resolve_state_dir(std::env::var(STATE_DIR_ENV).ok())
}

/// Get the `.env` file kept in the state directory.
pub fn env_file() -> PathBuf {
    state_dir().join(".env")
}

fn resolve_state_dir(overridden: Option<String>) -> PathBuf {
    overridden
        .map(|p| PathBuf::from(shellexpand::tilde(&p).as_ref()))
        .unwrap_or_else(|| {
            dirs::home_dir()
                .map(|h| h.join(DEFAULT_STATE_DIR))
                .unwrap_or_else(|| PathBuf::from(DEFAULT_STATE_DIR))
        })
}

fn default_storage_path(state_dir_override: Option<String>) -> PathBuf {
    resolve_state_dir(state_dir_override).join(RECIPES_SUBDIR)
}
