//! Error types for the Telegram bot.

use recipe_core::{ConfigError, GenerationError};
use recipe_persistence::PersistenceError;
use thiserror::Error;

/// Errors that stop the bot from starting or running.
#[derive(Debug, Error)]
pub enum BotError {
    /// Configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The recipe store could not be opened.
    #[error("storage error: {0}")]
    Storage(#[from] PersistenceError),

    /// The AI client could not be built.
    #[error("AI client error: {0}")]
    Generator(#[from] GenerationError),

    /// Failed to start the bot.
    #[error("Failed to start bot: {0}")]
    BotStartFailed(String),

    /// Webhook mode was requested without a public URL.
    #[error("WEBHOOK_URL not set. Webhook mode needs the public URL Telegram should call.")]
    NoWebhookUrl,

    /// Webhook registration failed.
    #[error("Failed to register webhook: {0}")]
    WebhookFailed(String),
}

/// Result type for bot operations.
pub type Result<T> = std::result::Result<T, BotError>;
