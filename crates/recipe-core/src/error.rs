//! Error types for configuration and recipe generation.

use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required environment variable is not set.
    #[error("{0} not set in environment")]
    Missing(&'static str),

    /// An environment variable has a value we cannot use.
    #[error("invalid value for {var}: {value} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Errors from the AI recipe service.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// The service rejected our API key.
    #[error("invalid API key")]
    InvalidApiKey,

    /// The service is rate limiting us.
    #[error("rate limit exceeded")]
    RateLimited,

    /// Any other non-success HTTP status.
    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },

    /// The request never got a response (connect failure, timeout, ...).
    #[error("request failed: {0}")]
    Request(String),

    /// The response did not contain any generated text.
    #[error("empty response from model")]
    EmptyResponse,

    /// The response body could not be parsed.
    #[error("failed to parse response: {0}")]
    ResponseParse(String),

    /// Nothing to generate from.
    #[error("no ingredients given")]
    NoIngredients,
}

impl GenerationError {
    /// A short explanation suitable for showing to a chat user.
    pub fn user_message(&self) -> &'static str {
        match self {
            GenerationError::InvalidApiKey => "the AI service rejected the bot's API key",
            GenerationError::RateLimited => "the AI service is busy, try again in a few moments",
            GenerationError::NoIngredients => "please list at least one ingredient",
            GenerationError::Request(_) => "the AI service did not respond in time",
            GenerationError::Api { .. }
            | GenerationError::EmptyResponse
            | GenerationError::ResponseParse(_) => "the AI service returned an error",
        }
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(e: reqwest::Error) -> Self {
        GenerationError::Request(e.to_string())
    }
}

/// Result type for generation operations.
pub type Result<T> = std::result::Result<T, GenerationError>;
