//! Error types for persistence operations.

use std::path::PathBuf;

use recipe_models::{RecipeId, UserId};
use thiserror::Error;

/// Errors that can occur during persistence operations.
#[derive(Error, Debug)]
pub enum PersistenceError {
    /// Failed to read from file system.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write to file system.
    #[error("failed to write {path}: {source}")]
    WriteError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to serialize or parse JSON.
    #[error("failed to serialize: {0}")]
    SerializeError(#[from] serde_json::Error),

    /// Failed to create directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Recipe not found in the user's collection.
    #[error("recipe {recipe_id} not found for user {user_id}")]
    NotFound { user_id: UserId, recipe_id: RecipeId },

    /// Invalid data (corrupt collection file, empty recipe name, ...).
    #[error("invalid data: {0}")]
    InvalidData(String),
}

impl PersistenceError {
    /// True if the requested recipe does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, PersistenceError::NotFound { .. })
    }
}

/// Result type alias for persistence operations.
pub type Result<T> = std::result::Result<T, PersistenceError>;
