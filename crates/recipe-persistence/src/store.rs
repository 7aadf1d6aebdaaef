//! RecipeStore trait definition for storage backends.
//!
//! Every backend keeps one collection per user and exposes the same five
//! operations. Mutations read the user's whole collection, change it, and
//! write it back as a unit while holding that user's lock.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use recipe_models::{NewRecipe, Recipe, RecipeId, RecipePatch, UserId};

use crate::error::{PersistenceError, Result};
use crate::json_store::JsonFileStore;
use crate::memory_store::MemoryStore;

/// Trait for recipe storage backends.
#[async_trait]
pub trait RecipeStore: Send + Sync {
    /// Short backend name for logs.
    fn backend(&self) -> &'static str;

    /// Saves a recipe into the user's collection.
    ///
    /// Assigns an ID when the draft has none. The collection is created on
    /// the first save for a user.
    async fn save(&self, user_id: UserId, recipe: NewRecipe) -> Result<Recipe>;

    /// Lists the user's recipes, oldest first.
    ///
    /// A user who never saved anything has an empty list, not an error.
    async fn list(&self, user_id: UserId) -> Result<Vec<Recipe>>;

    /// Gets one recipe.
    ///
    /// # Errors
    /// [`PersistenceError::NotFound`] if the user has no such recipe.
    async fn get(&self, user_id: UserId, recipe_id: &RecipeId) -> Result<Recipe>;

    /// Replaces the fields named in `patch` and returns the updated recipe.
    ///
    /// # Errors
    /// [`PersistenceError::NotFound`] if the user has no such recipe.
    async fn update(
        &self,
        user_id: UserId,
        recipe_id: &RecipeId,
        patch: RecipePatch,
    ) -> Result<Recipe>;

    /// Deletes a recipe and returns what was removed.
    ///
    /// # Errors
    /// [`PersistenceError::NotFound`] if the user has no such recipe.
    async fn delete(&self, user_id: UserId, recipe_id: &RecipeId) -> Result<Recipe>;
}

/// Which storage backend to run with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StorageKind {
    /// One JSON file per user under a storage root.
    #[default]
    Json,
    /// Process memory only; lost on exit.
    Memory,
}

impl StorageKind {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageKind::Json => "json",
            StorageKind::Memory => "memory",
        }
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageKind {
    type Err = PersistenceError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" | "file" => Ok(StorageKind::Json),
            "memory" | "mem" => Ok(StorageKind::Memory),
            other => Err(PersistenceError::InvalidData(format!(
                "unknown storage type '{}' (expected json or memory)",
                other
            ))),
        }
    }
}

/// Opens the configured backend.
///
/// For [`StorageKind::Json`] the storage root is created and checked for
/// writability up front.
pub fn open_store(kind: StorageKind, root: impl Into<PathBuf>) -> Result<Arc<dyn RecipeStore>> {
    match kind {
        StorageKind::Json => Ok(Arc::new(JsonFileStore::open(root)?)),
        StorageKind::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}
