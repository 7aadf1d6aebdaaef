//! File-backed recipe store.

use std::fs;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use recipe_models::{NewRecipe, Recipe, RecipeId, RecipePatch, UserId};
use tracing::{debug, info, warn};

use crate::atomic::{atomic_write, atomic_write_json, read_json_optional};
use crate::collection::Collection;
use crate::error::{PersistenceError, Result};
use crate::locks::UserLocks;
use crate::store::RecipeStore;

/// Stores each user's collection as one JSON file.
///
/// ```text
/// root/
/// ├── user_1001.json
/// └── user_1002.json
/// ```
///
/// Each file is a JSON object mapping recipe IDs to recipes. Files are only
/// ever replaced whole through an atomic rename.
pub struct JsonFileStore {
    root: PathBuf,
    locks: UserLocks,
}

impl JsonFileStore {
    /// Creates a store rooted at `root` without touching the filesystem.
    ///
    /// The directory is created lazily on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            locks: UserLocks::new(),
        }
    }

    /// Creates the storage root and checks that it is writable.
    pub fn open(root: impl Into<PathBuf>) -> Result<Self> {
        let store = Self::new(root);
        fs::create_dir_all(&store.root).map_err(|source| PersistenceError::DirectoryError {
            path: store.root.clone(),
            source,
        })?;

        let check_file = store.root.join(".write_test");
        atomic_write(&check_file, b"ok")?;
        fs::remove_file(&check_file)
            .map_err(|source| PersistenceError::WriteError { path: check_file, source })?;

        info!(path = %store.root.display(), "Recipe storage initialized");
        Ok(store)
    }

    /// Path of a user's collection file.
    pub fn user_file(&self, user_id: UserId) -> PathBuf {
        self.root.join(format!("user_{}.json", user_id))
    }

    fn load(&self, user_id: UserId) -> Result<Collection> {
        let path = self.user_file(user_id);
        let Some(mut collection) = read_json_optional::<Collection>(&path)? else {
            return Ok(Collection::new());
        };

        let fixed = collection.normalize_ids();
        if fixed > 0 {
            warn!(user_id = %user_id, fixed, "Recipe ids disagreed with their keys");
        }
        Ok(collection)
    }

    fn persist(&self, user_id: UserId, collection: &Collection) -> Result<()> {
        let path = self.user_file(user_id);
        atomic_write_json(&path, collection)?;
        debug!(user_id = %user_id, count = collection.len(), "Saved recipe collection");
        Ok(())
    }
}

#[async_trait]
impl RecipeStore for JsonFileStore {
    fn backend(&self) -> &'static str {
        "json"
    }

    async fn save(&self, user_id: UserId, recipe: NewRecipe) -> Result<Recipe> {
        let _guard = self.locks.lock(user_id).await;
        let mut collection = self.load(user_id)?;
        let saved = collection.insert(recipe, Utc::now())?;
        self.persist(user_id, &collection)?;
        info!(user_id = %user_id, recipe_id = %saved.id, "Saved recipe");
        Ok(saved)
    }

    async fn list(&self, user_id: UserId) -> Result<Vec<Recipe>> {
        let _guard = self.locks.lock(user_id).await;
        Ok(self.load(user_id)?.sorted())
    }

    async fn get(&self, user_id: UserId, recipe_id: &RecipeId) -> Result<Recipe> {
        let _guard = self.locks.lock(user_id).await;
        self.load(user_id)?.get(user_id, recipe_id).cloned()
    }

    async fn update(
        &self,
        user_id: UserId,
        recipe_id: &RecipeId,
        patch: RecipePatch,
    ) -> Result<Recipe> {
        let _guard = self.locks.lock(user_id).await;
        let mut collection = self.load(user_id)?;
        let updated = collection.update(user_id, recipe_id, patch, Utc::now())?;
        self.persist(user_id, &collection)?;
        info!(user_id = %user_id, recipe_id = %recipe_id, "Updated recipe");
        Ok(updated)
    }

    async fn delete(&self, user_id: UserId, recipe_id: &RecipeId) -> Result<Recipe> {
        let _guard = self.locks.lock(user_id).await;
        let mut collection = self.load(user_id)?;
        let removed = collection.remove(user_id, recipe_id)?;
        self.persist(user_id, &collection)?;
        info!(user_id = %user_id, recipe_id = %recipe_id, "Deleted recipe");
        Ok(removed)
    }
}
