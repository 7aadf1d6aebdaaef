//! In-process recipe store, for tests and throwaway runs.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use recipe_models::{NewRecipe, Recipe, RecipeId, RecipePatch, UserId};
use tokio::sync::RwLock;
use tracing::debug;

use crate::collection::Collection;
use crate::error::Result;
use crate::locks::UserLocks;
use crate::store::RecipeStore;

/// Keeps every collection in a map, with writes serialized per user.
///
/// A mutation holds its user's lock for the whole read-modify-write and only
/// touches the shared map briefly, to copy the collection out and to put the
/// changed copy back. A failed mutation never writes back, so it leaves no
/// trace, not even an empty collection.
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<UserId, Collection>>,
    locks: UserLocks,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of users with a collection.
    pub async fn user_count(&self) -> usize {
        self.collections.read().await.len()
    }

    async fn snapshot(&self, user_id: UserId) -> Collection {
        self.collections
            .read()
            .await
            .get(&user_id)
            .cloned()
            .unwrap_or_default()
    }

    async fn write_back(&self, user_id: UserId, collection: Collection) {
        self.collections.write().await.insert(user_id, collection);
    }
}

#[async_trait]
impl RecipeStore for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn save(&self, user_id: UserId, recipe: NewRecipe) -> Result<Recipe> {
        let _guard = self.locks.lock(user_id).await;
        let mut collection = self.snapshot(user_id).await;
        let saved = collection.insert(recipe, Utc::now())?;
        self.write_back(user_id, collection).await;
        debug!(user_id = %user_id, recipe_id = %saved.id, "Stored recipe in memory");
        Ok(saved)
    }

    async fn list(&self, user_id: UserId) -> Result<Vec<Recipe>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(&user_id)
            .map(Collection::sorted)
            .unwrap_or_default())
    }

    async fn get(&self, user_id: UserId, recipe_id: &RecipeId) -> Result<Recipe> {
        let collections = self.collections.read().await;
        match collections.get(&user_id) {
            Some(collection) => collection.get(user_id, recipe_id).cloned(),
            None => Collection::new().get(user_id, recipe_id).cloned(),
        }
    }

    async fn update(
        &self,
        user_id: UserId,
        recipe_id: &RecipeId,
        patch: RecipePatch,
    ) -> Result<Recipe> {
        let _guard = self.locks.lock(user_id).await;
        let mut collection = self.snapshot(user_id).await;
        let updated = collection.update(user_id, recipe_id, patch, Utc::now())?;
        self.write_back(user_id, collection).await;
        Ok(updated)
    }

    async fn delete(&self, user_id: UserId, recipe_id: &RecipeId) -> Result<Recipe> {
        let _guard = self.locks.lock(user_id).await;
        let mut collection = self.snapshot(user_id).await;
        let removed = collection.remove(user_id, recipe_id)?;
        self.write_back(user_id, collection).await;
        Ok(removed)
    }
}
