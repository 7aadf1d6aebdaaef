//! In-memory form of one user's recipe collection.
//!
//! Both backends load a whole [`Collection`], change it here, and hand it
//! back whole, so the edit rules live in one place.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use recipe_models::{NewRecipe, Recipe, RecipeId, RecipePatch, UserId};
use serde::{Deserialize, Serialize};

use crate::error::{PersistenceError, Result};

/// All recipes of one user, keyed by recipe ID.
///
/// Serializes as a JSON object mapping each recipe ID to its fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection {
    recipes: BTreeMap<RecipeId, Recipe>,
}

impl Collection {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recipes.
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    /// True if the collection holds no recipes.
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// Makes every recipe's `id` agree with the key it is stored under.
    ///
    /// Returns the number of records that had to be fixed.
    pub fn normalize_ids(&mut self) -> usize {
        let mut fixed = 0;
        for (key, recipe) in self.recipes.iter_mut() {
            if &recipe.id != key {
                recipe.id = key.clone();
                fixed += 1;
            }
        }
        fixed
    }

    /// Recipes ordered by creation time, oldest first, ties broken by ID.
    pub fn sorted(&self) -> Vec<Recipe> {
        let mut recipes: Vec<Recipe> = self.recipes.values().cloned().collect();
        recipes.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.id.cmp(&b.id))
        });
        recipes
    }

    /// Looks up one recipe.
    pub fn get(&self, user_id: UserId, recipe_id: &RecipeId) -> Result<&Recipe> {
        self.recipes
            .get(recipe_id)
            .ok_or_else(|| not_found(user_id, recipe_id))
    }

    /// Inserts a draft, assigning an ID if it has none.
    ///
    /// A draft carrying an ID that already exists replaces that recipe but
    /// keeps its original creation time.
    pub fn insert(&mut self, recipe: NewRecipe, now: DateTime<Utc>) -> Result<Recipe> {
        validate_name(&recipe.name)?;
        let mut recipe = Recipe::from_new(recipe, now);
        if let Some(existing) = self.recipes.get(&recipe.id) {
            recipe.created_at = existing.created_at;
        }
        self.recipes.insert(recipe.id.clone(), recipe.clone());
        Ok(recipe)
    }

    /// Replaces the fields named by `patch` on an existing recipe.
    pub fn update(
        &mut self,
        user_id: UserId,
        recipe_id: &RecipeId,
        patch: RecipePatch,
        now: DateTime<Utc>,
    ) -> Result<Recipe> {
        if let Some(name) = &patch.name {
            validate_name(name)?;
        }
        let recipe = self
            .recipes
            .get_mut(recipe_id)
            .ok_or_else(|| not_found(user_id, recipe_id))?;
        recipe.apply(patch, now);
        Ok(recipe.clone())
    }

    /// Removes a recipe and returns it.
    pub fn remove(&mut self, user_id: UserId, recipe_id: &RecipeId) -> Result<Recipe> {
        self.recipes
            .remove(recipe_id)
            .ok_or_else(|| not_found(user_id, recipe_id))
    }
}

fn not_found(user_id: UserId, recipe_id: &RecipeId) -> PersistenceError {
    PersistenceError::NotFound {
        user_id,
        recipe_id: recipe_id.clone(),
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(PersistenceError::InvalidData(
            "recipe name must not be empty".to_string(),
        ));
    }
    Ok(())
}
