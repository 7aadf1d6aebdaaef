//! RecipeGenerator trait for AI recipe backends.

use async_trait::async_trait;
use recipe_models::Recipe;

use crate::error::Result;

/// An AI service that writes recipes.
///
/// Each call is a single remote request with no retry.
#[async_trait]
pub trait RecipeGenerator: Send + Sync {
    /// Writes a recipe that uses the given ingredients, in order of mention.
    async fn generate(&self, ingredients: &[String]) -> Result<String>;

    /// Checks an existing recipe and returns an improved version of it.
    async fn improve(&self, recipe: &Recipe) -> Result<String>;
}
