//! Recipe types for Recipe Bot.
//!
//! A [`Recipe`] is the persisted record. New recipes enter the system as a
//! [`NewRecipe`] draft (the store assigns the identifier and timestamps), and
//! edits arrive as a [`RecipePatch`] naming only the fields to replace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::RecipeId;

/// Where a recipe came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RecipeSource {
    /// Written by the user.
    #[default]
    User,
    /// Generated (or improved) by the AI service.
    Ai,
}

impl RecipeSource {
    /// Returns true for AI-generated recipes.
    pub fn is_ai(self) -> bool {
        matches!(self, RecipeSource::Ai)
    }
}

/// A stored recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Identifier, unique within the owner's collection.
    pub id: RecipeId,

    /// Display name. Never empty.
    pub name: String,

    /// Ingredients, in the order the recipe lists them.
    #[serde(default)]
    pub ingredients: Vec<String>,

    /// Instruction steps, in order.
    #[serde(default)]
    pub instructions: Vec<String>,

    /// Whether the user or the AI wrote this recipe.
    #[serde(default)]
    pub source: RecipeSource,

    /// When the recipe was first saved.
    pub created_at: DateTime<Utc>,

    /// When the recipe was last changed.
    pub updated_at: DateTime<Utc>,
}

impl Recipe {
    /// Builds a stored recipe from a draft, assigning an ID if the draft has none.
    pub fn from_new(new: NewRecipe, now: DateTime<Utc>) -> Self {
        Self {
            id: new.id.unwrap_or_default(),
            name: new.name.trim().to_string(),
            ingredients: new.ingredients,
            instructions: new.instructions,
            source: new.source,
            created_at: now,
            updated_at: now,
        }
    }

    /// Applies a patch, replacing only the fields it names.
    ///
    /// `updated_at` is bumped when anything was replaced. Returns whether the
    /// patch changed anything.
    pub fn apply(&mut self, patch: RecipePatch, now: DateTime<Utc>) -> bool {
        if patch.is_empty() {
            return false;
        }
        if let Some(name) = patch.name {
            self.name = name.trim().to_string();
        }
        if let Some(ingredients) = patch.ingredients {
            self.ingredients = ingredients;
        }
        if let Some(instructions) = patch.instructions {
            self.instructions = instructions;
        }
        if let Some(source) = patch.source {
            self.source = source;
        }
        self.updated_at = now;
        true
    }
}

/// A recipe that has not been saved yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewRecipe {
    /// Identifier to store under. `None` lets the store assign one.
    pub id: Option<RecipeId>,
    pub name: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
    pub source: RecipeSource,
}

impl NewRecipe {
    /// Creates a user-authored draft with the given name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Sets the ingredients.
    pub fn with_ingredients<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients = ingredients.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the instruction steps.
    pub fn with_instructions<I, S>(mut self, instructions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instructions = instructions.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the source tag.
    pub fn with_source(mut self, source: RecipeSource) -> Self {
        self.source = source;
        self
    }

    /// Stores under a caller-chosen identifier.
    pub fn with_id(mut self, id: impl Into<RecipeId>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// Replacement values for selected recipe fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipePatch {
    pub name: Option<String>,
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<Vec<String>>,
    pub source: Option<RecipeSource>,
}

impl RecipePatch {
    /// A patch that renames the recipe.
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// A patch that replaces the ingredient list.
    pub fn ingredients(ingredients: Vec<String>) -> Self {
        Self {
            ingredients: Some(ingredients),
            ..Default::default()
        }
    }

    /// A patch that replaces the instruction steps.
    pub fn instructions(instructions: Vec<String>) -> Self {
        Self {
            instructions: Some(instructions),
            ..Default::default()
        }
    }

    /// Also set the source tag.
    pub fn with_source(mut self, source: RecipeSource) -> Self {
        self.source = Some(source);
        self
    }

    /// True if the patch names no field.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.ingredients.is_none()
            && self.instructions.is_none()
            && self.source.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn sample() -> Recipe {
        let draft = NewRecipe::new("  Pancakes ")
            .with_ingredients(["flour", "milk", "eggs"])
            .with_instructions(["Mix", "Fry"]);
        Recipe::from_new(draft, Utc::now())
    }

    #[test]
    fn test_from_new_assigns_id_and_trims_name() {
        let recipe = sample();
        assert!(recipe.id.as_str().starts_with("rcp-"));
        assert_eq!(recipe.name, "Pancakes");
        assert_eq!(recipe.source, RecipeSource::User);
        assert_eq!(recipe.created_at, recipe.updated_at);
    }

    #[test]
    fn test_from_new_keeps_supplied_id() {
        let draft = NewRecipe::new("Soup").with_id("rcp-soup");
        let recipe = Recipe::from_new(draft, Utc::now());
        assert_eq!(recipe.id.as_str(), "rcp-soup");
    }

    #[test]
    fn test_apply_only_touches_named_fields() {
        let mut recipe = sample();
        let before = recipe.clone();
        let later = recipe.updated_at + Duration::seconds(5);

        assert!(recipe.apply(RecipePatch::name("Crepes"), later));

        assert_eq!(recipe.name, "Crepes");
        assert_eq!(recipe.ingredients, before.ingredients);
        assert_eq!(recipe.instructions, before.instructions);
        assert_eq!(recipe.source, before.source);
        assert_eq!(recipe.created_at, before.created_at);
        assert_eq!(recipe.updated_at, later);
    }

    #[test]
    fn test_apply_empty_patch_is_noop() {
        let mut recipe = sample();
        let before = recipe.clone();
        assert!(!recipe.apply(RecipePatch::default(), Utc::now() + Duration::seconds(1)));
        assert_eq!(recipe, before);
    }

    #[test]
    fn test_source_serializes_snake_case() {
        assert_eq!(serde_json::to_string(&RecipeSource::Ai).unwrap(), "\"ai\"");
        assert_eq!(serde_json::to_string(&RecipeSource::User).unwrap(), "\"user\"");
    }

    #[test]
    fn test_recipe_missing_lists_default_to_empty() {
        let json = r#"{
            "id": "rcp-1",
            "name": "Toast",
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        }"#;
        let recipe: Recipe = serde_json::from_str(json).unwrap();
        assert!(recipe.ingredients.is_empty());
        assert!(recipe.instructions.is_empty());
        assert_eq!(recipe.source, RecipeSource::User);
    }
}
