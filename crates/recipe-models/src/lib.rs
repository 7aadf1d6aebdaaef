//! Core data models for Recipe Bot.
//!
//! This crate provides the fundamental data types shared by the storage
//! layer, the AI client and the Telegram front end.

pub mod ids;
pub mod recipe;

// Re-export main types
pub use ids::{RecipeId, UserId};
pub use recipe::{NewRecipe, Recipe, RecipePatch, RecipeSource};
