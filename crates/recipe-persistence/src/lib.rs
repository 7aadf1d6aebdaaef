//! Persistence layer for Recipe Bot.
//!
//! This crate provides the [`RecipeStore`] abstraction over per-user recipe
//! collections and its backends. The file-backed store keeps one JSON file
//! per user and replaces it with atomic file operations (write to temp file,
//! then rename), serializing writes per user.
//!
//! # Example
//!
//! ```no_run
//! use recipe_models::{NewRecipe, UserId};
//! use recipe_persistence::{JsonFileStore, RecipeStore};
//!
//! # async fn demo() -> recipe_persistence::Result<()> {
//! let store = JsonFileStore::open("/var/lib/recipe-bot")?;
//!
//! let saved = store
//!     .save(UserId(42), NewRecipe::new("Pancakes").with_ingredients(["flour", "milk"]))
//!     .await?;
//!
//! let loaded = store.get(UserId(42), &saved.id).await?;
//! assert_eq!(loaded.name, "Pancakes");
//! # Ok(())
//! # }
//! ```

pub mod atomic;
pub mod collection;
pub mod error;
pub mod json_store;
pub mod locks;
pub mod memory_store;
pub mod store;

pub use collection::Collection;
pub use error::{PersistenceError, Result};
pub use json_store::JsonFileStore;
pub use locks::UserLocks;
pub use memory_store::MemoryStore;
pub use store::{open_store, RecipeStore, StorageKind};
