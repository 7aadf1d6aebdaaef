//! Shared state for the Telegram bot.

use std::collections::HashMap;
use std::sync::Arc;

use recipe_core::RecipeGenerator;
use recipe_models::{RecipeId, UserId};
use recipe_persistence::RecipeStore;
use tokio::sync::RwLock;
use tracing::debug;

use crate::callback::EditField;

/// Where a user is inside a multi-message command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dialogue {
    /// `/generate` is waiting for the ingredient list.
    AwaitingIngredients,
    /// `/add` is waiting for the recipe name.
    AwaitingName,
    /// `/add` has a name and is waiting for ingredients.
    AwaitingAddIngredients { name: String },
    /// `/add` has name and ingredients and is waiting for the steps.
    AwaitingAddInstructions {
        name: String,
        ingredients: Vec<String>,
    },
    /// An edit is waiting for the new value of one field.
    AwaitingEdit {
        recipe_id: RecipeId,
        field: EditField,
    },
}

impl Dialogue {
    /// True while a remote AI call will follow the next message.
    pub fn expects_generation(&self) -> bool {
        matches!(self, Dialogue::AwaitingIngredients)
    }
}

/// Everything the handlers need, passed explicitly into each update.
pub struct BotContext {
    store: Arc<dyn RecipeStore>,
    generator: Arc<dyn RecipeGenerator>,
    dialogues: RwLock<HashMap<UserId, Dialogue>>,
}

impl BotContext {
    /// Create a context around a store and an AI generator.
    pub fn new(store: Arc<dyn RecipeStore>, generator: Arc<dyn RecipeGenerator>) -> Self {
        Self {
            store,
            generator,
            dialogues: RwLock::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &dyn RecipeStore {
        self.store.as_ref()
    }

    pub fn generator(&self) -> &dyn RecipeGenerator {
        self.generator.as_ref()
    }

    /// The user's current dialogue, if any.
    pub async fn dialogue(&self, user_id: UserId) -> Option<Dialogue> {
        self.dialogues.read().await.get(&user_id).cloned()
    }

    /// Start or advance a dialogue, replacing whatever was in progress.
    pub async fn set_dialogue(&self, user_id: UserId, dialogue: Dialogue) {
        debug!(user_id = %user_id, dialogue = ?dialogue, "Dialogue state set");
        self.dialogues.write().await.insert(user_id, dialogue);
    }

    /// End the user's dialogue and return it.
    pub async fn take_dialogue(&self, user_id: UserId) -> Option<Dialogue> {
        self.dialogues.write().await.remove(&user_id)
    }

    /// Number of users with a dialogue in progress.
    pub async fn active_dialogues(&self) -> usize {
        self.dialogues.read().await.len()
    }
}

/// Create a shared context.
pub fn create_shared_context(
    store: Arc<dyn RecipeStore>,
    generator: Arc<dyn RecipeGenerator>,
) -> Arc<BotContext> {
    Arc::new(BotContext::new(store, generator))
}
