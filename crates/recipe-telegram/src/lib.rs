//! Telegram bot interface for Recipe Bot.
//!
//! Users chat with the bot to generate recipes from the ingredients they
//! have, save their own recipes, and browse, edit or delete what they saved.
//!
//! # Environment Variables
//!
//! Required:
//! - `TELEGRAM_BOT_TOKEN`: Bot token from @BotFather
//! - `OPENAI_API_KEY`: Key for the chat completions API
//!
//! Optional:
//! - `OPENAI_MODEL`: Model to use (default: gpt-4.1-mini)
//! - `STORAGE_TYPE`: `json` or `memory` (default: json)
//! - `STORAGE_PATH`: Where per-user recipe files live
//! - `WEBHOOK_URL` / `WEBHOOK_PORT`: For webhook mode
//!
//! # Commands
//!
//! - `/start` - Welcome message
//! - `/help` - Show available commands
//! - `/generate` - Create a recipe from ingredients
//! - `/add` - Save your own recipe
//! - `/list` - Browse saved recipes
//! - `/edit <id>` - Edit a recipe
//! - `/delete <id>` - Delete a recipe
//! - `/cancel` - Stop the current action

pub mod bot;
pub mod callback;
pub mod error;
pub mod flow;
pub mod handlers;
pub mod render;
pub mod state;

pub use bot::RecipeBot;
pub use callback::{CallbackAction, EditField};
pub use error::{BotError, Result};
pub use flow::{Button, Keyboard, Reply};
pub use state::{create_shared_context, BotContext, Dialogue};
