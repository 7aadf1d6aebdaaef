//! Conversation logic, independent of Telegram.
//!
//! Every entry point takes the [`BotContext`], the user and their input, and
//! returns a [`Reply`] for the glue in [`crate::handlers`] to send. Storage and
//! AI failures come back as replies as well; nothing here returns an error.

use recipe_core::{parse_generated, parse_ingredient_list, parse_steps, GenerationError};
use recipe_models::{NewRecipe, Recipe, RecipeId, RecipePatch, RecipeSource, UserId};
use recipe_persistence::PersistenceError;
use tracing::{error, info, warn};

use crate::callback::{CallbackAction, EditField};
use crate::render::{html_escape, list_label, list_text, recipe_text, truncate_chars};
use crate::state::{BotContext, Dialogue};

/// Generated text shown to the user is cut to this length.
const GENERATED_PREVIEW_CHARS: usize = 3500;

/// Current field values shown in the edit prompt are cut to this length.
const CURRENT_VALUE_CHARS: usize = 3000;

/// The list shows at most this many recipe buttons (the most recent ones).
pub const MAX_LIST_BUTTONS: usize = 50;

/// An inline button: label plus the action it triggers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: CallbackAction,
}

impl Button {
    pub fn new(label: impl Into<String>, action: CallbackAction) -> Self {
        Self {
            label: label.into(),
            action,
        }
    }
}

/// Rows of inline buttons.
pub type Keyboard = Vec<Vec<Button>>;

/// A message to send back: HTML text and an optional inline keyboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    /// All button actions, row by row.
    pub fn actions(&self) -> Vec<&CallbackAction> {
        self.keyboard
            .iter()
            .flatten()
            .flatten()
            .map(|b| &b.action)
            .collect()
    }
}

fn recipe_keyboard(id: &RecipeId) -> Keyboard {
    vec![
        vec![
            Button::new("✏️ Edit", CallbackAction::Edit(id.clone())),
            Button::new("🗑 Delete", CallbackAction::Delete(id.clone())),
        ],
        vec![Button::new("📚 My recipes", CallbackAction::List)],
    ]
}

fn edit_keyboard(id: &RecipeId) -> Keyboard {
    let mut rows: Keyboard = EditField::ALL
        .iter()
        .map(|&field| vec![Button::new(field.label(), CallbackAction::Field(id.clone(), field))])
        .collect();
    rows.push(vec![Button::new(
        "🤖 Improve with AI",
        CallbackAction::Improve(id.clone()),
    )]);
    rows.push(vec![Button::new("⬅️ Back", CallbackAction::View(id.clone()))]);
    rows
}

fn back_to_list() -> Keyboard {
    vec![vec![Button::new("📚 My recipes", CallbackAction::List)]]
}

fn generation_failed(user_id: UserId, err: &GenerationError) -> Reply {
    warn!(user_id = %user_id, error = %err, "Recipe generation failed");
    Reply::text(format!("⚠️ Couldn't generate a recipe: {}.", err.user_message()))
}

fn persistence_failed(user_id: UserId, err: &PersistenceError, action: &str) -> Reply {
    if err.is_not_found() {
        info!(user_id = %user_id, error = %err, "Recipe not found");
        return Reply::text("❌ Recipe not found. It may have been deleted.")
            .with_keyboard(back_to_list());
    }
    error!(user_id = %user_id, error = %err, "Storage operation failed");
    Reply::text(format!("⚠️ Couldn't {} right now. Please try again later.", action))
}

fn recipe_arg(raw: &str) -> Option<RecipeId> {
    let raw = raw.trim();
    (!raw.is_empty()).then(|| RecipeId::from(raw))
}

/// Welcome text for /start.
pub fn start(first_name: Option<&str>) -> Reply {
    let greeting = match first_name.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => format!("👋 Welcome, {}!", html_escape(name)),
        None => "👋 Welcome!".to_string(),
    };
    Reply::text(format!(
        "{} I'm your recipe assistant.\n\n\
        I can create recipes from the ingredients you have \
        and keep your own recipes in one place.\n\n\
        <b>Commands:</b>\n\
        /generate - create a recipe from ingredients\n\
        /add - save your own recipe\n\
        /list - browse your recipes\n\
        /edit &lt;id&gt; - edit a recipe\n\
        /delete &lt;id&gt; - delete a recipe\n\
        /cancel - stop the current action\n\
        /help - show all commands",
        greeting
    ))
}

/// `/generate`, optionally with the ingredients on the same line.
pub async fn begin_generate(ctx: &BotContext, user_id: UserId, args: &str) -> Reply {
    if !args.trim().is_empty() {
        return generate(ctx, user_id, args).await;
    }
    ctx.set_dialogue(user_id, Dialogue::AwaitingIngredients).await;
    Reply::text(
        "🥘 What ingredients do you have?\n\n\
        Send them separated by commas, e.g. <i>chicken, rice, garlic, tomatoes</i>.\n\n\
        Send /cancel to stop.",
    )
}

/// Generate a recipe from an ingredient message and save it as an AI recipe.
pub async fn generate(ctx: &BotContext, user_id: UserId, text: &str) -> Reply {
    let ingredients = parse_ingredient_list(text);
    if ingredients.is_empty() {
        ctx.set_dialogue(user_id, Dialogue::AwaitingIngredients).await;
        return Reply::text(
            "Please list at least one ingredient, e.g. <i>chicken, rice, garlic</i>.",
        );
    }
    ctx.take_dialogue(user_id).await;

    info!(user_id = %user_id, count = ingredients.len(), "Generating recipe from ingredients");
    let generated = match ctx.generator().generate(&ingredients).await {
        Ok(text) => text,
        Err(e) => return generation_failed(user_id, &e),
    };

    let parsed = parse_generated(&generated, &ingredients);
    let draft = NewRecipe::new(parsed.name)
        .with_ingredients(parsed.ingredients)
        .with_instructions(parsed.instructions)
        .with_source(RecipeSource::Ai);
    let body = html_escape(&truncate_chars(&generated, GENERATED_PREVIEW_CHARS));

    match ctx.store().save(user_id, draft).await {
        Ok(recipe) => Reply::text(format!("{}\n\n✅ Saved to your recipes.", body))
            .with_keyboard(recipe_keyboard(&recipe.id)),
        Err(e) => {
            error!(user_id = %user_id, error = %e, "Failed to save generated recipe");
            Reply::text(format!(
                "{}\n\n⚠️ Couldn't save this recipe. Please try again later.",
                body
            ))
        }
    }
}

/// `/add`, optionally with the recipe name on the same line.
pub async fn begin_add(ctx: &BotContext, user_id: UserId, args: &str) -> Reply {
    let name = args.trim();
    if name.is_empty() {
        ctx.set_dialogue(user_id, Dialogue::AwaitingName).await;
        return Reply::text("📝 What's the name of your recipe?\n\nSend /cancel to stop.");
    }
    ctx.set_dialogue(
        user_id,
        Dialogue::AwaitingAddIngredients {
            name: name.to_string(),
        },
    )
    .await;
    ingredients_prompt(name)
}

fn ingredients_prompt(name: &str) -> Reply {
    Reply::text(format!(
        "Got it: <b>{}</b>\n\nNow send the ingredients, separated by commas or one per line.",
        html_escape(name)
    ))
}

/// `/list`: one button per recipe.
pub async fn list(ctx: &BotContext, user_id: UserId) -> Reply {
    let recipes = match ctx.store().list(user_id).await {
        Ok(recipes) => recipes,
        Err(e) => return persistence_failed(user_id, &e, "load your recipes"),
    };

    if recipes.is_empty() {
        return Reply::text(
            "You have no saved recipes yet.\n\n\
            Use /generate to create one from your ingredients or /add to write your own.",
        );
    }

    let mut text = list_text(&recipes);
    let shown = &recipes[recipes.len().saturating_sub(MAX_LIST_BUTTONS)..];
    if shown.len() < recipes.len() {
        text.push_str(&format!("\nShowing the {} most recent.", shown.len()));
    }

    let keyboard = shown
        .iter()
        .rev()
        .map(|r| vec![Button::new(list_label(r), CallbackAction::View(r.id.clone()))])
        .collect();
    Reply::text(text).with_keyboard(keyboard)
}

/// Show one recipe.
pub async fn view(ctx: &BotContext, user_id: UserId, recipe_id: &RecipeId) -> Reply {
    match ctx.store().get(user_id, recipe_id).await {
        Ok(recipe) => Reply::text(recipe_text(&recipe)).with_keyboard(recipe_keyboard(&recipe.id)),
        Err(e) => persistence_failed(user_id, &e, "load that recipe"),
    }
}

/// `/edit <id>`.
pub async fn begin_edit(ctx: &BotContext, user_id: UserId, args: &str) -> Reply {
    match recipe_arg(args) {
        Some(id) => edit_menu(ctx, user_id, &id).await,
        None => Reply::text(
            "Usage: <code>/edit &lt;recipe id&gt;</code>\n\n\
            Or open a recipe from /list and tap Edit.",
        ),
    }
}

/// The field picker for one recipe.
pub async fn edit_menu(ctx: &BotContext, user_id: UserId, recipe_id: &RecipeId) -> Reply {
    match ctx.store().get(user_id, recipe_id).await {
        Ok(recipe) => Reply::text(format!(
            "✏️ Editing <b>{}</b>\n\nWhat would you like to change?",
            html_escape(&recipe.name)
        ))
        .with_keyboard(edit_keyboard(&recipe.id)),
        Err(e) => persistence_failed(user_id, &e, "load that recipe"),
    }
}

fn current_value(recipe: &Recipe, field: EditField) -> String {
    match field {
        EditField::Name => recipe.name.clone(),
        EditField::Ingredients => recipe.ingredients.join("\n"),
        EditField::Instructions => recipe
            .instructions
            .iter()
            .enumerate()
            .map(|(n, step)| format!("{}. {}", n + 1, step))
            .collect::<Vec<_>>()
            .join("\n"),
    }
}

fn field_hint(field: EditField) -> &'static str {
    match field {
        EditField::Name => "",
        EditField::Ingredients => " (separated by commas or one per line)",
        EditField::Instructions => " (one step per line)",
    }
}

/// Start replacing one field of a recipe.
pub async fn choose_field(
    ctx: &BotContext,
    user_id: UserId,
    recipe_id: &RecipeId,
    field: EditField,
) -> Reply {
    let recipe = match ctx.store().get(user_id, recipe_id).await {
        Ok(recipe) => recipe,
        Err(e) => return persistence_failed(user_id, &e, "load that recipe"),
    };

    ctx.set_dialogue(
        user_id,
        Dialogue::AwaitingEdit {
            recipe_id: recipe.id.clone(),
            field,
        },
    )
    .await;

    let current = current_value(&recipe, field);
    let current = if current.is_empty() {
        "<i>empty</i>".to_string()
    } else {
        html_escape(&truncate_chars(&current, CURRENT_VALUE_CHARS))
    };
    Reply::text(format!(
        "<i>Current {}:</i>\n{}\n\nSend the new {}{}, or /cancel to keep it.",
        field,
        current,
        field,
        field_hint(field)
    ))
}

async fn apply_edit(
    ctx: &BotContext,
    user_id: UserId,
    recipe_id: RecipeId,
    field: EditField,
    text: &str,
) -> Reply {
    let patch = match field {
        EditField::Name => Some(text.trim())
            .filter(|n| !n.is_empty())
            .map(RecipePatch::name),
        EditField::Ingredients => Some(parse_ingredient_list(text))
            .filter(|v| !v.is_empty())
            .map(RecipePatch::ingredients),
        EditField::Instructions => Some(parse_steps(text))
            .filter(|v| !v.is_empty())
            .map(RecipePatch::instructions),
    };
    let Some(patch) = patch else {
        return Reply::text(format!("Please send the new {}, or /cancel.", field));
    };

    ctx.take_dialogue(user_id).await;
    match ctx.store().update(user_id, &recipe_id, patch).await {
        Ok(recipe) => {
            info!(
                user_id = %user_id,
                recipe_id = %recipe.id,
                field = %field,
                "Recipe field edited"
            );
            Reply::text(format!("✅ Recipe updated.\n\n{}", recipe_text(&recipe)))
                .with_keyboard(recipe_keyboard(&recipe.id))
        }
        Err(e) => persistence_failed(user_id, &e, "update that recipe"),
    }
}

/// Ask the AI to check a recipe and store its corrected version.
pub async fn improve(ctx: &BotContext, user_id: UserId, recipe_id: &RecipeId) -> Reply {
    let recipe = match ctx.store().get(user_id, recipe_id).await {
        Ok(recipe) => recipe,
        Err(e) => return persistence_failed(user_id, &e, "load that recipe"),
    };

    let improved = match ctx.generator().improve(&recipe).await {
        Ok(text) => text,
        Err(e) => return generation_failed(user_id, &e),
    };

    let parsed = parse_generated(&improved, &recipe.ingredients);
    let instructions = if parsed.instructions.is_empty() {
        recipe.instructions.clone()
    } else {
        parsed.instructions
    };
    let patch = RecipePatch {
        ingredients: Some(parsed.ingredients),
        instructions: Some(instructions),
        source: Some(RecipeSource::Ai),
        ..Default::default()
    };

    match ctx.store().update(user_id, recipe_id, patch).await {
        Ok(recipe) => {
            info!(user_id = %user_id, recipe_id = %recipe.id, "Recipe improved by AI");
            Reply::text(format!("🤖 Recipe improved.\n\n{}", recipe_text(&recipe)))
                .with_keyboard(recipe_keyboard(&recipe.id))
        }
        Err(e) => persistence_failed(user_id, &e, "update that recipe"),
    }
}

/// `/delete <id>`.
pub async fn delete_command(ctx: &BotContext, user_id: UserId, args: &str) -> Reply {
    match recipe_arg(args) {
        Some(id) => delete(ctx, user_id, &id).await,
        None => Reply::text(
            "Usage: <code>/delete &lt;recipe id&gt;</code>\n\n\
            Or open a recipe from /list and tap Delete.",
        ),
    }
}

/// Delete a recipe.
pub async fn delete(ctx: &BotContext, user_id: UserId, recipe_id: &RecipeId) -> Reply {
    match ctx.store().delete(user_id, recipe_id).await {
        Ok(recipe) => {
            // An edit waiting on this recipe has nothing left to edit
            if let Some(Dialogue::AwaitingEdit { recipe_id: editing, .. }) =
                ctx.dialogue(user_id).await
            {
                if &editing == recipe_id {
                    ctx.take_dialogue(user_id).await;
                }
            }
            Reply::text(format!("🗑 Deleted <b>{}</b>.", html_escape(&recipe.name)))
                .with_keyboard(back_to_list())
        }
        Err(e) => persistence_failed(user_id, &e, "delete that recipe"),
    }
}

/// `/cancel`.
pub async fn cancel(ctx: &BotContext, user_id: UserId) -> Reply {
    match ctx.take_dialogue(user_id).await {
        Some(dialogue) => {
            info!(user_id = %user_id, dialogue = ?dialogue, "Dialogue cancelled");
            Reply::text("❌ Cancelled.")
        }
        None => Reply::text("Nothing to cancel."),
    }
}

/// A plain text message, routed by the user's dialogue state.
pub async fn message(ctx: &BotContext, user_id: UserId, text: &str) -> Reply {
    let Some(dialogue) = ctx.dialogue(user_id).await else {
        return Reply::text(
            "Send /generate to create a recipe from your ingredients, \
            /add to save your own, or /list to see your recipes.",
        );
    };

    match dialogue {
        Dialogue::AwaitingIngredients => generate(ctx, user_id, text).await,
        Dialogue::AwaitingName => {
            let name = text.trim();
            if name.is_empty() {
                return Reply::text("Please send a name for the recipe.");
            }
            ctx.set_dialogue(
                user_id,
                Dialogue::AwaitingAddIngredients {
                    name: name.to_string(),
                },
            )
            .await;
            ingredients_prompt(name)
        }
        Dialogue::AwaitingAddIngredients { name } => {
            let ingredients = parse_ingredient_list(text);
            if ingredients.is_empty() {
                return Reply::text("Please send at least one ingredient.");
            }
            ctx.set_dialogue(user_id, Dialogue::AwaitingAddInstructions { name, ingredients })
                .await;
            Reply::text("Now send the instructions, one step per line.")
        }
        Dialogue::AwaitingAddInstructions { name, ingredients } => {
            let steps = parse_steps(text);
            if steps.is_empty() {
                return Reply::text("Please send at least one instruction step.");
            }
            ctx.take_dialogue(user_id).await;

            let draft = NewRecipe::new(name)
                .with_ingredients(ingredients)
                .with_instructions(steps);
            match ctx.store().save(user_id, draft).await {
                Ok(recipe) => Reply::text(format!("✅ Recipe saved.\n\n{}", recipe_text(&recipe)))
                    .with_keyboard(recipe_keyboard(&recipe.id)),
                Err(e) => persistence_failed(user_id, &e, "save your recipe"),
            }
        }
        Dialogue::AwaitingEdit { recipe_id, field } => {
            apply_edit(ctx, user_id, recipe_id, field, text).await
        }
    }
}

/// A pressed inline button.
pub async fn callback(ctx: &BotContext, user_id: UserId, data: &str) -> Reply {
    let Some(action) = CallbackAction::parse(data) else {
        warn!(user_id = %user_id, data = %data, "Unknown callback data");
        return Reply::text("⚠️ That button is no longer valid. Use /list to start over.");
    };

    match action {
        CallbackAction::List => list(ctx, user_id).await,
        CallbackAction::View(id) => view(ctx, user_id, &id).await,
        CallbackAction::Edit(id) => edit_menu(ctx, user_id, &id).await,
        CallbackAction::Field(id, field) => choose_field(ctx, user_id, &id, field).await,
        CallbackAction::Improve(id) => improve(ctx, user_id, &id).await,
        CallbackAction::Delete(id) => delete(ctx, user_id, &id).await,
    }
}
