//! Dialogue flows against an in-memory store and a canned AI generator.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use recipe_core::{GenerationError, RecipeGenerator};
use recipe_models::{NewRecipe, Recipe, RecipeId, RecipeSource, UserId};
use recipe_persistence::{JsonFileStore, MemoryStore, RecipeStore};
use recipe_telegram::flow;
use recipe_telegram::{BotContext, CallbackAction, Dialogue, EditField};
use tempfile::tempdir;

const ALICE: UserId = UserId(1001);
const BOB: UserId = UserId(2002);

const GENERATED: &str = "Chicken Rice Bowl\n\n\
Ingredients:\n- 200 g chicken\n- 150 g rice\n\n\
Instructions:\n1. Cook the rice\n2. Fry the chicken";

/// Returns `GENERATED` (or a fixed error) and records every call.
struct StubGenerator {
    fail_with: Option<fn() -> GenerationError>,
    calls: Mutex<Vec<String>>,
}

impl StubGenerator {
    fn ok() -> Arc<Self> {
        Arc::new(Self {
            fail_with: None,
            calls: Mutex::new(Vec::new()),
        })
    }

    fn failing(make: fn() -> GenerationError) -> Arc<Self> {
        Arc::new(Self {
            fail_with: Some(make),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn respond(&self, call: String) -> recipe_core::Result<String> {
        self.calls.lock().unwrap().push(call);
        match self.fail_with {
            Some(make) => Err(make()),
            None => Ok(GENERATED.to_string()),
        }
    }
}

#[async_trait]
impl RecipeGenerator for StubGenerator {
    async fn generate(&self, ingredients: &[String]) -> recipe_core::Result<String> {
        self.respond(format!("generate:{}", ingredients.join(", ")))
    }

    async fn improve(&self, recipe: &Recipe) -> recipe_core::Result<String> {
        self.respond(format!("improve:{}", recipe.name))
    }
}

fn context(generator: Arc<StubGenerator>) -> BotContext {
    BotContext::new(Arc::new(MemoryStore::new()), generator)
}

async fn seed(ctx: &BotContext, user: UserId) -> Recipe {
    ctx.store()
        .save(
            user,
            NewRecipe::new("Pancakes")
                .with_ingredients(["flour", "milk"])
                .with_instructions(["Mix", "Fry"]),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_add_dialogue_saves_user_recipe() {
    let ctx = context(StubGenerator::ok());

    let reply = flow::begin_add(&ctx, ALICE, "").await;
    assert!(reply.text.contains("name of your recipe"));
    assert_eq!(ctx.dialogue(ALICE).await, Some(Dialogue::AwaitingName));

    flow::message(&ctx, ALICE, "  Pancakes ").await;
    assert_eq!(
        ctx.dialogue(ALICE).await,
        Some(Dialogue::AwaitingAddIngredients {
            name: "Pancakes".to_string()
        })
    );

    flow::message(&ctx, ALICE, "flour, milk\neggs").await;
    let reply = flow::message(&ctx, ALICE, "Mix everything\nFry in a pan").await;

    assert!(reply.text.contains("Recipe saved"));
    assert!(ctx.dialogue(ALICE).await.is_none());

    let recipes = ctx.store().list(ALICE).await.unwrap();
    assert_eq!(recipes.len(), 1);
    let recipe = &recipes[0];
    assert_eq!(recipe.name, "Pancakes");
    assert_eq!(recipe.ingredients, vec!["flour", "milk", "eggs"]);
    assert_eq!(recipe.instructions, vec!["Mix everything", "Fry in a pan"]);
    assert_eq!(recipe.source, RecipeSource::User);
    assert!(reply.actions().contains(&&CallbackAction::Edit(recipe.id.clone())));
}

#[tokio::test]
async fn test_add_with_inline_name_skips_name_step() {
    let ctx = context(StubGenerator::ok());

    let reply = flow::begin_add(&ctx, ALICE, "Tomato <Soup>").await;
    assert!(reply.text.contains("Tomato &lt;Soup&gt;"));
    assert_eq!(
        ctx.dialogue(ALICE).await,
        Some(Dialogue::AwaitingAddIngredients {
            name: "Tomato <Soup>".to_string()
        })
    );
}

#[tokio::test]
async fn test_add_dialogue_reprompts_on_empty_input() {
    let ctx = context(StubGenerator::ok());
    flow::begin_add(&ctx, ALICE, "Soup").await;

    let reply = flow::message(&ctx, ALICE, " , ").await;
    assert!(reply.text.contains("at least one ingredient"));
    assert!(matches!(
        ctx.dialogue(ALICE).await,
        Some(Dialogue::AwaitingAddIngredients { .. })
    ));
    assert!(ctx.store().list(ALICE).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_generate_dialogue_saves_ai_recipe() {
    let generator = StubGenerator::ok();
    let ctx = context(Arc::clone(&generator));

    let reply = flow::begin_generate(&ctx, ALICE, "").await;
    assert!(reply.text.contains("What ingredients"));
    assert_eq!(ctx.dialogue(ALICE).await, Some(Dialogue::AwaitingIngredients));

    let reply = flow::message(&ctx, ALICE, "chicken, rice").await;
    assert!(reply.text.contains("Chicken Rice Bowl"));
    assert!(reply.text.contains("Saved to your recipes"));
    assert!(ctx.dialogue(ALICE).await.is_none());
    assert_eq!(generator.calls(), vec!["generate:chicken, rice"]);

    let recipes = ctx.store().list(ALICE).await.unwrap();
    assert_eq!(recipes.len(), 1);
    let recipe = &recipes[0];
    assert_eq!(recipe.name, "Chicken Rice Bowl");
    assert_eq!(recipe.ingredients, vec!["200 g chicken", "150 g rice"]);
    assert_eq!(recipe.instructions, vec!["Cook the rice", "Fry the chicken"]);
    assert!(recipe.source.is_ai());
    assert!(reply.actions().contains(&&CallbackAction::Edit(recipe.id.clone())));
}

#[tokio::test]
async fn test_generate_with_inline_ingredients() {
    let generator = StubGenerator::ok();
    let ctx = context(Arc::clone(&generator));

    flow::begin_generate(&ctx, ALICE, "eggs, cheese").await;

    assert_eq!(generator.calls(), vec!["generate:eggs, cheese"]);
    assert_eq!(ctx.store().list(ALICE).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_generate_without_ingredients_does_not_call_ai() {
    let generator = StubGenerator::ok();
    let ctx = context(Arc::clone(&generator));
    flow::begin_generate(&ctx, ALICE, "").await;

    let reply = flow::message(&ctx, ALICE, " ,, ").await;

    assert!(reply.text.contains("at least one ingredient"));
    assert_eq!(ctx.dialogue(ALICE).await, Some(Dialogue::AwaitingIngredients));
    assert!(generator.calls().is_empty());
}

#[tokio::test]
async fn test_generation_failure_becomes_reply() {
    let generator = StubGenerator::failing(|| GenerationError::RateLimited);
    let ctx = context(Arc::clone(&generator));
    flow::begin_generate(&ctx, ALICE, "").await;

    let reply = flow::message(&ctx, ALICE, "chicken").await;

    assert!(reply.text.contains("Couldn't generate a recipe"));
    assert!(reply.text.contains(GenerationError::RateLimited.user_message()));
    assert!(ctx.dialogue(ALICE).await.is_none());
    assert!(ctx.store().list(ALICE).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_list_empty_and_populated() {
    let ctx = context(StubGenerator::ok());

    let reply = flow::list(&ctx, ALICE).await;
    assert!(reply.text.contains("no saved recipes"));
    assert!(reply.keyboard.is_none());

    let first = seed(&ctx, ALICE).await;
    let second = ctx
        .store()
        .save(ALICE, NewRecipe::new("Omelette").with_source(RecipeSource::Ai))
        .await
        .unwrap();

    let reply = flow::list(&ctx, ALICE).await;
    assert!(reply.text.contains("(2)"));
    let actions = reply.actions();
    assert_eq!(actions.len(), 2);
    assert!(actions.contains(&&CallbackAction::View(first.id.clone())));
    assert!(actions.contains(&&CallbackAction::View(second.id.clone())));

    let labels: Vec<_> = reply.keyboard.unwrap().into_iter().flatten().map(|b| b.label).collect();
    assert!(labels.contains(&"👤 Pancakes".to_string()));
    assert!(labels.contains(&"🤖 Omelette".to_string()));
}

#[tokio::test]
async fn test_view_via_callback() {
    let ctx = context(StubGenerator::ok());
    let recipe = seed(&ctx, ALICE).await;

    let reply = flow::callback(&ctx, ALICE, &format!("view:{}", recipe.id)).await;

    assert!(reply.text.contains("<b>Pancakes</b>"));
    assert!(reply.text.contains("• flour"));
    assert!(reply.actions().contains(&&CallbackAction::Delete(recipe.id.clone())));
    assert!(reply.actions().contains(&&CallbackAction::List));
}

#[tokio::test]
async fn test_edit_single_field_via_buttons() {
    let ctx = context(StubGenerator::ok());
    let recipe = seed(&ctx, ALICE).await;

    let menu = flow::begin_edit(&ctx, ALICE, recipe.id.as_str()).await;
    assert!(menu
        .actions()
        .contains(&&CallbackAction::Field(recipe.id.clone(), EditField::Name)));
    assert!(menu.actions().contains(&&CallbackAction::Improve(recipe.id.clone())));

    let data = CallbackAction::Field(recipe.id.clone(), EditField::Name).to_string();
    let prompt = flow::callback(&ctx, ALICE, &data).await;
    assert!(prompt.text.contains("Current name"));
    assert_eq!(
        ctx.dialogue(ALICE).await,
        Some(Dialogue::AwaitingEdit {
            recipe_id: recipe.id.clone(),
            field: EditField::Name
        })
    );

    let reply = flow::message(&ctx, ALICE, "Fluffy Pancakes").await;
    assert!(reply.text.contains("Recipe updated"));
    assert!(ctx.dialogue(ALICE).await.is_none());

    let updated = ctx.store().get(ALICE, &recipe.id).await.unwrap();
    assert_eq!(updated.name, "Fluffy Pancakes");
    assert_eq!(updated.ingredients, recipe.ingredients);
    assert_eq!(updated.instructions, recipe.instructions);
    assert_eq!(updated.created_at, recipe.created_at);
}

#[tokio::test]
async fn test_edit_instructions_and_reprompt_on_blank() {
    let ctx = context(StubGenerator::ok());
    let recipe = seed(&ctx, ALICE).await;
    flow::choose_field(&ctx, ALICE, &recipe.id, EditField::Instructions).await;

    let reply = flow::message(&ctx, ALICE, "   ").await;
    assert!(reply.text.contains("Please send the new instructions"));
    assert!(ctx.dialogue(ALICE).await.is_some());

    flow::message(&ctx, ALICE, "1. Whisk\n2. Rest\n3. Fry").await;
    let updated = ctx.store().get(ALICE, &recipe.id).await.unwrap();
    assert_eq!(updated.instructions, vec!["Whisk", "Rest", "Fry"]);
    assert_eq!(updated.name, "Pancakes");
}

#[tokio::test]
async fn test_edit_without_id_shows_usage() {
    let ctx = context(StubGenerator::ok());
    let reply = flow::begin_edit(&ctx, ALICE, "  ").await;
    assert!(reply.text.contains("Usage"));
}

#[tokio::test]
async fn test_improve_replaces_ingredients_and_steps() {
    let generator = StubGenerator::ok();
    let ctx = context(Arc::clone(&generator));
    let recipe = seed(&ctx, ALICE).await;

    let reply = flow::callback(&ctx, ALICE, &format!("improve:{}", recipe.id)).await;

    assert!(reply.text.contains("Recipe improved"));
    assert_eq!(generator.calls(), vec!["improve:Pancakes"]);

    let updated = ctx.store().get(ALICE, &recipe.id).await.unwrap();
    assert_eq!(updated.name, "Pancakes");
    assert_eq!(updated.ingredients, vec!["200 g chicken", "150 g rice"]);
    assert_eq!(updated.instructions, vec!["Cook the rice", "Fry the chicken"]);
    assert_eq!(updated.source, RecipeSource::Ai);
}

#[tokio::test]
async fn test_improve_failure_leaves_recipe_unchanged() {
    let generator = StubGenerator::failing(|| GenerationError::InvalidApiKey);
    let ctx = context(generator);
    let recipe = seed(&ctx, ALICE).await;

    let reply = flow::improve(&ctx, ALICE, &recipe.id).await;

    assert!(reply.text.contains("Couldn't generate"));
    assert_eq!(ctx.store().get(ALICE, &recipe.id).await.unwrap(), recipe);
}

#[tokio::test]
async fn test_delete_then_not_found() {
    let ctx = context(StubGenerator::ok());
    let recipe = seed(&ctx, ALICE).await;

    let reply = flow::delete_command(&ctx, ALICE, recipe.id.as_str()).await;
    assert!(reply.text.contains("Deleted <b>Pancakes</b>"));
    assert!(ctx.store().list(ALICE).await.unwrap().is_empty());

    let reply = flow::delete(&ctx, ALICE, &recipe.id).await;
    assert!(reply.text.contains("Recipe not found"));

    let reply = flow::view(&ctx, ALICE, &recipe.id).await;
    assert!(reply.text.contains("Recipe not found"));
}

#[tokio::test]
async fn test_delete_ends_pending_edit_of_that_recipe() {
    let ctx = context(StubGenerator::ok());
    let recipe = seed(&ctx, ALICE).await;
    flow::choose_field(&ctx, ALICE, &recipe.id, EditField::Name).await;

    flow::callback(&ctx, ALICE, &format!("delete:{}", recipe.id)).await;

    assert!(ctx.dialogue(ALICE).await.is_none());
}

#[tokio::test]
async fn test_users_cannot_see_each_others_recipes() {
    let ctx = context(StubGenerator::ok());
    let recipe = seed(&ctx, ALICE).await;

    let reply = flow::view(&ctx, BOB, &recipe.id).await;
    assert!(reply.text.contains("Recipe not found"));

    let reply = flow::delete(&ctx, BOB, &recipe.id).await;
    assert!(reply.text.contains("Recipe not found"));
    assert_eq!(ctx.store().list(ALICE).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_cancel() {
    let ctx = context(StubGenerator::ok());

    let reply = flow::cancel(&ctx, ALICE).await;
    assert_eq!(reply.text, "Nothing to cancel.");

    flow::begin_add(&ctx, ALICE, "").await;
    let reply = flow::cancel(&ctx, ALICE).await;
    assert!(reply.text.contains("Cancelled"));
    assert!(ctx.dialogue(ALICE).await.is_none());
    assert_eq!(ctx.active_dialogues().await, 0);
}

#[tokio::test]
async fn test_text_without_dialogue_gives_hint() {
    let ctx = context(StubGenerator::ok());
    let reply = flow::message(&ctx, ALICE, "hello").await;
    assert!(reply.text.contains("/generate"));
    assert!(ctx.store().list(ALICE).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_callback() {
    let ctx = context(StubGenerator::ok());
    let reply = flow::callback(&ctx, ALICE, "connect:somewhere").await;
    assert!(reply.text.contains("no longer valid"));
}

#[tokio::test]
async fn test_missing_recipe_id_from_stale_button() {
    let ctx = context(StubGenerator::ok());
    let id = RecipeId::from("rcp-gone");

    for data in [
        format!("view:{}", id),
        format!("edit:{}", id),
        format!("field:{}:name", id),
        format!("improve:{}", id),
    ] {
        let reply = flow::callback(&ctx, ALICE, &data).await;
        assert!(reply.text.contains("Recipe not found"), "{}: {}", data, reply.text);
    }
    assert!(ctx.dialogue(ALICE).await.is_none());
}

#[tokio::test]
async fn test_storage_failure_becomes_reply() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    std::fs::write(store.user_file(ALICE), "{ not json").unwrap();
    let ctx = BotContext::new(Arc::new(store), StubGenerator::ok());

    let reply = flow::list(&ctx, ALICE).await;
    assert!(reply.text.contains("Couldn't load your recipes"));

    flow::begin_add(&ctx, ALICE, "Soup").await;
    flow::message(&ctx, ALICE, "water").await;
    let reply = flow::message(&ctx, ALICE, "Boil").await;
    assert!(reply.text.contains("Couldn't save your recipe"));

    // Other users are unaffected
    let reply = flow::begin_add(&ctx, BOB, "Soup").await;
    assert!(reply.text.contains("Soup"));
    flow::message(&ctx, BOB, "water").await;
    let reply = flow::message(&ctx, BOB, "Boil").await;
    assert!(reply.text.contains("Recipe saved"));
}

#[tokio::test]
async fn test_generate_save_failure_still_shows_recipe() {
    let dir = tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    std::fs::write(store.user_file(ALICE), "{ not json").unwrap();
    let generator = StubGenerator::ok();
    let ctx = BotContext::new(Arc::new(store), generator.clone());

    let reply = flow::begin_generate(&ctx, ALICE, "chicken, rice").await;

    assert_eq!(generator.calls(), vec!["generate:chicken, rice"]);
    assert!(reply.text.contains("Chicken Rice Bowl"));
    assert!(reply.text.contains("Couldn't save this recipe"));
    assert!(!reply.text.contains("Saved to your recipes"));
    assert!(reply.keyboard.is_none());
    assert!(ctx.dialogue(ALICE).await.is_none());
}

#[test]
fn test_start_greets_by_name() {
    let reply = flow::start(Some("Ana"));
    assert!(reply.text.starts_with("👋 Welcome, Ana!"));
    assert!(reply.text.contains("/generate"));
    assert!(flow::start(None).text.starts_with("👋 Welcome!"));
}
