//! Message text for recipes, in Telegram HTML.

use recipe_models::Recipe;

/// Telegram rejects messages longer than this many characters.
pub const MAX_MESSAGE_CHARS: usize = 4096;

/// Escape HTML special characters for Telegram HTML mode.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// 🤖 for AI recipes, 👤 for the user's own.
pub fn source_emoji(recipe: &Recipe) -> &'static str {
    if recipe.source.is_ai() {
        "🤖"
    } else {
        "👤"
    }
}

/// Label for a recipe button in the list.
pub fn list_label(recipe: &Recipe) -> String {
    format!("{} {}", source_emoji(recipe), truncate_chars(&recipe.name, 48))
}

/// Cut `text` to at most `max` characters, marking the cut with an ellipsis.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{}…", kept.trim_end())
}

/// Full recipe view.
pub fn recipe_text(recipe: &Recipe) -> String {
    let mut out = format!("{} <b>{}</b>\n", source_emoji(recipe), html_escape(&recipe.name));

    out.push_str("\n<b>Ingredients:</b>\n");
    if recipe.ingredients.is_empty() {
        out.push_str("<i>none listed</i>\n");
    }
    for ingredient in &recipe.ingredients {
        out.push_str(&format!("• {}\n", html_escape(ingredient)));
    }

    out.push_str("\n<b>Instructions:</b>\n");
    if recipe.instructions.is_empty() {
        out.push_str("<i>none listed</i>\n");
    }
    for (n, step) in recipe.instructions.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", n + 1, html_escape(step)));
    }

    out.push_str(&format!(
        "\n<i>Updated {}</i> · <code>{}</code>",
        recipe.updated_at.format("%Y-%m-%d %H:%M UTC"),
        html_escape(recipe.id.as_str())
    ));

    if out.chars().count() > MAX_MESSAGE_CHARS {
        // Cutting tagged text could leave an open tag; fall back to the plain parts
        return truncate_escaped(&plain_recipe_text(recipe), MAX_MESSAGE_CHARS);
    }
    out
}

/// Unescaped name, ingredients and steps.
fn plain_recipe_text(recipe: &Recipe) -> String {
    let mut out = recipe.name.clone();
    out.push_str("\n\nIngredients:\n");
    for ingredient in &recipe.ingredients {
        out.push_str(&format!("• {}\n", ingredient));
    }
    out.push_str("\nInstructions:\n");
    for (n, step) in recipe.instructions.iter().enumerate() {
        out.push_str(&format!("{}. {}\n", n + 1, step));
    }
    out
}

/// Truncate raw text, then escape it, so no entity is ever cut in half.
///
/// Escaping grows the text, so the raw budget shrinks until the escaped
/// result fits in `max` characters.
fn truncate_escaped(raw: &str, max: usize) -> String {
    let mut budget = max;
    loop {
        let escaped = html_escape(&truncate_chars(raw, budget));
        let len = escaped.chars().count();
        if len <= max || budget == 0 {
            return escaped;
        }
        budget = budget.saturating_sub(len - max);
    }
}

/// Heading for the recipe list.
pub fn list_text(recipes: &[Recipe]) -> String {
    let ai = recipes.iter().filter(|r| r.source.is_ai()).count();
    format!(
        "📚 <b>Your recipes</b> ({})\n🤖 {} generated · 👤 {} your own\n\n\
        Tap a recipe to open it.",
        recipes.len(),
        ai,
        recipes.len() - ai
    )
}
