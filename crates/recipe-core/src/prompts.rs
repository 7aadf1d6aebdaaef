//! Prompts sent to the completion API.

use recipe_models::Recipe;

/// System prompt for every recipe request.
pub const SYSTEM_PROMPT: &str = "You are a helpful cooking assistant that only provides recipes \
and cooking-related advice. Always use metric measurements.";

/// Prompt asking for a recipe built from the given ingredients.
pub fn generate_prompt(ingredients: &[String]) -> String {
    format!(
        r#"You are a professional chef. Create a detailed recipe using ONLY these ingredients: {}.

IMPORTANT RULES:
1. Use ONLY metric measurements (grams, milliliters, liters, etc.)
2. Include prep time and cooking time
3. Provide step-by-step instructions
4. Suggest serving size
5. Keep the recipe practical and achievable for home cooking
6. If the ingredients don't make sense together, suggest the closest viable recipe

Format the recipe clearly with sections for:
- Recipe Name (first line, on its own)
- Prep Time & Cook Time
- Servings
- Ingredients (with metric measurements, one per line)
- Instructions (numbered steps)
- Optional: Tips or variations"#,
        ingredients.join(", ")
    )
}

/// Prompt asking the model to check and improve an existing recipe.
pub fn improve_prompt(recipe: &Recipe) -> String {
    let ingredients = recipe
        .ingredients
        .iter()
        .map(|i| format!("- {}", i))
        .collect::<Vec<_>>()
        .join("\n");
    let instructions = recipe
        .instructions
        .iter()
        .enumerate()
        .map(|(n, step)| format!("{}. {}", n + 1, step))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        r#"Review the following recipe. Fix mistakes, fill in missing quantities, convert every
measurement to metric units and make the steps clear and complete. Keep the dish the same.

Reply with the full corrected recipe using these sections:
- Recipe Name (first line, on its own)
- Ingredients (one per line)
- Instructions (numbered steps)

{}

Ingredients:
{}

Instructions:
{}"#,
        recipe.name, ingredients, instructions
    )
}
