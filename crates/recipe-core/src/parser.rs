//! Turning free-form recipe text into structured fields.
//!
//! Model output and user messages are plain text. These helpers pull out the
//! recipe name, the ingredient lines and the instruction steps so they can be
//! stored as separate fields.

use std::sync::LazyLock;

use regex::Regex;

/// Name used when generated text has no usable first line.
pub const FALLBACK_NAME: &str = "Generated Recipe";

/// Section keywords that can appear in a heading line.
static KEYWORD_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"(?i)\b(ingredients|instructions|directions|steps|method|preparation time|preparation",
        r"|tips|variations|notes|servings|prep time|cook time|cooking time|total time|nutrition)\b",
    ))
    .expect("Invalid keyword regex")
});

/// Markdown heading or emphasis at line start (`#`, `**`, `__`, `*word`).
/// A `* ` bullet does not count.
static DECORATED_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:#|\*\*|__|[*_][^\s*_])").expect("Invalid decoration regex")
});

/// Leading list markers: `-`, `*`, `•`, `1.`, `2)`, `Step 3:`.
static LIST_MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(?:[-*•]\s+|\d+[.)]\s+|step\s+\d+\s*[:.)-]?\s*)")
        .expect("Invalid list marker regex")
});

/// Markdown emphasis and heading characters around a title line.
static TITLE_DECORATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[#*_\s]+|[*_\s]+$").expect("Invalid title decoration regex")
});

static NAME_LABEL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(?:recipe\s+name\b\s*:?|(?:recipe|name|title)\s*:)\s*")
        .expect("Invalid name label regex")
});

/// Headings longer than this (before any parenthesis) are treated as text.
const MAX_HEADING_WORDS: usize = 5;

/// Structured fields extracted from recipe text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRecipe {
    pub name: String,
    pub ingredients: Vec<String>,
    pub instructions: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Section {
    Preamble,
    Ingredients,
    Instructions,
    Other,
}

fn section_of(keyword: &str) -> Section {
    match keyword.to_ascii_lowercase().as_str() {
        "ingredients" => Section::Ingredients,
        "instructions" | "directions" | "steps" | "method" | "preparation" => Section::Instructions,
        _ => Section::Other,
    }
}

/// Decides whether a line is a section heading and which section it opens.
///
/// A line ending in `:` is a heading when a keyword appears anywhere in it
/// ("Step-by-Step Instructions:"). A markdown-decorated line must end with
/// the keyword ("## Cooking Instructions"). A plain line must be the bare
/// keyword ("Ingredients"), so a title like "Method Chicken Stew" is not a
/// heading. List items ("1. Mix the dry ingredients:") never are. When
/// several keywords appear, ingredients win over instructions.
fn classify_heading(line: &str) -> Option<Section> {
    if LIST_MARKER_REGEX.is_match(line) {
        return None;
    }
    let decorated = DECORATED_REGEX.is_match(line);
    let stripped = TITLE_DECORATION_REGEX.replace_all(line, "").into_owned();
    let (core, colon) = match stripped.strip_suffix(':') {
        Some(rest) => (TITLE_DECORATION_REGEX.replace_all(rest, "").into_owned(), true),
        None => (stripped.clone(), false),
    };

    let head = core.split('(').next().unwrap_or_default().trim();
    if head.is_empty() || head.split_whitespace().count() > MAX_HEADING_WORDS {
        return None;
    }

    let keywords: Vec<_> = KEYWORD_REGEX.find_iter(head).collect();
    let last = keywords.last()?;
    let placed = if colon {
        true
    } else if decorated {
        last.end() == head.len()
    } else {
        keywords.len() == 1 && last.start() == 0 && last.end() == head.len()
    };
    if !placed {
        return None;
    }

    keywords.iter().map(|m| section_of(m.as_str())).min()
}

/// Removes a leading bullet or step number.
pub fn strip_list_marker(line: &str) -> &str {
    match LIST_MARKER_REGEX.find(line) {
        Some(m) => line[m.end()..].trim(),
        None => line.trim(),
    }
}

/// Cleans a title line: markdown decoration and a "Recipe Name:" label.
fn clean_title(line: &str) -> String {
    let undecorated = TITLE_DECORATION_REGEX.replace_all(line, "");
    let unlabeled = NAME_LABEL_REGEX.replace(&undecorated, "");
    TITLE_DECORATION_REGEX.replace_all(&unlabeled, "").trim().to_string()
}

/// Extracts name, ingredients and steps from generated recipe text.
///
/// Falls back to `fallback_ingredients` when no ingredient section is found,
/// and to every remaining line when no instruction section is found.
pub fn parse_generated(text: &str, fallback_ingredients: &[String]) -> ParsedRecipe {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    // The first line that is not a heading and not only a label names the recipe
    let mut name = None;
    let mut body_start = 0;
    for (idx, line) in lines.iter().enumerate() {
        if classify_heading(line).is_some() {
            break;
        }
        let title = clean_title(line);
        if !title.is_empty() {
            name = Some(title);
            body_start = idx + 1;
            break;
        }
    }

    let mut section = Section::Preamble;
    let mut ingredients = Vec::new();
    let mut instructions = Vec::new();
    let mut loose = Vec::new();

    for line in &lines[body_start..] {
        if let Some(next) = classify_heading(line) {
            section = next;
            continue;
        }
        let item = strip_list_marker(line);
        if item.is_empty() {
            continue;
        }
        match section {
            Section::Ingredients => ingredients.push(item.to_string()),
            Section::Instructions => instructions.push(item.to_string()),
            Section::Preamble | Section::Other => loose.push(item.to_string()),
        }
    }

    if ingredients.is_empty() {
        ingredients = fallback_ingredients.to_vec();
    }
    if instructions.is_empty() {
        instructions = loose;
    }

    ParsedRecipe {
        name: name.unwrap_or_else(|| FALLBACK_NAME.to_string()),
        ingredients,
        instructions,
    }
}

/// Splits a user's ingredient message on commas and newlines.
pub fn parse_ingredient_list(text: &str) -> Vec<String> {
    text.split([',', '\n', ';'])
        .map(strip_list_marker)
        .filter(|i| !i.is_empty())
        .map(str::to_string)
        .collect()
}

/// Splits a user's instructions message into steps, one per line.
///
/// A single line is split on sentence ends instead so "Mix. Bake." still
/// yields two steps.
pub fn parse_steps(text: &str) -> Vec<String> {
    let lines: Vec<String> = text
        .lines()
        .map(strip_list_marker)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    if lines.len() != 1 {
        return lines;
    }

    lines[0]
        .split_inclusive(". ")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const GENERATED: &str = r#"**Garlic Butter Chicken with Rice**

Prep Time: 10 minutes | Cook Time: 25 minutes
Servings: 2

## Ingredients (with metric measurements)
- 300 g chicken breast
- 3 cloves garlic, minced
- 150 g rice

## Instructions
1. Rinse the rice and cook it in 300 ml water.
2. Sear the chicken for 6 minutes per side.
3) Add the garlic and cook for 1 minute.

### Tips or variations
- Add lemon zest at the end.
"#;

    #[test]
    fn test_parse_generated_sections() {
        let parsed = parse_generated(GENERATED, &[]);

        assert_eq!(parsed.name, "Garlic Butter Chicken with Rice");
        assert_eq!(
            parsed.ingredients,
            vec!["300 g chicken breast", "3 cloves garlic, minced", "150 g rice"]
        );
        assert_eq!(
            parsed.instructions,
            vec![
                "Rinse the rice and cook it in 300 ml water.",
                "Sear the chicken for 6 minutes per side.",
                "Add the garlic and cook for 1 minute.",
            ]
        );
    }

    #[test]
    fn test_parse_generated_strips_name_label() {
        let parsed = parse_generated("Recipe Name: Tomato Soup\nIngredients:\n- tomatoes", &[]);
        assert_eq!(parsed.name, "Tomato Soup");
        assert_eq!(parsed.ingredients, vec!["tomatoes"]);
    }

    #[test]
    fn test_parse_generated_label_on_its_own_line() {
        let parsed = parse_generated("# Recipe Name\n## Lentil Stew\nSteps:\n1. Simmer", &[]);
        assert_eq!(parsed.name, "Lentil Stew");
        assert_eq!(parsed.instructions, vec!["Simmer"]);
    }

    #[test]
    fn test_parse_generated_falls_back() {
        let fallback = vec!["eggs".to_string(), "cheese".to_string()];
        let parsed = parse_generated("Cheesy Eggs\nWhisk the eggs.\nFold in cheese.", &fallback);

        assert_eq!(parsed.name, "Cheesy Eggs");
        assert_eq!(parsed.ingredients, fallback);
        assert_eq!(parsed.instructions, vec!["Whisk the eggs.", "Fold in cheese."]);
    }

    #[test]
    fn test_parse_generated_empty_text() {
        let parsed = parse_generated("   \n", &[]);
        assert_eq!(parsed.name, FALLBACK_NAME);
        assert!(parsed.ingredients.is_empty());
        assert!(parsed.instructions.is_empty());
    }

    #[test]
    fn test_parse_generated_prefixed_headings() {
        let text = "Garlic Pasta\n\nIngredients:\n- 200 g pasta\n- 2 cloves garlic\n\n\
                    Step-by-Step Instructions:\n1. Boil water\n2. Cook pasta";
        let parsed = parse_generated(text, &[]);
        assert_eq!(parsed.ingredients, vec!["200 g pasta", "2 cloves garlic"]);
        assert_eq!(parsed.instructions, vec!["Boil water", "Cook pasta"]);

        let text = "Garlic Pasta\n**Main Ingredients:**\n- pasta\n**Cooking Instructions:**\n\
                    1. Boil water\n2. Mix the dry ingredients:\n3. Cook pasta";
        let parsed = parse_generated(text, &[]);
        assert_eq!(parsed.ingredients, vec!["pasta"]);
        assert_eq!(
            parsed.instructions,
            vec!["Boil water", "Mix the dry ingredients:", "Cook pasta"]
        );
    }

    #[test]
    fn test_parse_generated_keyword_in_title() {
        let parsed = parse_generated("Method Chicken Stew\nIngredients:\n- chicken", &[]);
        assert_eq!(parsed.name, "Method Chicken Stew");
        assert_eq!(parsed.ingredients, vec!["chicken"]);
    }

    #[test]
    fn test_classify_heading() {
        assert_eq!(classify_heading("Ingredients"), Some(Section::Ingredients));
        assert_eq!(classify_heading("## Cooking Instructions"), Some(Section::Instructions));
        assert_eq!(classify_heading("Preparation Time:"), Some(Section::Other));
        assert_eq!(classify_heading("Servings: 2"), None);
        assert_eq!(classify_heading("Steps for a Better Burger"), None);
    }

    #[test]
    fn test_parse_ingredient_list() {
        assert_eq!(
            parse_ingredient_list("chicken breast, tomatoes,  garlic ,\n- olive oil,, pasta"),
            vec!["chicken breast", "tomatoes", "garlic", "olive oil", "pasta"]
        );
        assert!(parse_ingredient_list(" , ,").is_empty());
    }

    #[test]
    fn test_parse_steps_multiline() {
        assert_eq!(
            parse_steps("1. Boil water\n2. Add pasta\n\n3. Drain"),
            vec!["Boil water", "Add pasta", "Drain"]
        );
    }

    #[test]
    fn test_parse_steps_single_line_sentences() {
        assert_eq!(
            parse_steps("Mix everything. Bake for 20 minutes. Serve warm."),
            vec!["Mix everything.", "Bake for 20 minutes.", "Serve warm."]
        );
    }

    #[test]
    fn test_strip_list_marker() {
        assert_eq!(strip_list_marker("- salt"), "salt");
        assert_eq!(strip_list_marker("12) stir"), "stir");
        assert_eq!(strip_list_marker("Step 2: fold"), "fold");
        assert_eq!(strip_list_marker("2 eggs"), "2 eggs");
    }
}
