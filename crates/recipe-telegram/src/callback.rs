//! Inline keyboard callback data.
//!
//! Telegram hands back at most 64 bytes of opaque data per button. Actions
//! are encoded as `verb:<recipe id>` (plus `:<field>` for field edits).

use std::fmt;
use std::str::FromStr;

use recipe_models::RecipeId;

/// A recipe field the user can replace from the edit menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditField {
    Name,
    Ingredients,
    Instructions,
}

impl EditField {
    pub const ALL: [EditField; 3] = [
        EditField::Name,
        EditField::Ingredients,
        EditField::Instructions,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EditField::Name => "name",
            EditField::Ingredients => "ingredients",
            EditField::Instructions => "instructions",
        }
    }

    /// Button label in the edit menu.
    pub fn label(self) -> &'static str {
        match self {
            EditField::Name => "📝 Name",
            EditField::Ingredients => "🥕 Ingredients",
            EditField::Instructions => "📋 Instructions",
        }
    }
}

impl fmt::Display for EditField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EditField {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "name" => Ok(EditField::Name),
            "ingredients" => Ok(EditField::Ingredients),
            "instructions" => Ok(EditField::Instructions),
            other => Err(format!("unknown field: {}", other)),
        }
    }
}

/// What a pressed inline button asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    /// Show the recipe list.
    List,
    /// Show one recipe.
    View(RecipeId),
    /// Open the edit menu for a recipe.
    Edit(RecipeId),
    /// Start replacing one field.
    Field(RecipeId, EditField),
    /// Ask the AI to check and improve the recipe.
    Improve(RecipeId),
    /// Delete the recipe.
    Delete(RecipeId),
}

impl CallbackAction {
    /// Decode button data. Returns `None` for anything we did not produce.
    pub fn parse(data: &str) -> Option<Self> {
        if data == "list" {
            return Some(CallbackAction::List);
        }

        let (verb, rest) = data.split_once(':')?;
        if rest.is_empty() {
            return None;
        }

        match verb {
            "view" => Some(CallbackAction::View(RecipeId::from(rest))),
            "edit" => Some(CallbackAction::Edit(RecipeId::from(rest))),
            "improve" => Some(CallbackAction::Improve(RecipeId::from(rest))),
            "delete" => Some(CallbackAction::Delete(RecipeId::from(rest))),
            "field" => {
                let (id, field) = rest.rsplit_once(':')?;
                if id.is_empty() {
                    return None;
                }
                Some(CallbackAction::Field(RecipeId::from(id), field.parse().ok()?))
            }
            _ => None,
        }
    }
}

impl fmt::Display for CallbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallbackAction::List => f.write_str("list"),
            CallbackAction::View(id) => write!(f, "view:{}", id),
            CallbackAction::Edit(id) => write!(f, "edit:{}", id),
            CallbackAction::Field(id, field) => write!(f, "field:{}:{}", id, field),
            CallbackAction::Improve(id) => write!(f, "improve:{}", id),
            CallbackAction::Delete(id) => write!(f, "delete:{}", id),
        }
    }
}
