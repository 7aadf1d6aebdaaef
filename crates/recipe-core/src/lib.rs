//! Core services for Recipe Bot.
//!
//! - [`config`]: environment-driven configuration and state directory paths
//! - [`RecipeGenerator`]: the AI recipe backend seam, with an
//!   OpenAI-compatible implementation in [`OpenAiGenerator`]
//! - [`parser`]: turns generated or typed recipe text into structured fields

pub mod config;
pub mod error;
pub mod generator;
pub mod openai;
pub mod parser;
pub mod prompts;

pub use config::{env_file, state_dir, Config, ModelConfig};
pub use error::{ConfigError, GenerationError, Result};
pub use generator::RecipeGenerator;
pub use openai::OpenAiGenerator;
pub use parser::{parse_generated, parse_ingredient_list, parse_steps, ParsedRecipe};
