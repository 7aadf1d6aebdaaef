//! OpenAI-compatible chat completions client.
//!
//! Works against any API that speaks the `/chat/completions` format
//! (OpenAI itself, OpenRouter, local gateways).

use async_trait::async_trait;
use recipe_models::Recipe;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::ModelConfig;
use crate::error::{GenerationError, Result};
use crate::generator::RecipeGenerator;
use crate::prompts::{generate_prompt, improve_prompt, SYSTEM_PROMPT};

/// Recipe generator backed by a chat completions API.
#[derive(Clone)]
pub struct OpenAiGenerator {
    client: reqwest::Client,
    config: ModelConfig,
}

impl OpenAiGenerator {
    /// Create a new client for the given model settings.
    pub fn new(config: ModelConfig) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    /// The model settings in use.
    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Send one system + user prompt pair and return the reply text.
    async fn complete(&self, prompt: String) -> Result<String> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![
                ChatMessage::new("system", SYSTEM_PROMPT),
                ChatMessage::new("user", prompt),
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        debug!(model = %request.model, "Sending chat completion request");

        let response = self
            .client
            .post(self.config.completions_url())
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Completion request failed");
                GenerationError::from(e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status {
                StatusCode::UNAUTHORIZED => {
                    error!("Completion API rejected the API key");
                    GenerationError::InvalidApiKey
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    warn!("Completion API rate limit exceeded");
                    GenerationError::RateLimited
                }
                _ => {
                    error!(status = status.as_u16(), body = %body, "Completion API error");
                    GenerationError::Api {
                        status: status.as_u16(),
                        body,
                    }
                }
            });
        }

        let response: ChatResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::ResponseParse(e.to_string()))?;

        if let Some(usage) = &response.usage {
            debug!(total_tokens = usage.total_tokens, "Chat response received");
        }

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(GenerationError::EmptyResponse)
    }
}

#[async_trait]
impl RecipeGenerator for OpenAiGenerator {
    async fn generate(&self, ingredients: &[String]) -> Result<String> {
        if ingredients.iter().all(|i| i.trim().is_empty()) {
            return Err(GenerationError::NoIngredients);
        }
        info!(count = ingredients.len(), "Generating recipe");
        self.complete(generate_prompt(ingredients)).await
    }

    async fn improve(&self, recipe: &Recipe) -> Result<String> {
        info!(recipe_id = %recipe.id, "Improving recipe");
        self.complete(improve_prompt(recipe)).await
    }
}

/// Chat completion request.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// A message in the chat conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role of the message sender.
    pub role: String,

    /// Text content of the message.
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: Some(content.into()),
        }
    }
}

/// Chat completion response.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<ChatUsage>,
}

/// One completion choice.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

/// Token usage statistics.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatUsage {
    #[serde(default)]
    pub total_tokens: u32,
}
