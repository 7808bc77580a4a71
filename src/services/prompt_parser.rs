use crate::error::{AppError, Result};
use crate::models::Criteria;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ParseError {
    #[error("no JSON object found in model output")]
    NoJsonObject,

    #[error("invalid criteria JSON: {0}")]
    InvalidJson(String),
}

/// Criteria extracted from a model reply, with the playlist name it suggested
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedPrompt {
    #[serde(flatten)]
    pub criteria: Criteria,
    #[serde(default, alias = "playlistName")]
    pub suggested_name: Option<String>,
}

/// Pull the criteria object out of free-form model output.
///
/// Takes the span from the first `{` to the last `}` so that prose or code
/// fences around the object are ignored.
pub fn parse_model_response(text: &str) -> std::result::Result<ParsedPrompt, ParseError> {
    let start = text.find('{').ok_or(ParseError::NoJsonObject)?;
    let end = text.rfind('}').ok_or(ParseError::NoJsonObject)?;
    if end < start {
        return Err(ParseError::NoJsonObject);
    }

    serde_json::from_str(&text[start..=end]).map_err(|e| ParseError::InvalidJson(e.to_string()))
}

/// Text completion backend
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ClaudeRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: Vec<ClaudeMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct ClaudeMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ClaudeResponse {
    content: Vec<ClaudeContent>,
}

#[derive(Debug, Deserialize)]
struct ClaudeContent {
    #[serde(default)]
    text: String,
}

pub struct ClaudeClient {
    api_key: String,
    api_url: String,
    model: String,
    client: Client,
}

impl ClaudeClient {
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        Self {
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
            model,
            client: Client::new(),
        }
    }
}

#[async_trait]
impl LanguageModel for ClaudeClient {
    async fn complete(&self, prompt: &str) -> Result<String> {
        let request = ClaudeRequest {
            model: &self.model,
            max_tokens: 500,
            messages: vec![ClaudeMessage {
                role: "user",
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(format!("{}/messages", self.api_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AppError::LanguageModel(format!("Claude API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AppError::LanguageModel(format!(
                "Claude API error {}: {}",
                status, error_text
            )));
        }

        let claude_response: ClaudeResponse = response.json().await.map_err(|e| {
            AppError::LanguageModel(format!("Failed to parse Claude response: {}", e))
        })?;

        Ok(claude_response
            .content
            .into_iter()
            .next()
            .map(|c| c.text)
            .unwrap_or_default())
    }
}

/// Turns a free-text playlist description into criteria via a language model
pub struct PromptInterpreter {
    model: Arc<dyn LanguageModel>,
}

impl PromptInterpreter {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    pub async fn interpret(&self, prompt: &str) -> Result<ParsedPrompt> {
        info!("Interpreting playlist prompt: {}", prompt);

        let reply = self.model.complete(&instructions(prompt)).await?;
        let parsed = parse_model_response(&reply)?;

        info!("Model criteria: {:?}", parsed);
        Ok(parsed)
    }
}

fn instructions(prompt: &str) -> String {
    format!(
        r#"You help build Spotify playlists. Read the user's request and describe the music they want.

USER REQUEST: "{}"

Respond with ONLY a JSON object using this schema:
{{
  "bpm": 128 or {{ "min": 120, "max": 135 }},
  "genres": ["genre1", "genre2"],
  "energy": "low" | "medium" | "high",
  "mood": "short mood description",
  "playlistName": "A short catchy playlist name"
}}

Use a single bpm number when the user implies one tempo, a min/max range when they describe a span.
Use Spotify genre names such as "house", "hip-hop", "drum-and-bass" or "indie-pop"."#,
        prompt.replace('"', "'")
    )
}
