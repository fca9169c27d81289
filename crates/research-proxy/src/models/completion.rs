//! Chat completion models matching the Perplexity API schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::api;

/// Message author role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    #[default]
    Assistant,
}

/// A role-tagged chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: Role,

    /// Message text. `null` or absent upstream content reads as `None`.
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatMessage {
    /// Create a system message.
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: Role::System, content: Some(content.into()) }
    }

    /// Create a user message.
    #[must_use]
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: Some(content.into()) }
    }

    /// Create an assistant message.
    #[must_use]
    pub fn assistant(content: impl Into<String>) -> Self {
        Self { role: Role::Assistant, content: Some(content.into()) }
    }

    /// Message text, if any.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.content.as_deref()
    }
}

/// String entries of a raw citation list. Other entries are skipped.
fn string_entries(values: Option<&[Value]>) -> Vec<String> {
    values
        .unwrap_or_default()
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

/// Request body for `POST /chat/completions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatCompletionRequest {
    /// Model identifier.
    pub model: String,

    /// Ordered conversation.
    pub messages: Vec<ChatMessage>,

    /// Sampling temperature.
    pub temperature: f32,

    /// Response token cap.
    pub max_tokens: u32,
}

impl ChatCompletionRequest {
    /// Create a request with the fixed research model and sampling settings.
    #[must_use]
    pub fn research(messages: Vec<ChatMessage>) -> Self {
        Self {
            model: api::MODEL.to_string(),
            messages,
            temperature: api::TEMPERATURE,
            max_tokens: api::MAX_TOKENS,
        }
    }
}

/// A single completion choice.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Choice {
    /// Choice index.
    #[serde(default)]
    pub index: u32,

    /// Generated message.
    #[serde(default)]
    pub message: Option<ChatMessage>,

    /// Per-choice citations (older API revisions), kept raw.
    #[serde(default)]
    pub citations: Option<Vec<Value>>,

    /// Why generation stopped.
    #[serde(default)]
    pub finish_reason: Option<String>,
}

impl Choice {
    /// String citations on this choice, in order.
    #[must_use]
    pub fn citation_urls(&self) -> Vec<String> {
        string_entries(self.citations.as_deref())
    }
}

/// Token accounting.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Response from `POST /chat/completions`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatCompletionResponse {
    /// Completion ID.
    #[serde(default)]
    pub id: Option<String>,

    /// Model that served the request.
    #[serde(default)]
    pub model: Option<String>,

    /// Generated choices.
    #[serde(default)]
    pub choices: Vec<Choice>,

    /// Top-level citations, kept raw so one bad entry cannot sink the answer.
    #[serde(default)]
    pub citations: Option<Vec<Value>>,

    /// Token usage.
    #[serde(default)]
    pub usage: Option<Usage>,
}

impl ChatCompletionResponse {
    /// The first choice, if any.
    #[must_use]
    pub fn first_choice(&self) -> Option<&Choice> {
        self.choices.first()
    }

    /// Completion text of the first choice.
    #[must_use]
    pub fn completion_text(&self) -> Option<&str> {
        self.first_choice().and_then(|c| c.message.as_ref()).and_then(ChatMessage::text)
    }

    /// String top-level citations, in order.
    #[must_use]
    pub fn citation_urls(&self) -> Vec<String> {
        string_entries(self.citations.as_deref())
    }
}
