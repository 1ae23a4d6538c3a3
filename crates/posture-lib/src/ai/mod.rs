//! AI-assisted workload analysis
//!
//! This module provides:
//! - A chat-completion client seam (`ChatClient`) with an OpenAI-compatible implementation
//! - Prompt construction for a single workload
//! - Interpretation of loosely structured model replies, with a typed fallback
//! - A paced, sequential batch analyzer

mod batch;
mod client;
mod interpreter;
mod prompt;

pub use batch::{SecurityAnalyzer, DEFAULT_PACING};
pub use client::{chat_completions_url, ClientConfig, OpenAiClient};
pub use interpreter::{clean_response, interpret, Interpretation};
pub use prompt::{PromptBuilder, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Per-workload failures of the remote call
///
/// These are recoverable: the batch skips the workload and moves on.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("failed to serialize workload: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("invalid AI endpoint: {0}")]
    InvalidEndpoint(String),

    #[error("AI request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AI API error ({status}): {body}")]
    Api { status: u16, body: String },

    #[error("no response choices returned by AI API")]
    EmptyResponse,
}

/// A single chat message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Chat completion request body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    pub max_tokens: u32,
}

impl ChatRequest {
    /// Request carrying one user message
    pub fn single_user(model: impl Into<String>, content: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            messages: vec![ChatMessage::user(content)],
            temperature: None,
            max_tokens,
        }
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TokenUsage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

/// Chat completion response body
#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletion {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
    #[serde(default)]
    pub usage: Option<TokenUsage>,
}

impl ChatCompletion {
    /// Text of the first choice
    pub fn first_content(&self) -> Result<&str, AnalysisError> {
        self.choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or(AnalysisError::EmptyResponse)
    }
}

/// Remote chat-completion service
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Send one completion request
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, AnalysisError>;

    /// Model identifier requests should target
    fn model(&self) -> &str;
}
