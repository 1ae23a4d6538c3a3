//! OpenAI-compatible chat completion client

use super::{AnalysisError, ChatClient, ChatCompletion, ChatRequest};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};
use url::Url;

const DEFAULT_BASE_URL: &str = "https://api.openai.com";
const DEFAULT_MODEL: &str = "gpt-4o";

/// Configuration for the chat client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Bearer token for the service
    pub api_key: String,
    /// Service root, with or without a trailing `/v1`
    pub base_url: Option<String>,
    /// Model identifier
    pub model: String,
    /// Deadline for a single request
    pub request_timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            model: DEFAULT_MODEL.to_string(),
            request_timeout: Duration::from_secs(120),
        }
    }
}

/// Resolve the chat completions endpoint for a base URL
///
/// A trailing `/v1` (with or without slash) is accepted and not doubled.
pub fn chat_completions_url(base_url: Option<&str>) -> Result<Url, AnalysisError> {
    let base = base_url
        .map(str::trim)
        .filter(|b| !b.is_empty())
        .unwrap_or(DEFAULT_BASE_URL)
        .trim_end_matches('/');
    let base = base.strip_suffix("/v1").unwrap_or(base);

    Url::parse(&format!("{}/v1/chat/completions", base))
        .map_err(|e| AnalysisError::InvalidEndpoint(format!("{}: {}", base, e)))
}

/// Chat client speaking the OpenAI chat completions protocol
pub struct OpenAiClient {
    http: Client,
    endpoint: Url,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    /// Build the client once; it is shared by every request of a run
    pub fn new(config: ClientConfig) -> Result<Self, AnalysisError> {
        let http = Client::builder().timeout(config.request_timeout).build()?;
        let endpoint = chat_completions_url(config.base_url.as_deref())?;

        debug!(endpoint = %endpoint, model = %config.model, "AI client configured");

        Ok(Self {
            http,
            endpoint,
            api_key: config.api_key,
            model: config.model,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl ChatClient for OpenAiClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatCompletion, AnalysisError> {
        let response = self
            .http
            .post(self.endpoint.clone())
            .bearer_auth(&self.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            error!(status = status, model = %request.model, "AI API call failed");
            return Err(AnalysisError::Api { status, body });
        }

        Ok(response.json().await?)
    }

    fn model(&self) -> &str {
        &self.model
    }
}
