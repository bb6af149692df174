//! Anthropic Messages API client with native request format.

use async_trait::async_trait;
use reqwest::Client;

use super::error::UpstreamError;
use super::{ChatPrompt, CompletionClient};
use crate::config::UpstreamConfig;

/// Client for the Anthropic Messages API.
pub struct AnthropicClient {
    client: Client,
    base_url: String,
    model: String,
    max_tokens: u32,
    temperature: f32,
    api_version: String,
    api_key: Option<String>,
}

impl AnthropicClient {
    /// A missing `api_key` is passed through as an unauthenticated call; the
    /// provider rejects it and that rejection is relayed like any other.
    pub fn new(config: &UpstreamConfig, api_key: Option<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
            api_version: config.api_version.clone(),
            api_key,
        }
    }

    fn build_request(&self, prompt: &ChatPrompt) -> Request {
        Request {
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            messages: vec![RequestMessage {
                role: "user".to_string(),
                content: prompt.message.clone(),
            }],
            system: prompt.system.clone(),
        }
    }
}

#[async_trait]
impl CompletionClient for AnthropicClient {
    async fn complete(&self, prompt: ChatPrompt) -> Result<serde_json::Value, UpstreamError> {
        let url = format!("{}/v1/messages", self.base_url);
        let request = self.build_request(&prompt);

        let mut builder = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("anthropic-version", &self.api_version);
        if let Some(ref key) = self.api_key {
            builder = builder.header("x-api-key", key);
        }

        let response = builder.json(&request).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Rejected { status, body });
        }

        Ok(response.json().await?)
    }
}

// --- Request types ---

#[derive(serde::Serialize)]
struct Request {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<RequestMessage>,
    system: String,
}

#[derive(serde::Serialize)]
struct RequestMessage {
    role: String,
    content: String,
}

// ============================================================================
// Tests
// ============================================================================
