//! Upstream completion API client.

mod anthropic;
mod error;

pub use anthropic::AnthropicClient;
pub use error::UpstreamError;

use async_trait::async_trait;

/// One user question plus the system instruction to answer it under.
/// Built fresh per relay call, never retained.
#[derive(Debug, Clone)]
pub struct ChatPrompt {
    pub message: String,
    pub system: String,
}

/// Capability for making a single-turn completion request.
///
/// The relay handler depends on this trait rather than a concrete client so
/// the success and failure paths can be exercised without network access.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    /// Send the prompt upstream and return the provider's JSON body verbatim.
    async fn complete(&self, prompt: ChatPrompt) -> Result<serde_json::Value, UpstreamError>;
}
