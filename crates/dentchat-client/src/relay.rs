//! HTTP transport to the relay endpoint and the turn cycle driver.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::session::ChatSession;

/// Errors that can occur when asking the relay for a reply.
#[derive(Debug, Error)]
pub enum RelayError {
    /// HTTP request or body decoding failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The relay answered with a non-success status.
    #[error("relay returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The reply body had no text content block to show.
    #[error("reply contained no text content")]
    MalformedReply,
}

/// Capability for sending one question and getting the reply text back.
///
/// The session driver depends on this trait so the submit/settle cycle can be
/// exercised without a running relay.
#[async_trait]
pub trait RelayTransport: Send + Sync {
    async fn send(&self, message: &str) -> Result<String, RelayError>;
}

/// HTTP client for the relay's `POST /api/chat` endpoint.
pub struct RelayClient {
    client: Client,
    base_url: String,
    system_prompt: String,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        // A trailing slash would produce "//api/chat" when the path is joined.
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: Client::new(),
            base_url,
            system_prompt: system_prompt.into(),
        }
    }
}

#[async_trait]
impl RelayTransport for RelayClient {
    async fn send(&self, message: &str) -> Result<String, RelayError> {
        let url = format!("{}/api/chat", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&ChatRelayRequest {
                message,
                system_prompt: &self.system_prompt,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            // The relay wraps errors as {"error": "..."}; fall back to the
            // raw text for anything else in the way (proxies, bad gateways).
            let body = serde_json::from_str::<ErrorBody>(&text)
                .map(|e| e.error)
                .unwrap_or(text);
            return Err(RelayError::Status { status, body });
        }

        let reply: ReplyBody = response.json().await?;
        extract_reply(&reply)
            .map(str::to_string)
            .ok_or(RelayError::MalformedReply)
    }
}

/// Run one full submission cycle: submit the draft, ask the relay, settle.
///
/// Returns false if the draft was rejected (empty, or a request is already in
/// flight) and no network call was made. The send is the only suspension
/// point; an abandoned future simply leaves the session awaiting.
pub async fn run_turn<T>(session: &mut ChatSession, relay: &T) -> bool
where
    T: RelayTransport + ?Sized,
{
    let Some(text) = session.submit() else {
        return false;
    };
    debug!("submitting {} chars to relay", text.len());
    let outcome = relay.send(&text).await;
    session.settle(outcome);
    true
}

// --- Wire types ---

#[derive(Serialize)]
struct ChatRelayRequest<'a> {
    message: &'a str,
    #[serde(rename = "systemPrompt")]
    system_prompt: &'a str,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

#[derive(Deserialize)]
struct ReplyBody {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// The first text block of the reply's content array, if any.
fn extract_reply(body: &ReplyBody) -> Option<&str> {
    body.content.iter().find_map(|block| block.text.as_deref())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::MessageKind;
    use crate::session::ChatConfig;

    fn parse(json: &str) -> ReplyBody {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_extract_reply_takes_first_text_block() {
        let body = parse(
            r#"{ "content": [
                { "type": "text", "text": "Чистите зубы дважды в день." },
                { "type": "text", "text": "second block" }
            ] }"#,
        );
        assert_eq!(extract_reply(&body), Some("Чистите зубы дважды в день."));
    }

    #[test]
    fn test_extract_reply_skips_textless_blocks() {
        let body = parse(
            r#"{ "content": [
                { "type": "tool_use" },
                { "type": "text", "text": "ответ" }
            ] }"#,
        );
        assert_eq!(extract_reply(&body), Some("ответ"));
    }

    #[test]
    fn test_extract_reply_empty_content_is_none() {
        assert_eq!(extract_reply(&parse(r#"{ "content": [] }"#)), None);
        assert_eq!(extract_reply(&parse(r#"{}"#)), None);
    }

    #[test]
    fn test_request_wire_format_uses_camel_case_prompt_field() {
        let request = ChatRelayRequest {
            message: "болит зуб",
            system_prompt: "dental only",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["message"], "болит зуб");
        assert_eq!(json["systemPrompt"], "dental only");
    }

    #[test]
    fn test_new_trims_trailing_slash_from_base_url() {
        let client = RelayClient::new("http://localhost:8080/", "prompt");
        assert_eq!(client.base_url, "http://localhost:8080");

        let client = RelayClient::new("http://localhost:8080", "prompt");
        assert_eq!(client.base_url, "http://localhost:8080");
    }

    // --- Turn cycle with a stubbed transport ---

    struct StubRelay {
        result: Result<&'static str, u16>,
    }

    #[async_trait]
    impl RelayTransport for StubRelay {
        async fn send(&self, _message: &str) -> Result<String, RelayError> {
            match self.result {
                Ok(reply) => Ok(reply.to_string()),
                Err(status) => Err(RelayError::Status {
                    status,
                    body: "rate limited".to_string(),
                }),
            }
        }
    }

    #[tokio::test]
    async fn test_run_turn_appends_user_then_bot() {
        let mut session = ChatSession::new(&ChatConfig::default());
        let relay = StubRelay {
            result: Ok("Чистите зубы дважды в день."),
        };

        session.set_draft("Как часто чистить зубы?");
        assert!(run_turn(&mut session, &relay).await);

        let messages = session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].kind, MessageKind::User);
        assert_eq!(messages[2].kind, MessageKind::Bot);
        assert_eq!(messages[2].content, "Чистите зубы дважды в день.");
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_run_turn_appends_error_notice_on_failure() {
        let mut session = ChatSession::new(&ChatConfig::default());
        let relay = StubRelay { result: Err(429) };

        session.set_draft("вопрос");
        assert!(run_turn(&mut session, &relay).await);

        let messages = session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[2].kind, MessageKind::Error);
        assert_eq!(
            messages[2].content,
            "Произошла ошибка при получении ответа. Пожалуйста, попробуйте позже."
        );
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_run_turn_rejects_blank_draft_without_calling_relay() {
        let mut session = ChatSession::new(&ChatConfig::default());
        let relay = StubRelay { result: Ok("unused") };

        session.set_draft("   ");
        assert!(!run_turn(&mut session, &relay).await);
        assert_eq!(session.messages().len(), 1);
    }
}
