//! Chat relay HTTP handler.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::error;

use crate::server::AppState;
use crate::upstream::{ChatPrompt, UpstreamError};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Deserialize)]
pub struct ChatRelayRequest {
    message: String,
    #[serde(rename = "systemPrompt")]
    system_prompt: String,
}

// ============================================================================
// Handler
// ============================================================================

/// POST /api/chat
///
/// Forwards one user question to the upstream completion API and relays the
/// answer back verbatim. Upstream rejections keep their original status code;
/// anything else that goes wrong collapses to an opaque 500.
pub async fn relay_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRelayRequest>,
) -> Response {
    let prompt = ChatPrompt {
        message: req.message,
        system: req.system_prompt,
    };

    match state.upstream.complete(prompt).await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(UpstreamError::Rejected { status, body }) => {
            error!(status, "upstream rejected chat request: {body}");
            // A provider status outside the valid range cannot round-trip;
            // answer 502 instead of panicking.
            let code = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
            (code, Json(json!({ "error": body }))).into_response()
        }
        Err(e) => {
            error!("chat relay failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": "Internal Server Error" })),
            )
                .into_response()
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
