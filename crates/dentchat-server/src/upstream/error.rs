//! Upstream error types.

use thiserror::Error;

/// Errors that can occur when calling the upstream completion API.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// HTTP request or body decoding failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("upstream rejected request (status {status}): {body}")]
    Rejected { status: u16, body: String },
}
