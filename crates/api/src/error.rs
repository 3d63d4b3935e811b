//! Error type shared by the HTTP clients.

use thiserror::Error;

/// Errors returned by the market-data and messaging clients.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport failure (connect, timeout, body read).
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Upstream answered with a non-success status.
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body was not the expected JSON shape.
    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Bot token or chat id not configured.
    #[error("messaging credentials are not configured")]
    MissingCredentials,
}

impl ApiError {
    /// True when the request never got a response in time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Http(e) if e.is_timeout())
    }
}

/// Shorthand result for API calls.
pub type ApiResult<T> = Result<T, ApiError>;
