//! Error types for the backend REST client.

use thiserror::Error;

/// Errors returned by [`Backend`](super::Backend) calls.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Non-success response, with the server's `detail` when it sent one.
    #[error("HTTP {status}: {detail}")]
    Http { status: u16, detail: String },

    /// Credentials or token rejected.
    #[error("Authentication failed: {0}")]
    Auth(String),

    /// Backend unreachable.
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Timeout waiting for response.
    #[error("Request timed out")]
    Timeout,

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// The analysis endpoint answered with an `{error}` payload.
    #[error("Analysis failed: {0}")]
    Analysis(String),

    /// Local file or token storage failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// Whether the server rejected the credentials or token.
    pub fn is_auth(&self) -> bool {
        matches!(self, ApiError::Auth(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Connection(err.to_string())
        } else if err.is_decode() {
            ApiError::Parse(err.to_string())
        } else {
            ApiError::Http {
                status: err.status().map(|s| s.as_u16()).unwrap_or_default(),
                detail: err.to_string(),
            }
        }
    }
}
