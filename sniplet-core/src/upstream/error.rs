//! Errors raised while talking to a remote streaming endpoint

use thiserror::Error;

/// Result type for upstream operations
pub type UpstreamResult<T> = Result<T, UpstreamError>;

/// Errors that can occur when calling the completion endpoint
///
/// No variant is retried: every request gets exactly one attempt.
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// The endpoint answered with a non-success status
    #[error("Upstream returned status {status}: {body}")]
    Status {
        status: u16,
        body: String,
        content_type: Option<String>,
    },

    /// Network or connection failure
    #[error("Network error: {0}")]
    Transport(String),

    /// No response headers within the configured time
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// Failure while reading an already started response body
    #[error("Failed to read response body: {0}")]
    Body(String),

    /// The HTTP client could not be built
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl UpstreamError {
    /// Status code to mirror to the caller, for status errors only
    pub fn mirrored_status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_connect() {
            UpstreamError::Transport(format!("Connection failed: {}", err))
        } else if err.is_body() || err.is_decode() {
            UpstreamError::Body(err.to_string())
        } else {
            UpstreamError::Transport(err.to_string())
        }
    }
}
