//! Relay error types and their HTTP representation

use crate::protocol::PromptError;
use crate::upstream::UpstreamError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Body text returned for rejected prompts
pub const MISSING_PROMPT: &str = "Missing prompt";

/// Body text returned for failures the caller cannot act on
pub const INTERNAL_ERROR: &str = "Internal server error";

/// Errors of a single generate request, converted to a response at the endpoint
#[derive(Debug, Error)]
pub enum RelayError {
    /// Prompt missing, not a string, or blank
    #[error("Missing prompt")]
    MissingPrompt,

    /// Calling the completion endpoint failed
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl From<PromptError> for RelayError {
    fn from(_: PromptError) -> Self {
        RelayError::MissingPrompt
    }
}

/// Errors that stop the relay server from running
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to build upstream client: {0}")]
    Client(#[from] UpstreamError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
}

impl ResponseError for RelayError {
    fn status_code(&self) -> StatusCode {
        match self {
            RelayError::MissingPrompt => StatusCode::BAD_REQUEST,
            RelayError::Upstream(err) => err
                .mirrored_status()
                .and_then(|status| StatusCode::from_u16(status).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            RelayError::MissingPrompt => HttpResponse::BadRequest().json(ErrorBody {
                error: MISSING_PROMPT,
            }),
            RelayError::Upstream(UpstreamError::Status {
                body, content_type, ..
            }) => HttpResponse::build(self.status_code())
                .content_type(
                    content_type
                        .as_deref()
                        .unwrap_or("text/plain; charset=utf-8"),
                )
                .body(body.clone()),
            RelayError::Upstream(_) => HttpResponse::InternalServerError().json(ErrorBody {
                error: INTERNAL_ERROR,
            }),
        }
    }
}
