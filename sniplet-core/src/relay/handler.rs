//! Request handlers

use super::error::RelayError;
use super::pipe::{log_termination, relay_body, RelayTermination, RELAY_CHANNEL_CAPACITY};
use crate::protocol::Prompt;
use crate::upstream::CompletionBackend;
use actix_web::http::header::CACHE_CONTROL;
use actix_web::{web, HttpResponse};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Shared state of the relay endpoints
pub struct AppState {
    pub backend: Arc<dyn CompletionBackend>,
    pub channel_capacity: usize,
}

impl AppState {
    pub fn new(backend: Arc<dyn CompletionBackend>) -> Self {
        Self {
            backend,
            channel_capacity: RELAY_CHANNEL_CAPACITY,
        }
    }

    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }
}

/// Body of `POST /api/generate`; any other fields are ignored
#[derive(Debug, Deserialize)]
struct GenerateRequest {
    #[serde(default)]
    prompt: Option<serde_json::Value>,
}

/// Extract the prompt from a raw request body
///
/// A body that is not a JSON object, lacks `prompt`, carries a non-string
/// `prompt` or only whitespace is rejected the same way.
pub fn parse_prompt(body: &[u8]) -> Result<Prompt, RelayError> {
    let request: GenerateRequest =
        serde_json::from_slice(body).map_err(|_| RelayError::MissingPrompt)?;
    let raw = request
        .prompt
        .as_ref()
        .and_then(serde_json::Value::as_str)
        .ok_or(RelayError::MissingPrompt)?;

    Ok(Prompt::parse(raw)?)
}

/// `POST /api/generate`
pub async fn generate(
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse, RelayError> {
    let request_id = Uuid::new_v4();

    let prompt = parse_prompt(&body).inspect_err(|_| {
        log_termination(request_id, &RelayTermination::Rejected);
    })?;

    let upstream = state
        .backend
        .stream_completion(&prompt, request_id)
        .await
        .inspect_err(|err| {
            let termination = match err.mirrored_status() {
                Some(status) => RelayTermination::UpstreamStatus(status),
                None => RelayTermination::UpstreamFailed,
            };
            log_termination(request_id, &termination);
        })?;

    // HTTP/1.1 keeps the connection open by default; actix never writes a
    // `Connection: keep-alive` header for it.
    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header((CACHE_CONTROL, "no-cache"))
        .streaming(relay_body(upstream, request_id, state.channel_capacity)))
}

/// `GET /health`
pub async fn health() -> &'static str {
    "OK"
}
