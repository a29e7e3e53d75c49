//! HTTP relay in front of the completion endpoint
//!
//! `POST /api/generate` validates the prompt, opens one streamed completion
//! and copies the upstream body to the caller byte for byte. Upstream error
//! statuses are mirrored with their body. Each request is independent.

pub mod error;
pub mod handler;
pub mod pipe;
pub mod server;

pub use error::{RelayError, ServerError, INTERNAL_ERROR, MISSING_PROMPT};
pub use handler::{generate, health, parse_prompt, AppState};
pub use pipe::{pump, relay_body, RelayPhase, RelayTermination, RELAY_CHANNEL_CAPACITY};
pub use server::{build_server, configure, serve};
