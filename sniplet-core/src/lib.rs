//! Sniplet Core Library
//!
//! A thin streaming relay between a prompt submitter and a hosted chat
//! completion endpoint, plus the pieces needed to consume its output:
//!
//! - [`stream`]: reassembles event-stream bytes into text deltas
//! - [`upstream`]: issues the streamed completion request
//! - [`relay`]: the `POST /api/generate` HTTP endpoint
//! - [`client`] and [`output`]: submit prompts to a relay and render the result

pub mod client;
pub mod config;
pub mod output;
pub mod protocol;
pub mod relay;
pub mod stream;
pub mod upstream;

/// Returns the version of the Sniplet Core library.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
