//! Client for the hosted chat completion endpoint
//!
//! Every call sends the composed message set (two fixed system prompts and the
//! user prompt) with `stream: true` and hands back the raw response body as a
//! [`ByteStream`]. The relay forwards those bytes verbatim; consumers that
//! need text use [`CompletionBackend::stream_deltas`].

pub mod client;
pub mod error;

pub use client::UpstreamClient;
pub use error::{UpstreamError, UpstreamResult};

use crate::protocol::Prompt;
use crate::stream::text_deltas;
use async_trait::async_trait;
use bytes::Bytes;
use futures::Stream;
use std::pin::Pin;
use uuid::Uuid;

/// Raw response body of a streamed completion
pub type ByteStream = Pin<Box<dyn Stream<Item = UpstreamResult<Bytes>> + Send>>;

/// Reassembled text deltas of a streamed completion
pub type DeltaStream = Pin<Box<dyn Stream<Item = UpstreamResult<String>> + Send>>;

/// Something that can start a streamed completion for a prompt
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    /// Issue the request and return the body once a success status arrived
    ///
    /// Non-success statuses become [`UpstreamError::Status`] with the body
    /// text; nothing is retried.
    async fn stream_completion(
        &self,
        prompt: &Prompt,
        request_id: Uuid,
    ) -> UpstreamResult<ByteStream>;

    /// Like `stream_completion`, reassembled into text deltas
    async fn stream_deltas(
        &self,
        prompt: &Prompt,
        request_id: Uuid,
    ) -> UpstreamResult<DeltaStream> {
        let body = self.stream_completion(prompt, request_id).await?;
        Ok(Box::pin(text_deltas(body)))
    }
}
