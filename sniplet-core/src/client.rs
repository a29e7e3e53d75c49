//! Client for a running relay
//!
//! Speaks the relay's wire contract: one JSON POST per prompt, answered by the
//! upstream event stream, which is reassembled into text deltas here.

use crate::protocol::Prompt;
use crate::stream::text_deltas;
use crate::upstream::{DeltaStream, UpstreamError, UpstreamResult};
use futures::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, ClientBuilder};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

/// Relay address used when none is given
pub const DEFAULT_RELAY_URL: &str = "http://localhost:3001";

const GENERATE_PATH: &str = "/api/generate";

#[derive(Debug, Serialize)]
struct GenerateBody<'a> {
    prompt: &'a str,
}

/// HTTP client for `POST /api/generate`
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: Client,
    base_url: String,
}

impl RelayClient {
    pub fn new(base_url: impl Into<String>) -> UpstreamResult<Self> {
        let client = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| {
                UpstreamError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    pub fn generate_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), GENERATE_PATH)
    }

    /// Submit a prompt and stream back the generated text
    ///
    /// A non-success answer from the relay becomes [`UpstreamError::Status`]
    /// carrying the response text.
    pub async fn generate(&self, prompt: &Prompt) -> UpstreamResult<DeltaStream> {
        let url = self.generate_url();
        debug!(%url, "Submitting prompt");

        let response = self
            .client
            .post(&url)
            .json(&GenerateBody {
                prompt: prompt.as_str(),
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body = %body, "Relay rejected the prompt");

            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
                content_type,
            });
        }

        let body = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(UpstreamError::from));

        Ok(Box::pin(text_deltas(body)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_url() {
        let client = RelayClient::new("http://localhost:3001/").unwrap();
        assert_eq!(client.generate_url(), "http://localhost:3001/api/generate");

        let client = RelayClient::new(DEFAULT_RELAY_URL).unwrap();
        assert_eq!(client.generate_url(), "http://localhost:3001/api/generate");
    }
}
