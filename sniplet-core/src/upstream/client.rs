//! HTTP client implementation using reqwest

use super::{ByteStream, CompletionBackend, UpstreamError, UpstreamResult};
use crate::config::UpstreamConfig;
use crate::protocol::{compose_messages, ChatCompletionRequest, Prompt};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, ClientBuilder};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, warn};
use uuid::Uuid;

/// Default user agent
const USER_AGENT: &str = concat!("sniplet/", env!("CARGO_PKG_VERSION"));

/// Shared completion client with connection pooling
#[derive(Clone)]
pub struct UpstreamClient {
    /// The underlying reqwest client
    client: Arc<Client>,

    /// Endpoint, credentials and timeouts
    config: Arc<UpstreamConfig>,
}

impl UpstreamClient {
    /// Create a client for the configured endpoint
    pub fn new(config: UpstreamConfig) -> UpstreamResult<Self> {
        // No overall request timeout: it would also cut off long streams.
        let client = ClientBuilder::new()
            .pool_max_idle_per_host(10)
            .pool_idle_timeout(Duration::from_secs(90))
            .connect_timeout(config.connect_timeout())
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                UpstreamError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client: Arc::new(client),
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    /// Request body for a prompt
    pub fn build_request(&self, prompt: &Prompt) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: compose_messages(prompt),
            stream: true,
        }
    }

    /// Build request headers
    fn build_headers(&self, request_id: Uuid) -> UpstreamResult<HeaderMap> {
        let mut headers = HeaderMap::new();

        let mut bearer =
            HeaderValue::from_str(&format!("Bearer {}", self.config.api_key.expose_secret()))
                .map_err(|_| {
                    UpstreamError::Configuration(
                        "API key contains characters not allowed in a header".to_string(),
                    )
                })?;
        bearer.set_sensitive(true);
        headers.insert(AUTHORIZATION, bearer);

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("text/event-stream"));

        // Add request ID header for correlation
        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            headers.insert("X-Request-ID", value);
        }

        Ok(headers)
    }
}

#[async_trait]
impl CompletionBackend for UpstreamClient {
    async fn stream_completion(
        &self,
        prompt: &Prompt,
        request_id: Uuid,
    ) -> UpstreamResult<ByteStream> {
        let url = self.config.completions_url();
        debug!(%request_id, %url, model = %self.config.model, "Sending completion request");

        let pending = self
            .client
            .post(&url)
            .headers(self.build_headers(request_id)?)
            .json(&self.build_request(prompt))
            .send();

        let response = match tokio::time::timeout(self.config.response_timeout(), pending).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                error!(%request_id, error = %e, "Completion request failed");
                return Err(e.into());
            }
            Err(_) => {
                warn!(
                    %request_id,
                    timeout_secs = self.config.response_timeout_secs,
                    "Completion request timed out waiting for response headers"
                );
                return Err(UpstreamError::Timeout(self.config.response_timeout_secs));
            }
        };

        let status = response.status();
        if !status.is_success() {
            let content_type = response
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            warn!(%request_id, %status, body = %body, "Completion endpoint returned an error");

            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
                content_type,
            });
        }

        Ok(Box::pin(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(UpstreamError::from)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{MessageRole, STRUCTURE_PROMPT, STYLE_PROMPT};

    fn client() -> UpstreamClient {
        UpstreamClient::new(UpstreamConfig::new("sk-test-key")).unwrap()
    }

    #[test]
    fn test_build_request() {
        let prompt = Prompt::parse("  a pricing page ").unwrap();
        let request = client().build_request(&prompt);

        assert!(request.stream);
        assert_eq!(request.model, "deepseek/deepseek-r1-zero:free");
        assert_eq!(request.messages.len(), 3);
        assert_eq!(request.messages[0].content, STYLE_PROMPT);
        assert_eq!(request.messages[1].content, STRUCTURE_PROMPT);
        assert_eq!(request.messages[2].role, MessageRole::User);
        assert_eq!(request.messages[2].content, "a pricing page");
    }

    #[test]
    fn test_headers() {
        let request_id = Uuid::new_v4();
        let headers = client().build_headers(request_id).unwrap();

        assert_eq!(headers[AUTHORIZATION], "Bearer sk-test-key");
        assert!(headers[AUTHORIZATION].is_sensitive());
        assert_eq!(headers[CONTENT_TYPE], "application/json");
        assert_eq!(headers["X-Request-ID"], request_id.to_string().as_str());
    }

    #[test]
    fn test_header_unsafe_key_rejected() {
        let client = UpstreamClient::new(UpstreamConfig::new("sk-bad\nkey")).unwrap();
        assert!(matches!(
            client.build_headers(Uuid::new_v4()),
            Err(UpstreamError::Configuration(_))
        ));
    }
}
