//! Configuration schema structures with serde support

use super::error::ValidationError;
use super::secrets::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default relay listen port
pub const DEFAULT_PORT: u16 = 3001;

/// Default relay listen host
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default OpenAI-compatible completion API base URL
pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";

/// Default model identifier sent upstream
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-r1-zero:free";

/// Default upstream connect timeout in seconds
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default time allowed for the upstream to send response headers
pub const DEFAULT_RESPONSE_TIMEOUT_SECS: u64 = 60;

/// Root configuration for the relay process
///
/// Built once at startup and shared read-only with every request.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RelayConfig {
    /// Interface the HTTP server binds to
    #[serde(default = "default_host")]
    pub host: String,

    /// Port the HTTP server listens on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Completion endpoint settings
    pub upstream: UpstreamConfig,
}

/// Settings for the hosted completion endpoint
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct UpstreamConfig {
    /// API key sent as a bearer token (supports environment variable interpolation)
    pub api_key: SecretString,

    /// Base URL of the OpenAI-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model identifier
    #[serde(default = "default_model")]
    pub model: String,

    /// TCP connect timeout in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Seconds allowed until the upstream answers with response headers.
    /// The streamed body itself is not bounded.
    #[serde(default = "default_response_timeout_secs")]
    pub response_timeout_secs: u64,
}

fn default_host() -> String {
    DEFAULT_HOST.to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_connect_timeout_secs() -> u64 {
    DEFAULT_CONNECT_TIMEOUT_SECS
}

fn default_response_timeout_secs() -> u64 {
    DEFAULT_RESPONSE_TIMEOUT_SECS
}

impl RelayConfig {
    /// Create a configuration with defaults for everything but the API key
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            upstream: UpstreamConfig::new(api_key),
        }
    }

    /// Address tuple for binding the HTTP server
    pub fn bind_addr(&self) -> (&str, u16) {
        (self.host.as_str(), self.port)
    }

    /// Built-in structural validation
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.host.trim().is_empty() {
            return Err(ValidationError::required("host"));
        }
        if self.port == 0 {
            return Err(ValidationError::out_of_range("port", "port must be non-zero"));
        }
        self.upstream.validate()
    }
}

impl UpstreamConfig {
    /// Create upstream settings with default endpoint, model and timeouts
    pub fn new(api_key: impl Into<SecretString>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: default_base_url(),
            model: default_model(),
            connect_timeout_secs: default_connect_timeout_secs(),
            response_timeout_secs: default_response_timeout_secs(),
        }
    }

    /// Full URL of the chat completions endpoint
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn response_timeout(&self) -> Duration {
        Duration::from_secs(self.response_timeout_secs)
    }

    fn validate(&self) -> Result<(), ValidationError> {
        if self.api_key.is_blank() {
            return Err(ValidationError::required("upstream.api_key"));
        }
        if self.model.trim().is_empty() {
            return Err(ValidationError::required("upstream.model"));
        }
        if self.base_url.trim().is_empty() {
            return Err(ValidationError::required("upstream.base_url"));
        }
        if self.connect_timeout_secs == 0 {
            return Err(ValidationError::out_of_range(
                "upstream.connect_timeout_secs",
                "timeout must be at least 1 second",
            ));
        }
        if self.response_timeout_secs == 0 {
            return Err(ValidationError::out_of_range(
                "upstream.response_timeout_secs",
                "timeout must be at least 1 second",
            ));
        }
        Ok(())
    }
}
