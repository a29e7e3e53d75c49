//! Configuration validation utilities

use super::error::ValidationError;
use super::schema::RelayConfig;
use url::Url;

/// Configuration validator with rules beyond the schema's own checks
#[derive(Debug, Default)]
pub struct ConfigValidator;

impl ConfigValidator {
    /// Create a new validator
    pub fn new() -> Self {
        Self
    }

    /// Validate a configuration with extended rules
    pub fn validate(&self, config: &RelayConfig) -> Result<(), ValidationError> {
        // First run the built-in validation
        config.validate()?;

        self.validate_base_url(&config.upstream.base_url)?;

        Ok(())
    }

    /// The completion endpoint must be an absolute http(s) URL
    fn validate_base_url(&self, base_url: &str) -> Result<(), ValidationError> {
        let url = Url::parse(base_url)
            .map_err(|e| ValidationError::invalid_url("upstream.base_url", e.to_string()))?;

        match url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ValidationError::invalid_url(
                    "upstream.base_url",
                    format!("unsupported scheme '{}'", other),
                ))
            }
        }

        if url.cannot_be_a_base() {
            return Err(ValidationError::invalid_url(
                "upstream.base_url",
                "URL cannot be used as a base",
            ));
        }

        Ok(())
    }
}
