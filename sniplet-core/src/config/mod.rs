//! Configuration module for the Sniplet relay
//!
//! The relay is configured once at process start, either from environment
//! variables or from a YAML file whose values may reference `${VAR}`
//! environment variables. The resulting [`RelayConfig`] is validated before it
//! is handed to the server; a missing `DEEPSEEK_API_KEY` is fatal.

mod env;
mod error;
mod schema;
mod secrets;
mod validator;

pub use env::{
    config_from_lookup, interpolate_env_vars, API_KEY_VAR, BASE_URL_VAR, CONNECT_TIMEOUT_VAR,
    HOST_VAR, MODEL_VAR, PORT_VAR, RESPONSE_TIMEOUT_VAR,
};
pub use error::{ConfigError, ConfigResult, ValidationError, ValidationErrorKind};
pub use schema::{
    RelayConfig, UpstreamConfig, DEFAULT_BASE_URL, DEFAULT_CONNECT_TIMEOUT_SECS, DEFAULT_HOST,
    DEFAULT_MODEL, DEFAULT_PORT, DEFAULT_RESPONSE_TIMEOUT_SECS,
};
pub use secrets::SecretString;
pub use validator::ConfigValidator;

use std::fs;
use std::path::Path;

/// Environment variable naming an optional YAML configuration file
pub const CONFIG_PATH_VAR: &str = "SNIPLET_CONFIG";

/// Load the relay configuration from the process environment
pub fn load_from_env() -> ConfigResult<RelayConfig> {
    let config = config_from_lookup(|name| std::env::var(name).ok())?;
    ConfigValidator::new().validate(&config)?;
    Ok(config)
}

/// Load a configuration from a YAML file
pub fn load_from_yaml<P: AsRef<Path>>(path: P) -> ConfigResult<RelayConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| ConfigError::IoError {
        path: path.to_string_lossy().to_string(),
        source: e,
    })?;

    parse_yaml(&content, &path.to_string_lossy(), |name| {
        std::env::var(name).ok()
    })
}

/// Load from `SNIPLET_CONFIG` when set, otherwise from environment variables
pub fn load() -> ConfigResult<RelayConfig> {
    match std::env::var(CONFIG_PATH_VAR) {
        Ok(path) if !path.trim().is_empty() => load_from_yaml(path),
        _ => load_from_env(),
    }
}

/// Parse and validate YAML configuration text
pub fn parse_yaml<F>(content: &str, origin: &str, lookup: F) -> ConfigResult<RelayConfig>
where
    F: Fn(&str) -> Option<String>,
{
    // Interpolate environment variables before parsing
    let interpolated = interpolate_env_vars(content, lookup)?;

    let config: RelayConfig =
        serde_yaml::from_str(&interpolated).map_err(|e| ConfigError::ParseError {
            path: origin.to_string(),
            line: e.location().map(|l| l.line()),
            column: e.location().map(|l| l.column()),
            message: e.to_string(),
        })?;

    ConfigValidator::new().validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_yaml() {
        let yaml = r#"
port: 4000
upstream:
  api_key: ${DEEPSEEK_API_KEY}
  model: deepseek/deepseek-chat
"#;
        let config = parse_yaml(yaml, "inline", |name| {
            (name == "DEEPSEEK_API_KEY").then(|| "sk-inline".to_string())
        })
        .unwrap();

        assert_eq!(config.port, 4000);
        assert_eq!(config.upstream.api_key.expose_secret(), "sk-inline");
        assert_eq!(config.upstream.model, "deepseek/deepseek-chat");
    }

    #[test]
    fn test_parse_yaml_unknown_field() {
        let yaml = r#"
upstream:
  api_key: sk-test
  retries: 3
"#;
        let err = parse_yaml(yaml, "inline", |_| None).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_parse_yaml_runs_validator() {
        let yaml = r#"
upstream:
  api_key: sk-test
  base_url: not a url
"#;
        let err = parse_yaml(yaml, "inline", |_| None).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }
}
