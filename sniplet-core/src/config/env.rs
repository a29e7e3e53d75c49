//! Environment variable handling for configuration
//!
//! Lookups go through a caller-supplied function so the same code serves the
//! real process environment and tests.

use super::error::{ConfigError, ConfigResult};
use super::schema::{RelayConfig, UpstreamConfig};
use super::secrets::SecretString;
use regex::Regex;
use std::str::FromStr;
use std::sync::OnceLock;

/// Required API key for the completion endpoint
pub const API_KEY_VAR: &str = "DEEPSEEK_API_KEY";
pub const PORT_VAR: &str = "PORT";
pub const HOST_VAR: &str = "HOST";
pub const BASE_URL_VAR: &str = "UPSTREAM_BASE_URL";
pub const MODEL_VAR: &str = "UPSTREAM_MODEL";
pub const CONNECT_TIMEOUT_VAR: &str = "UPSTREAM_CONNECT_TIMEOUT_SECS";
pub const RESPONSE_TIMEOUT_VAR: &str = "UPSTREAM_RESPONSE_TIMEOUT_SECS";

fn env_var_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").expect("env var pattern is a valid regex")
    })
}

/// Interpolate `${VAR}` references in a configuration string
pub fn interpolate_env_vars<F>(content: &str, lookup: F) -> ConfigResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut missing: Option<String> = None;
    let result = env_var_pattern().replace_all(content, |cap: &regex::Captures<'_>| {
        let var_name = &cap[1];
        match lookup(var_name) {
            Some(value) => value,
            None => {
                missing.get_or_insert_with(|| var_name.to_string());
                String::new()
            }
        }
    });

    // Report the first missing variable
    if let Some(var) = missing {
        return Err(ConfigError::EnvVarNotFound { var });
    }

    Ok(result.into_owned())
}

/// Build a relay configuration from environment-style lookups
///
/// `DEEPSEEK_API_KEY` is required; every other variable falls back to its
/// default when unset.
pub fn config_from_lookup<F>(lookup: F) -> ConfigResult<RelayConfig>
where
    F: Fn(&str) -> Option<String>,
{
    let api_key = lookup(API_KEY_VAR)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::EnvVarNotFound {
            var: API_KEY_VAR.to_string(),
        })?;

    let mut config = RelayConfig::new(SecretString::new(api_key));

    if let Some(host) = lookup(HOST_VAR) {
        config.host = host;
    }
    if let Some(port) = parse_var(&lookup, PORT_VAR)? {
        config.port = port;
    }

    let upstream: &mut UpstreamConfig = &mut config.upstream;
    if let Some(base_url) = lookup(BASE_URL_VAR) {
        upstream.base_url = base_url;
    }
    if let Some(model) = lookup(MODEL_VAR) {
        upstream.model = model;
    }
    if let Some(secs) = parse_var(&lookup, CONNECT_TIMEOUT_VAR)? {
        upstream.connect_timeout_secs = secs;
    }
    if let Some(secs) = parse_var(&lookup, RESPONSE_TIMEOUT_VAR)? {
        upstream.response_timeout_secs = secs;
    }

    Ok(config)
}

fn parse_var<F, T>(lookup: &F, var: &str) -> ConfigResult<Option<T>>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidValue {
                var: var.to_string(),
                value: raw.clone(),
                message: e.to_string(),
            }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_interpolate_env_vars() {
        let lookup = lookup_from(&[("TEST_VAR", "test_value")]);
        let result = interpolate_env_vars("api_key: ${TEST_VAR}", lookup).unwrap();
        assert_eq!(result, "api_key: test_value");
    }

    #[test]
    fn test_missing_env_var() {
        let result = interpolate_env_vars("api_key: ${MISSING_VAR}", lookup_from(&[]));
        match result {
            Err(ConfigError::EnvVarNotFound { var }) => assert_eq!(var, "MISSING_VAR"),
            other => panic!("Expected EnvVarNotFound error, got {:?}", other),
        }
    }

    #[test]
    fn test_multiple_env_vars() {
        let lookup = lookup_from(&[("VAR1", "value1"), ("VAR2", "value2")]);
        let result = interpolate_env_vars("key1: ${VAR1}, key2: ${VAR2}", lookup).unwrap();
        assert_eq!(result, "key1: value1, key2: value2");
    }

    #[test]
    fn test_config_requires_api_key() {
        let err = config_from_lookup(lookup_from(&[("PORT", "8080")])).unwrap_err();
        match err {
            ConfigError::EnvVarNotFound { var } => assert_eq!(var, API_KEY_VAR),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_config_rejects_empty_api_key() {
        let err = config_from_lookup(lookup_from(&[(API_KEY_VAR, "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::EnvVarNotFound { .. }));
    }

    #[test]
    fn test_config_defaults() {
        let config = config_from_lookup(lookup_from(&[(API_KEY_VAR, "sk-abc")])).unwrap();
        assert_eq!(config.port, 3001);
        assert_eq!(config.upstream.api_key.expose_secret(), "sk-abc");
        assert_eq!(config.upstream.connect_timeout_secs, 10);
    }

    #[test]
    fn test_config_overrides() {
        let config = config_from_lookup(lookup_from(&[
            (API_KEY_VAR, "sk-abc"),
            (PORT_VAR, "8080"),
            (HOST_VAR, "127.0.0.1"),
            (BASE_URL_VAR, "http://localhost:9999/v1"),
            (MODEL_VAR, "deepseek/deepseek-chat"),
            (RESPONSE_TIMEOUT_VAR, "5"),
        ]))
        .unwrap();
        assert_eq!(config.bind_addr(), ("127.0.0.1", 8080));
        assert_eq!(config.upstream.base_url, "http://localhost:9999/v1");
        assert_eq!(config.upstream.model, "deepseek/deepseek-chat");
        assert_eq!(config.upstream.response_timeout_secs, 5);
    }

    #[test]
    fn test_config_invalid_port() {
        let err = config_from_lookup(lookup_from(&[(API_KEY_VAR, "sk-abc"), (PORT_VAR, "abc")]))
            .unwrap_err();
        match err {
            ConfigError::InvalidValue { var, value, .. } => {
                assert_eq!(var, PORT_VAR);
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
