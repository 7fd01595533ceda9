//! Configuration loading from disk and the process environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::{ProxyConfig, RoutingMode};
use crate::config::validation::ValidationError;

/// Comma-separated upstream API keys.
pub const ENV_API_KEYS: &str = "GEMINI_API_KEYS";
/// Client key that selects the local upstream.
pub const ENV_LOCAL_API_KEY: &str = "LOCAL_API_KEY";
/// Local upstream base URL.
pub const ENV_LOCAL_UPSTREAM_URL: &str = "LOCAL_UPSTREAM_URL";
/// Routing mode override (`key_pool` or `keyed_routing`).
pub const ENV_RELAY_MODE: &str = "RELAY_MODE";
/// Default upstream base URL override.
pub const ENV_UPSTREAM_BASE_URL: &str = "UPSTREAM_BASE_URL";
/// Full listener address override.
pub const ENV_BIND_ADDRESS: &str = "BIND_ADDRESS";
/// Listener port override, bound on all interfaces.
pub const ENV_PORT: &str = "PORT";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid value for {var}: {reason}")]
    Env { var: &'static str, reason: String },
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse a TOML configuration file without validating it.
pub fn read_config_file(path: &Path) -> Result<ProxyConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Overlay environment values on top of `config`.
///
/// `lookup` resolves a variable name to its value; tests pass a map lookup
/// instead of touching the real environment.
pub fn apply_env_overrides<F>(mut config: ProxyConfig, lookup: F) -> Result<ProxyConfig, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(raw) = lookup(ENV_API_KEYS) {
        config.upstream.api_keys = parse_key_list(&raw);
    }

    if let Some(key) = non_empty(lookup(ENV_LOCAL_API_KEY)) {
        config.upstream.local_api_key = Some(key);
    }

    if let Some(url) = non_empty(lookup(ENV_LOCAL_UPSTREAM_URL)) {
        config.upstream.local_base_url = Some(url);
    }

    if let Some(url) = non_empty(lookup(ENV_UPSTREAM_BASE_URL)) {
        config.upstream.default_base_url = url;
    }

    if let Some(mode) = non_empty(lookup(ENV_RELAY_MODE)) {
        config.upstream.mode = mode
            .parse::<RoutingMode>()
            .map_err(|reason| ConfigError::Env { var: ENV_RELAY_MODE, reason })?;
    }

    if let Some(port) = non_empty(lookup(ENV_PORT)) {
        let port: u16 = port.parse().map_err(|_| ConfigError::Env {
            var: ENV_PORT,
            reason: format!("not a port number: {port}"),
        })?;
        config.listener.bind_address = format!("0.0.0.0:{port}");
    }

    if let Some(addr) = non_empty(lookup(ENV_BIND_ADDRESS)) {
        config.listener.bind_address = addr;
    }

    Ok(config)
}

/// Split a comma-separated key list, trimming whitespace and dropping
/// empty entries.
pub fn parse_key_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}
