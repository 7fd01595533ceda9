//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and upstream URLs
//! - Keep the CORS overlay usable for browser clients
//! - Warn about settings that parse but cannot take effect
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - An empty key pool is not an error here; it is reported per request

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::{ProxyConfig, RoutingMode};

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid bind address '{0}'")]
    BindAddress(String),
    #[error("invalid metrics address '{0}'")]
    MetricsAddress(String),
    #[error("{field} is not an http(s) base URL without query or fragment: '{value}'")]
    UpstreamUrl { field: &'static str, value: String },
    #[error("cors.allow_headers must not be empty")]
    EmptyAllowHeaders,
    #[error("cors.allow_headers must include '{0}' or '*'")]
    MissingAllowHeader(&'static str),
    #[error("cors.max_age_secs {0} exceeds {max}", max = MAX_CORS_MAX_AGE_SECS)]
    MaxAgeTooLarge(u64),
}

/// Headers browser clients send on every relayed call.
pub const REQUIRED_ALLOW_HEADERS: [&str; 2] = ["Content-Type", "x-api-key"];

/// Upper bound for `Access-Control-Max-Age`; browsers cap preflight caching at a day.
pub const MAX_CORS_MAX_AGE_SECS: u64 = 86_400;

pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    let upstream = &config.upstream;
    if !is_http_url(&upstream.default_base_url) {
        errors.push(ValidationError::UpstreamUrl {
            field: "upstream.default_base_url",
            value: upstream.default_base_url.clone(),
        });
    }

    if let Some(local) = &upstream.local_base_url {
        if !is_http_url(local) {
            errors.push(ValidationError::UpstreamUrl {
                field: "upstream.local_base_url",
                value: local.clone(),
            });
        }
    }

    errors.extend(check_allow_headers(&config.cors.allow_headers));

    if let Some(max_age) = config.cors.max_age_secs {
        if max_age > MAX_CORS_MAX_AGE_SECS {
            errors.push(ValidationError::MaxAgeTooLarge(max_age));
        }
    }

    warn_ineffective(config);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Base URLs get the request path appended, so they cannot carry a query or fragment.
fn is_http_url(raw: &str) -> bool {
    Url::parse(raw)
        .map(|u| {
            matches!(u.scheme(), "http" | "https")
                && u.has_host()
                && u.query().is_none()
                && u.fragment().is_none()
        })
        .unwrap_or(false)
}

fn check_allow_headers(names: &[String]) -> Vec<ValidationError> {
    let names: Vec<&str> = names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .collect();

    if names.is_empty() {
        return vec![ValidationError::EmptyAllowHeaders];
    }
    if names.contains(&"*") {
        return Vec::new();
    }

    REQUIRED_ALLOW_HEADERS
        .iter()
        .copied()
        .filter(|required| !names.iter().any(|n| n.eq_ignore_ascii_case(required)))
        .map(ValidationError::MissingAllowHeader)
        .collect()
}

fn warn_ineffective(config: &ProxyConfig) {
    let upstream = &config.upstream;
    match upstream.mode {
        RoutingMode::KeyPool if upstream.api_keys.is_empty() => {
            tracing::warn!("Key pool is empty; POST requests will fail with 500");
        }
        RoutingMode::KeyedRouting
            if upstream.local_api_key.is_some() != upstream.local_base_url.is_some() =>
        {
            tracing::warn!(
                "Local routing needs both local_api_key and local_base_url; all traffic goes to the default upstream"
            );
        }
        _ => {}
    }
}
