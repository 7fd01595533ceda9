//! Cross-origin headers.
//!
//! # Responsibilities
//! - Hold the fixed CORS header set built from configuration
//! - Overlay it on every response, success or failure
//!
//! # Design Decisions
//! - The overlay is unconditional: it does not look at `Origin`
//! - CORS keys from the upstream are overwritten, other headers untouched
//! - Runs as the outermost middleware so no response escapes it

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::Response,
};

use crate::config::CorsConfig;

pub const ALLOWED_METHODS: &str = "GET, POST, OPTIONS";

/// Fixed header set attached to every response.
#[derive(Debug, Clone)]
pub struct CorsHeaders {
    entries: Vec<(HeaderName, HeaderValue)>,
}

impl CorsHeaders {
    pub fn from_config(config: &CorsConfig) -> Self {
        let mut entries = vec![
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
            (
                header::ACCESS_CONTROL_ALLOW_METHODS,
                HeaderValue::from_static(ALLOWED_METHODS),
            ),
            (
                header::ACCESS_CONTROL_ALLOW_HEADERS,
                allow_headers_value(&config.allow_headers),
            ),
        ];

        if let Some(max_age) = config.max_age_secs {
            entries.push((header::ACCESS_CONTROL_MAX_AGE, HeaderValue::from(max_age)));
        }

        Self { entries }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&HeaderName, &HeaderValue)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    /// Overwrite every CORS key in `headers`.
    pub fn apply(&self, headers: &mut HeaderMap) {
        for (name, value) in &self.entries {
            headers.insert(name.clone(), value.clone());
        }
    }
}

impl Default for CorsHeaders {
    fn default() -> Self {
        Self::from_config(&CorsConfig::default())
    }
}

fn allow_headers_value(names: &[String]) -> HeaderValue {
    if names.iter().any(|n| n.trim() == "*") {
        return HeaderValue::from_static("*");
    }
    let joined = names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>()
        .join(", ");
    HeaderValue::from_str(&joined).unwrap_or_else(|_| {
        tracing::warn!(value = %joined, "Invalid allow-headers list, falling back to wildcard");
        HeaderValue::from_static("*")
    })
}

/// Middleware applying the CORS overlay to whatever the inner service returned.
pub async fn cors_overlay(
    State(cors): State<Arc<CorsHeaders>>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;
    cors.apply(response.headers_mut());
    response
}
