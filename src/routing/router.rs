//! Upstream and credential resolution.
//!
//! # Responsibilities
//! - Decide which upstream base URL a POST goes to
//! - Decide which credential (if any) the relay injects
//! - Decide which header policy the outbound request uses
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - Resolution never touches the network
//! - Key pool exhaustion is a per-request error, not a startup error

use axum::http::HeaderMap;

use crate::config::{RoutingMode, UpstreamConfig};
use crate::http::error::RelayError;
use crate::routing::key_pool::KeyPool;

/// Client header compared against the local key in keyed routing.
pub const X_API_KEY: &str = "x-api-key";

/// Which configured upstream a request resolved to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamKind {
    Default,
    Local,
}

impl UpstreamKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpstreamKind::Default => "default",
            UpstreamKind::Local => "local",
        }
    }
}

/// How outbound headers are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderPolicy {
    /// Replace everything with `Content-Type: application/json`.
    JsonOnly,
    /// Copy inbound headers minus edge and connection headers.
    ForwardSanitized,
}

/// Outcome of route resolution for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRoute<'a> {
    pub upstream: UpstreamKind,
    pub base_url: &'a str,
    /// Key injected as the `key` query parameter, with its pool index.
    pub query_key: Option<(usize, &'a str)>,
    pub header_policy: HeaderPolicy,
}

#[derive(Debug, Clone)]
struct LocalRoute {
    api_key: String,
    base_url: String,
}

/// Resolves requests to an upstream according to the routing mode.
#[derive(Debug, Clone)]
pub struct UpstreamRouter {
    mode: RoutingMode,
    default_base_url: String,
    key_pool: KeyPool,
    local: Option<LocalRoute>,
}

impl UpstreamRouter {
    /// Build a router from upstream configuration.
    pub fn from_config(config: &UpstreamConfig) -> Self {
        let local = match (&config.local_api_key, &config.local_base_url) {
            (Some(api_key), Some(base_url)) => Some(LocalRoute {
                api_key: api_key.clone(),
                base_url: trim_base(base_url),
            }),
            _ => None,
        };

        Self {
            mode: config.mode,
            default_base_url: trim_base(&config.default_base_url),
            key_pool: KeyPool::new(config.api_keys.clone()),
            local,
        }
    }

    pub fn mode(&self) -> RoutingMode {
        self.mode
    }

    pub fn key_pool(&self) -> &KeyPool {
        &self.key_pool
    }

    /// Resolve the upstream for a request carrying `headers`.
    pub fn resolve(&self, headers: &HeaderMap) -> Result<ResolvedRoute<'_>, RelayError> {
        match self.mode {
            RoutingMode::KeyPool => {
                let picked = self.key_pool.pick().ok_or(RelayError::NoApiKeys)?;
                Ok(ResolvedRoute {
                    upstream: UpstreamKind::Default,
                    base_url: &self.default_base_url,
                    query_key: Some((picked.index, picked.key)),
                    header_policy: HeaderPolicy::JsonOnly,
                })
            }
            RoutingMode::KeyedRouting => {
                let (upstream, base_url) = match &self.local {
                    Some(local) if client_key(headers) == Some(local.api_key.as_bytes()) => {
                        (UpstreamKind::Local, local.base_url.as_str())
                    }
                    _ => (UpstreamKind::Default, self.default_base_url.as_str()),
                };
                Ok(ResolvedRoute {
                    upstream,
                    base_url,
                    query_key: None,
                    header_policy: HeaderPolicy::ForwardSanitized,
                })
            }
        }
    }
}

fn client_key(headers: &HeaderMap) -> Option<&[u8]> {
    headers.get(X_API_KEY).map(|v| v.as_bytes())
}

fn trim_base(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}
