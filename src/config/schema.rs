//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the relay.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Base URL of the public generative-language API.
pub const DEFAULT_UPSTREAM_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Root configuration for the relay.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ProxyConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Upstream selection and credentials.
    pub upstream: UpstreamConfig,

    /// Cross-origin headers attached to every response.
    pub cors: CorsConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
        }
    }
}

/// How POST requests pick their upstream and credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoutingMode {
    /// Pick a random key from `api_keys` and inject it as `?key=`.
    #[default]
    KeyPool,
    /// Forward client headers; switch to the local upstream when the
    /// client's `x-api-key` matches `local_api_key`.
    KeyedRouting,
}

impl std::str::FromStr for RoutingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "key_pool" | "pool" => Ok(RoutingMode::KeyPool),
            "keyed_routing" | "keyed" => Ok(RoutingMode::KeyedRouting),
            other => Err(format!("unknown routing mode: {other}")),
        }
    }
}

/// Upstream configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Routing mode.
    pub mode: RoutingMode,

    /// Upstream used by the key pool and as the keyed-routing fallback.
    pub default_base_url: String,

    /// Interchangeable API keys for the key pool.
    pub api_keys: Vec<String>,

    /// Client key that unlocks the local upstream.
    pub local_api_key: Option<String>,

    /// Local upstream base URL.
    pub local_base_url: Option<String>,

    /// Connect timeout for upstream calls. Unset means client default.
    pub connect_timeout_secs: Option<u64>,

    /// Maximum redirects followed per request.
    pub max_redirects: usize,

    /// Honor HTTP(S)_PROXY environment variables for upstream calls.
    pub use_env_proxy: bool,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            mode: RoutingMode::KeyPool,
            default_base_url: DEFAULT_UPSTREAM_BASE_URL.to_string(),
            api_keys: Vec::new(),
            local_api_key: None,
            local_base_url: None,
            connect_timeout_secs: None,
            max_redirects: 10,
            use_env_proxy: true,
        }
    }
}

/// CORS header configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    /// Value list for `Access-Control-Allow-Headers`. `["*"]` is a wildcard.
    pub allow_headers: Vec<String>,

    /// Preflight cache lifetime (`Access-Control-Max-Age`).
    pub max_age_secs: Option<u64>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allow_headers: vec!["Content-Type".to_string(), "x-api-key".to_string()],
            max_age_secs: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
