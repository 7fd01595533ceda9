//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults
//!     → optional TOML file (loader.rs)
//!     → environment overrides (GEMINI_API_KEYS, LOCAL_API_KEY, ...)
//!     → CLI overrides (--bind)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → shared via Arc with the request handler
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{apply_env_overrides, read_config_file, ConfigError};
pub use schema::CorsConfig;
pub use schema::ListenerConfig;
pub use schema::ObservabilityConfig;
pub use schema::ProxyConfig;
pub use schema::RoutingMode;
pub use schema::UpstreamConfig;
