//! Gemini API Relay Library
//!
//! A thin reverse proxy in front of the generative-language API: OPTIONS and
//! GET are answered locally, POST is forwarded upstream with a credential
//! chosen by the routing mode, and every response carries permissive CORS
//! headers.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod routing;
pub mod security;

pub use config::schema::ProxyConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
