//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Outbound request (keyed routing):
//!     → headers.rs (drop edge + connection headers)
//!     → upstream
//!
//! Every response:
//!     → headers.rs (drop hop-by-hop headers from upstream responses)
//!     → cors.rs (overlay the fixed CORS header set)
//!     → client
//! ```

pub mod cors;
pub mod headers;

pub use cors::{cors_overlay, CorsHeaders};
