//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, method dispatch)
//!     → [routing layer picks upstream + credential] (POST only)
//!     → request.rs (target URL, outbound headers, streamed body)
//!     → upstream
//!     → response.rs (status + headers + streamed body)
//!     → CORS overlay
//!     → Send to client
//! ```

pub mod error;
pub mod request;
pub mod response;
pub mod server;

pub use error::{RelayError, ServerError};
pub use request::{RelayRequestId, X_REQUEST_ID};
pub use response::STATUS_BANNER;
pub use server::HttpServer;
