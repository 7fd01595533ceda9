//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Request handling produces:
//!     → logging.rs (structured log events, request ID in the span)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → stdout (collected by the host)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID flows through the request span
//! - Metrics are cheap (no-ops until a recorder is installed)
//! - API keys are never logged

pub mod logging;
pub mod metrics;
