//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (main.rs):
//!     Load config → Validate → Init logging/metrics → Bind → Serve
//!
//! Shutdown (signals.rs):
//!     SIGTERM/SIGINT → Shutdown::trigger → Stop accepting → Drain in-flight requests → Exit
//! ```

pub mod signals;

pub use signals::Shutdown;
