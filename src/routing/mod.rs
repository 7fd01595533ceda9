//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! POST request headers
//!     → router.rs (mode dispatch)
//!         key_pool:      key_pool.rs picks a key → default upstream + ?key=
//!         keyed_routing: x-api-key == local key  → local upstream
//!                        otherwise               → default upstream
//!     → ResolvedRoute (base URL, injected key, header policy)
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - Key selection is uniform random with no shared state
//! - Key values never appear in logs, only their pool index

pub mod key_pool;
pub mod router;

pub use key_pool::KeyPool;
pub use router::{HeaderPolicy, ResolvedRoute, UpstreamKind, UpstreamRouter, X_API_KEY};
