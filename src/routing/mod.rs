//! Short-link routing.
//!
//! # Data Flow
//! ```text
//! Incoming request path (/{code})
//!     → router.rs (code lookup)
//!     → Return: destination URL or NoMatch
//!
//! Table compilation (at startup):
//!     config [links]
//!     → parse destinations
//!     → freeze as immutable LinkTable
//! ```
//!
//! # Design Decisions
//! - Table built at startup, immutable at runtime
//! - Deterministic: same code always resolves to the same destination

pub mod router;

pub use router::{Destination, LinkTable};
