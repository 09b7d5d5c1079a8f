//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (rewrite decision counters)
//!
//! Consumers:
//!     → Log aggregation (stdout, pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event, destination URL as context
//! - Request ID flows through the HTTP layer into handler spans
//! - Counters are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
