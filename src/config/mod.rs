//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ServiceConfig (validated, immutable)
//!
//! Settings record on disk changes:
//!     watcher.rs detects change
//!     → settings store reloads the record
//!     → atomic swap of the settings snapshot
//! ```
//!
//! # Design Decisions
//! - Service config is immutable once loaded; affiliate settings hot reload
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{AdminConfig, ListenerConfig, ObservabilityConfig, ServiceConfig};
