//! Affiliate redirect library.
//!
//! Rewrites short-link destinations that belong to a configured merchant into
//! affiliate-network tracking URLs, and hosts the redirect service around it.

pub mod admin;
pub mod affiliate;
pub mod config;
pub mod http;
pub mod observability;
pub mod routing;
pub mod settings;

pub use affiliate::{rewrite, RedirectPayload, Rewrite};
pub use config::schema::ServiceConfig;
pub use http::HttpServer;
pub use settings::{GlobalSettings, Merchant};
