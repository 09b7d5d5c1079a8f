//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, timeouts and link destinations
//! - Refuse the placeholder admin key
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::{ServiceConfig, PLACEHOLDER_API_KEY};

/// A single semantic problem in the config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listener.bind_address {0:?} is not a socket address")]
    BindAddress(String),

    #[error("timeouts.request_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("link {code:?} has no usable destination: {destination:?}")]
    LinkDestination { code: String, destination: String },

    #[error("link code {0:?} must be a single non-empty path segment")]
    LinkCode(String),

    #[error("admin.api_key must be changed before enabling the admin API")]
    PlaceholderApiKey,

    #[error("observability.metrics_address {0:?} is not a socket address")]
    MetricsAddress(String),
}

/// Check a parsed config, collecting every problem found.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::BindAddress(config.listener.bind_address.clone()));
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    for (code, destination) in &config.links {
        if code.is_empty() || code.contains('/') {
            errors.push(ValidationError::LinkCode(code.clone()));
        }
        let usable = url::Url::parse(destination)
            .map(|url| url.host_str().is_some_and(|host| !host.is_empty()))
            .unwrap_or(false);
        if !usable {
            errors.push(ValidationError::LinkDestination {
                code: code.clone(),
                destination: destination.clone(),
            });
        }
    }

    if config.admin.enabled
        && (config.admin.api_key.is_empty() || config.admin.api_key == PLACEHOLDER_API_KEY)
    {
        errors.push(ValidationError::PlaceholderApiKey);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::MetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
