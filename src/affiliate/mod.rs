//! Affiliate rewrite subsystem.
//!
//! # Data Flow
//! ```text
//! destination URL + settings snapshot
//!     → matcher.rs (normalize host, first enabled merchant owning it)
//!     → builder.rs (parameter precedence, network URL assembly)
//!     → page.rs (redirect document)
//!     → Rewrite::Rewritten(payload) | Rewrite::NotApplicable
//! ```
//!
//! # Design Decisions
//! - Both stages are pure functions over an immutable snapshot
//! - Every failure degrades to `NotApplicable`; the host then performs its
//!   ordinary redirect to the unmodified destination
//! - A rewrite is terminal: the host must send the payload and stop

pub mod builder;
pub mod error;
pub mod matcher;
pub mod page;

use std::panic;

pub use builder::{affiliate_url, build, NETWORK_ENDPOINT};
pub use error::{AffiliateError, AffiliateResult};
pub use matcher::{classify, find_match, normalize_host};
pub use page::RedirectPayload;

use crate::observability::metrics;
use crate::settings::model::GlobalSettings;

/// Outcome of the pre-redirect hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rewrite {
    /// Send this payload as the whole response and stop processing.
    Rewritten(RedirectPayload),
    /// Proceed with the normal redirect.
    NotApplicable,
}

impl Rewrite {
    pub fn is_rewritten(&self) -> bool {
        matches!(self, Rewrite::Rewritten(_))
    }
}

/// Decide whether `destination` gets an affiliate rewrite under `settings`.
///
/// Never fails: decision errors and panics inside the decision are logged
/// and reported as `NotApplicable`.
pub fn rewrite(destination: &str, settings: &GlobalSettings) -> Rewrite {
    if destination.is_empty() {
        return Rewrite::NotApplicable;
    }

    let decision = panic::catch_unwind(|| decide(destination, settings));

    match decision {
        Ok(Ok((merchant, payload))) => {
            tracing::debug!(
                destination = %destination,
                merchant = %merchant,
                target = %payload.target_url,
                "Affiliate rewrite applied"
            );
            metrics::record_rewrite(&merchant);
            Rewrite::Rewritten(payload)
        }
        Ok(Err(err)) => {
            if err.is_expected() {
                tracing::debug!(destination = %destination, reason = %err, "No affiliate rewrite");
            } else {
                tracing::warn!(destination = %destination, error = %err, "Affiliate rewrite failed, using plain redirect");
            }
            metrics::record_decision(err.outcome());
            Rewrite::NotApplicable
        }
        Err(_) => {
            tracing::error!(destination = %destination, "Affiliate rewrite panicked, using plain redirect");
            metrics::record_decision("internal_error");
            Rewrite::NotApplicable
        }
    }
}

fn decide(destination: &str, settings: &GlobalSettings) -> AffiliateResult<(String, RedirectPayload)> {
    let merchant = classify(destination, &settings.merchants)?;
    let payload = build(destination, merchant, settings)?;
    Ok((merchant.key.clone(), payload))
}
