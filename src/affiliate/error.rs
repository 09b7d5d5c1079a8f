//! Rewrite decision errors.

use thiserror::Error;

/// Reasons a destination is not rewritten. None of these reach the visitor;
/// every kind degrades to the unmodified redirect.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AffiliateError {
    /// Destination is not an absolute URL or has no host.
    #[error("destination has no parseable host: {0:?}")]
    UnparseableUrl(String),

    /// No enabled merchant owns the host.
    #[error("no merchant owns host {0}")]
    NoMerchantMatch(String),

    /// A merchant owns the host but is switched off.
    #[error("merchant {key} owns host {host} but is disabled")]
    MerchantDisabled { key: String, host: String },

    /// The builder could not split the destination.
    #[error("cannot build affiliate link for {0:?}")]
    InvalidUrl(String),
}

impl AffiliateError {
    /// Metric label for the decision outcome.
    pub fn outcome(&self) -> &'static str {
        match self {
            AffiliateError::UnparseableUrl(_) => "unparseable_url",
            AffiliateError::NoMerchantMatch(_) => "no_match",
            AffiliateError::MerchantDisabled { .. } => "merchant_disabled",
            AffiliateError::InvalidUrl(_) => "invalid_url",
        }
    }

    /// Whether this is an ordinary "not ours" outcome rather than a fault.
    pub fn is_expected(&self) -> bool {
        !matches!(self, AffiliateError::InvalidUrl(_))
    }
}

/// Result type for rewrite decisions.
pub type AffiliateResult<T> = Result<T, AffiliateError>;
