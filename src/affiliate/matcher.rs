//! Merchant matching logic.
//!
//! # Responsibilities
//! - Extract the host from a destination URL
//! - Normalize it (lower-case, one leading `www.` removed)
//! - Find the first enabled merchant owning that host
//!
//! # Design Decisions
//! - Exact host equality only; no suffix or wildcard matching
//! - Table order is the tie-break when merchants share a domain
//! - Disabled merchants are skipped, not treated as a match
//! - Scheme-relative destinations (`//host/path`) are read as https

use url::{ParseError, Url};

use crate::affiliate::error::{AffiliateError, AffiliateResult};
use crate::settings::model::{Merchant, MerchantTable};

/// Parse a destination into an absolute URL that has a non-empty host.
pub(crate) fn parse_destination(destination: &str) -> Option<Url> {
    let url = match Url::parse(destination) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) if destination.trim_start().starts_with("//") => {
            Url::parse(&format!("https:{}", destination.trim_start())).ok()?
        }
        Err(_) => return None,
    };

    match url.host_str() {
        Some(host) if !host.is_empty() => Some(url),
        _ => None,
    }
}

/// Lower-case a host and strip a single leading `www.`.
pub fn normalize_host(host: &str) -> String {
    let host = host.to_lowercase();
    match host.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => host,
    }
}

/// Normalized host of a destination URL.
pub fn destination_host(destination: &str) -> AffiliateResult<String> {
    parse_destination(destination)
        .and_then(|url| url.host_str().map(normalize_host))
        .ok_or_else(|| AffiliateError::UnparseableUrl(destination.to_string()))
}

/// First enabled merchant whose domains contain the destination host.
pub fn find_match<'a>(destination: &str, merchants: &'a MerchantTable) -> Option<&'a Merchant> {
    classify(destination, merchants).ok()
}

/// Like [`find_match`], but reports why nothing matched.
pub fn classify<'a>(destination: &str, merchants: &'a MerchantTable) -> AffiliateResult<&'a Merchant> {
    let host = destination_host(destination)?;

    let mut disabled: Option<&Merchant> = None;
    for merchant in merchants.iter().filter(|m| m.owns_host(&host)) {
        if merchant.enabled {
            return Ok(merchant);
        }
        if disabled.is_none() {
            disabled = Some(merchant);
        }
    }

    Err(match disabled {
        Some(merchant) => AffiliateError::MerchantDisabled {
            key: merchant.key.clone(),
            host,
        },
        None => AffiliateError::NoMerchantMatch(host),
    })
}
