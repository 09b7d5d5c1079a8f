//! Affiliate URL construction.
//!
//! # Responsibilities
//! - Split the destination into base URL and existing query parameters
//! - Assemble tracking parameters with URL-over-merchant precedence
//! - Encode and compose the network URL in a fixed parameter order
//!
//! # Design Decisions
//! - Parameters kept as an ordered list; order is part of the wire contract
//! - Repeated query keys resolve to the last occurrence
//! - A key present in the destination wins even when its value is empty
//! - Keys are emitted verbatim; only values are percent-encoded

use std::collections::HashMap;
use std::ops::RangeInclusive;

use url::{form_urlencoded, Url};

use crate::affiliate::error::{AffiliateError, AffiliateResult};
use crate::affiliate::matcher::parse_destination;
use crate::affiliate::page::RedirectPayload;
use crate::settings::model::{GlobalSettings, Merchant};

/// Click-through endpoint of the affiliate network.
pub const NETWORK_ENDPOINT: &str = "https://www.awin1.com/cread.php";

/// Numbered click-reference slots copied through from the destination.
pub const EXTRA_CLICK_REF_SLOTS: RangeInclusive<u8> = 2..=6;

/// Build the affiliate URL and the redirect page for a matched merchant.
pub fn build(
    destination: &str,
    merchant: &Merchant,
    globals: &GlobalSettings,
) -> AffiliateResult<RedirectPayload> {
    affiliate_url(destination, merchant, globals).map(RedirectPayload::new)
}

/// The network URL that attributes the click and lands on `destination`.
pub fn affiliate_url(
    destination: &str,
    merchant: &Merchant,
    globals: &GlobalSettings,
) -> AffiliateResult<String> {
    let url = parse_destination(destination)
        .ok_or_else(|| AffiliateError::InvalidUrl(destination.to_string()))?;

    let base = base_url(destination);
    let existing = existing_params(&url);
    let params = tracking_params(merchant, globals, &existing);

    Ok(compose(&params, &base))
}

/// Scheme, host and path of the destination as written; query, fragment,
/// port and userinfo are dropped. Only path separators are normalized.
fn base_url(destination: &str) -> String {
    let raw = destination.trim();
    let (scheme, rest) = match raw.split_once(':') {
        Some((scheme, rest)) if !raw.starts_with("//") => (scheme, rest),
        _ => ("https", raw),
    };

    // Special schemes accept `\` wherever `/` is allowed.
    let special = matches!(
        scheme.to_ascii_lowercase().as_str(),
        "http" | "https" | "ws" | "wss" | "ftp" | "file"
    );
    let is_separator = |c: char| c == '/' || (special && c == '\\');

    let rest = rest.trim_start_matches(is_separator);
    let authority_end = rest
        .find(|c: char| is_separator(c) || c == '?' || c == '#')
        .unwrap_or(rest.len());
    let (authority, tail) = rest.split_at(authority_end);
    let path = &tail[..tail.find(['?', '#']).unwrap_or(tail.len())];

    let host = authority.rsplit_once('@').map_or(authority, |(_, host)| host);
    let host = match host.rsplit_once(':') {
        Some((name, port)) if !host.ends_with(']') && port.bytes().all(|b| b.is_ascii_digit()) => name,
        _ => host,
    };

    if special {
        format!("{scheme}://{host}{}", path.replace('\\', "/"))
    } else {
        format!("{scheme}://{host}{path}")
    }
}

fn existing_params(url: &Url) -> HashMap<String, String> {
    url.query_pairs().into_owned().collect()
}

fn tracking_params(
    merchant: &Merchant,
    globals: &GlobalSettings,
    existing: &HashMap<String, String>,
) -> Vec<(String, String)> {
    let mut params = vec![
        ("awinmid".to_string(), merchant.network_merchant_id.clone()),
        ("awinaffid".to_string(), globals.affiliate_id.clone()),
    ];

    if let Some(campaign) = override_or_default(existing, "campaign", &merchant.campaign) {
        params.push(("campaign".to_string(), campaign));
    }
    if let Some(click_ref) = override_or_default(existing, "clickref", &merchant.click_ref) {
        params.push(("clickref".to_string(), click_ref));
    }

    for slot in EXTRA_CLICK_REF_SLOTS {
        let key = format!("clickref{slot}");
        if let Some(value) = existing.get(&key) {
            let value = value.clone();
            params.push((key, value));
        }
    }

    params
}

fn override_or_default(
    existing: &HashMap<String, String>,
    key: &str,
    merchant_default: &str,
) -> Option<String> {
    match existing.get(key) {
        Some(value) => Some(value.clone()),
        None if !merchant_default.is_empty() => Some(merchant_default.to_string()),
        None => None,
    }
}

fn compose(params: &[(String, String)], base: &str) -> String {
    let query = params
        .iter()
        .map(|(key, value)| format!("{key}={}", encode_component(value)))
        .chain(std::iter::once(format!("ued={}", encode_component(base))))
        .collect::<Vec<_>>()
        .join("&");

    format!("{NETWORK_ENDPOINT}?{query}")
}

/// Percent-encode a query value: alphanumerics and `-_.` pass through, space
/// becomes `+`, everything else is `%XX`.
pub fn encode_component(value: &str) -> String {
    form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('*', "%2A")
}
