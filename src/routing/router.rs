//! Short code lookup.
//!
//! # Responsibilities
//! - Store parsed link destinations
//! - Look up the destination for a short code
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) lookup via HashMap
//! - Destinations keep both the configured text and the parsed URL: the text
//!   feeds the affiliate rewrite, the URL is header-safe for redirects

use std::collections::{BTreeMap, HashMap};

use url::Url;

/// A configured link destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    /// The destination exactly as configured (surrounding whitespace trimmed).
    pub written: String,
    pub url: Url,
}

/// Immutable mapping from short code to destination.
#[derive(Debug, Clone, Default)]
pub struct LinkTable {
    links: HashMap<String, Destination>,
}

impl LinkTable {
    /// Build the table from config. Entries whose destination does not parse
    /// are skipped and logged; validation normally rejects them earlier.
    pub fn from_config(links: &BTreeMap<String, String>) -> Self {
        let mut table = HashMap::with_capacity(links.len());
        for (code, destination) in links {
            match Url::parse(destination) {
                Ok(url) => {
                    let written = destination.trim().to_string();
                    table.insert(code.clone(), Destination { written, url });
                }
                Err(e) => {
                    tracing::warn!(code = %code, destination = %destination, error = %e, "Skipping link with invalid destination");
                }
            }
        }

        tracing::info!(links = table.len(), "Link table compiled");
        Self { links: table }
    }

    /// Destination for `code`, if known.
    pub fn resolve(&self, code: &str) -> Option<&Destination> {
        self.links.get(code)
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve() {
        let mut links = BTreeMap::new();
        links.insert("deal".to_string(), "https://coolblue.nl/p?clickref=a".to_string());
        links.insert("broken".to_string(), "not a url".to_string());
        links.insert("upper".to_string(), " https://Shop.NL/A/../B ".to_string());

        let table = LinkTable::from_config(&links);
        assert_eq!(table.len(), 2);
        assert_eq!(
            table.resolve("deal").map(|d| d.url.as_str()),
            Some("https://coolblue.nl/p?clickref=a")
        );

        let upper = table.resolve("upper").unwrap();
        assert_eq!(upper.written, "https://Shop.NL/A/../B");
        assert_eq!(upper.url.as_str(), "https://shop.nl/B");
        assert!(table.resolve("broken").is_none());
        assert!(table.resolve("DEAL").is_none());
    }
}
