//! Affiliate settings record.
//!
//! # Responsibilities
//! - Define the typed `GlobalSettings` / `Merchant` record
//! - Normalize merchant domains on every construction path
//! - Provide the default record and the merchant edit operations
//!
//! # Design Decisions
//! - The merchant table keeps insertion order; it serializes as a JSON object
//!   keyed by merchant key, with the key stripped from the body
//! - Legacy field names (`awinaffid`, `awinmid`, `clickref`) are accepted on read
//! - Domains are normalized at the boundary so matching is plain string equality

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Fixed key under which the settings record is persisted.
pub const SETTINGS_KEY: &str = "awin_affiliate_settings";

/// Network-wide affiliate settings plus the merchant table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlobalSettings {
    /// Publisher identifier within the affiliate network.
    #[serde(alias = "awinaffid")]
    pub affiliate_id: String,

    /// Reserved fallback campaign (not used by merchant logic).
    pub default_campaign: String,

    /// Reserved fallback click reference (not used by merchant logic).
    #[serde(alias = "default_clickref")]
    pub default_click_ref: String,

    /// Merchants keyed by slug, in insertion order.
    pub merchants: MerchantTable,
}

impl GlobalSettings {
    /// The record written on first start: empty ids and one preconfigured merchant.
    pub fn default_record() -> Self {
        let mut merchants = MerchantTable::default();
        merchants.insert(
            Merchant::new("coolblue", "Coolblue", "").with_domains([
                "coolblue.nl",
                "coolblue.be",
                "coolblue.de",
                "coolblue.fr",
            ]),
        );

        Self {
            merchants,
            ..Self::default()
        }
    }

    /// Add a merchant from an admin draft. An existing merchant with the same
    /// slug is replaced.
    pub fn add_merchant(&mut self, draft: MerchantDraft) -> Result<&Merchant, MerchantEditError> {
        let merchant = draft.into_merchant()?;
        let key = merchant.key.clone();
        self.merchants.insert(merchant);
        self.merchants
            .get(&key)
            .ok_or(MerchantEditError::UnknownMerchant(key))
    }

    /// Apply a partial update to an existing merchant.
    pub fn update_merchant(
        &mut self,
        key: &str,
        update: MerchantUpdate,
    ) -> Result<&Merchant, MerchantEditError> {
        let merchant = self
            .merchants
            .get_mut(key)
            .ok_or_else(|| MerchantEditError::UnknownMerchant(key.to_string()))?;
        merchant.apply(update);
        Ok(&*merchant)
    }
}

/// A retailer enrolled in the affiliate network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Merchant {
    /// Stable slug; carried by the table key, not the serialized body.
    #[serde(skip)]
    pub key: String,

    /// Display label.
    pub name: String,

    /// Merchant id within the network (`awinmid`).
    #[serde(alias = "awinmid")]
    pub network_merchant_id: String,

    /// Default campaign, used when the destination carries none.
    pub campaign: String,

    /// Default primary click reference.
    #[serde(alias = "clickref")]
    pub click_ref: String,

    /// Normalized hostnames owned by this merchant.
    #[serde(deserialize_with = "deserialize_domains")]
    pub domains: Vec<String>,

    /// Disabled merchants never match.
    pub enabled: bool,
}

impl Default for Merchant {
    fn default() -> Self {
        Self {
            key: String::new(),
            name: String::new(),
            network_merchant_id: String::new(),
            campaign: String::new(),
            click_ref: String::new(),
            domains: Vec::new(),
            enabled: true,
        }
    }
}

impl Merchant {
    /// Create an enabled merchant with no domains or defaults.
    pub fn new(
        key: impl Into<String>,
        name: impl Into<String>,
        network_merchant_id: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            name: name.into(),
            network_merchant_id: network_merchant_id.into(),
            ..Self::default()
        }
    }

    pub fn with_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.domains = normalize_domains(domains);
        self
    }

    pub fn with_campaign(mut self, campaign: impl Into<String>) -> Self {
        self.campaign = campaign.into();
        self
    }

    pub fn with_click_ref(mut self, click_ref: impl Into<String>) -> Self {
        self.click_ref = click_ref.into();
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Exact membership test against an already normalized host.
    pub fn owns_host(&self, host: &str) -> bool {
        self.domains.iter().any(|domain| domain == host)
    }

    fn apply(&mut self, update: MerchantUpdate) {
        if let Some(enabled) = update.enabled {
            self.enabled = enabled;
        }
        if let Some(id) = update.network_merchant_id {
            self.network_merchant_id = id;
        }
        if let Some(campaign) = update.campaign {
            self.campaign = campaign;
        }
        if let Some(click_ref) = update.click_ref {
            self.click_ref = click_ref;
        }
        if let Some(domains) = update.domains {
            self.domains = normalize_domains(domains);
        }
    }
}

/// Ordered merchant table with unique keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MerchantTable {
    entries: Vec<Merchant>,
}

impl MerchantTable {
    /// Insert a merchant, replacing any entry with the same key in place.
    pub fn insert(&mut self, merchant: Merchant) {
        match self.entries.iter().position(|m| m.key == merchant.key) {
            Some(index) => self.entries[index] = merchant,
            None => self.entries.push(merchant),
        }
    }

    pub fn get(&self, key: &str) -> Option<&Merchant> {
        self.entries.iter().find(|m| m.key == key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Merchant> {
        self.entries.iter_mut().find(|m| m.key == key)
    }

    /// Merchants in table order.
    pub fn iter(&self) -> impl Iterator<Item = &Merchant> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<Merchant> for MerchantTable {
    fn from_iter<I: IntoIterator<Item = Merchant>>(iter: I) -> Self {
        let mut table = Self::default();
        for merchant in iter {
            table.insert(merchant);
        }
        table
    }
}

impl Serialize for MerchantTable {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for merchant in &self.entries {
            map.serialize_entry(&merchant.key, merchant)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for MerchantTable {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct TableVisitor;

        impl<'de> Visitor<'de> for TableVisitor {
            type Value = MerchantTable;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of merchant key to merchant")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut table = MerchantTable::default();
                while let Some((key, mut merchant)) = access.next_entry::<String, Merchant>()? {
                    merchant.key = key;
                    table.insert(merchant);
                }
                Ok(table)
            }
        }

        deserializer.deserialize_map(TableVisitor)
    }
}

/// Admin input for a new merchant.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MerchantDraft {
    pub name: String,
    pub network_merchant_id: String,
    pub campaign: String,
    pub click_ref: String,
    /// A list, or one domain per line.
    #[serde(deserialize_with = "deserialize_domain_input")]
    pub domains: Vec<String>,
}

impl MerchantDraft {
    /// Validate the draft and turn it into an enabled merchant keyed by the
    /// slug of its name.
    pub fn into_merchant(self) -> Result<Merchant, MerchantEditError> {
        if self.name.trim().is_empty() {
            return Err(MerchantEditError::MissingName);
        }
        if self.network_merchant_id.trim().is_empty() {
            return Err(MerchantEditError::MissingNetworkMerchantId);
        }
        let key = slugify(&self.name);
        if key.is_empty() {
            return Err(MerchantEditError::EmptySlug(self.name));
        }

        Ok(Merchant::new(key, self.name.trim(), self.network_merchant_id.trim())
            .with_campaign(self.campaign.trim())
            .with_click_ref(self.click_ref.trim())
            .with_domains(self.domains))
    }
}

/// Partial update of an existing merchant; absent fields are left unchanged.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct MerchantUpdate {
    pub enabled: Option<bool>,
    pub network_merchant_id: Option<String>,
    pub campaign: Option<String>,
    pub click_ref: Option<String>,
    /// A list, or one domain per line.
    #[serde(deserialize_with = "deserialize_optional_domain_input")]
    pub domains: Option<Vec<String>>,
}

/// Rejected merchant edits.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MerchantEditError {
    #[error("merchant name is required")]
    MissingName,

    #[error("network merchant id is required")]
    MissingNetworkMerchantId,

    #[error("merchant name {0:?} does not produce a usable key")]
    EmptySlug(String),

    #[error("unknown merchant: {0}")]
    UnknownMerchant(String),
}

/// Normalize a configured domain to a bare, lower-case hostname without a
/// leading `www.`. Returns `None` for entries that contain no usable host.
pub fn normalize_domain(raw: &str) -> Option<String> {
    let lowered = raw.trim().to_lowercase();
    let mut host = match lowered.find("://") {
        Some(idx) => &lowered[idx + 3..],
        None => lowered.as_str(),
    };
    if let Some(end) = host.find(['/', '?', '#']) {
        host = &host[..end];
    }
    if let Some((_, after_userinfo)) = host.rsplit_once('@') {
        host = after_userinfo;
    }
    if let Some((name, port)) = host.rsplit_once(':') {
        if !port.is_empty() && port.bytes().all(|b| b.is_ascii_digit()) {
            host = name;
        }
    }
    let host = host.strip_prefix("www.").unwrap_or(host);
    if host.is_empty() {
        return None;
    }

    // IDNA-encode so configured domains compare equal to parsed URL hosts.
    url::Host::parse(host).ok().map(|parsed| parsed.to_string())
}

/// Normalize a list of domains, dropping empties and duplicates while keeping
/// the first position of each.
pub fn normalize_domains<I, S>(domains: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut normalized: Vec<String> = Vec::new();
    for domain in domains {
        if let Some(host) = normalize_domain(domain.as_ref()) {
            if !normalized.contains(&host) {
                normalized.push(host);
            }
        }
    }
    normalized
}

/// Split an admin textarea value into domains, one per line.
pub fn parse_domain_lines(text: &str) -> Vec<String> {
    normalize_domains(text.lines())
}

/// Lower-case ASCII slug; runs of other characters collapse to a single `-`.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for ch in name.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Admin domain input: a JSON list or a textarea value.
#[derive(Deserialize)]
#[serde(untagged)]
enum DomainInput {
    List(Vec<String>),
    Lines(String),
}

impl DomainInput {
    fn into_domains(self) -> Vec<String> {
        match self {
            DomainInput::List(domains) => normalize_domains(domains),
            DomainInput::Lines(text) => parse_domain_lines(&text),
        }
    }
}

fn deserialize_domain_input<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    DomainInput::deserialize(deserializer).map(DomainInput::into_domains)
}

fn deserialize_optional_domain_input<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<Vec<String>>, D::Error> {
    Option::<DomainInput>::deserialize(deserializer).map(|input| input.map(DomainInput::into_domains))
}

fn deserialize_domains<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let raw = Vec::<String>::deserialize(deserializer)?;
    Ok(normalize_domains(raw))
}
