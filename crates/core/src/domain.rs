use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::types::WebsiteEntry;

/// Normalize a domain or host value for registry lookup.
///
/// Trims whitespace, lowercases, and strips a single leading `www.`.
pub fn normalize_domain(domain: &str) -> String {
    let lowered = domain.trim().to_lowercase();
    match lowered.strip_prefix("www.") {
        Some(rest) => rest.to_string(),
        None => lowered,
    }
}

/// Normalize a `Host` header value, dropping any `:port` suffix.
pub fn normalize_host(host: &str) -> String {
    let host = host.trim();
    let without_port = match host.rsplit_once(':') {
        Some((name, port)) if !port.is_empty() && port.chars().all(|c| c.is_ascii_digit()) => {
            name
        }
        _ => host,
    };
    normalize_domain(without_port)
}

/// Active registry entries keyed by normalized domain.
///
/// When several active entries share a normalized domain, the first one in
/// registry order wins.
#[derive(Debug, Default)]
pub struct DomainIndex {
    sites: HashMap<String, WebsiteEntry>,
}

impl DomainIndex {
    pub fn new(entries: impl IntoIterator<Item = WebsiteEntry>) -> Self {
        let mut sites = HashMap::new();
        for entry in entries.into_iter().filter(WebsiteEntry::is_active) {
            sites
                .entry(normalize_domain(&entry.domain))
                .or_insert(entry);
        }
        Self { sites }
    }

    pub fn get(&self, host: &str) -> Option<&WebsiteEntry> {
        self.sites.get(&normalize_host(host))
    }

    /// Like [`DomainIndex::get`], but reports unmatched hosts as an error
    pub fn resolve(&self, host: &str) -> Result<&WebsiteEntry> {
        self.get(host)
            .ok_or_else(|| Error::UnknownDomain(normalize_host(host)))
    }

    pub fn len(&self) -> usize {
        self.sites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sites.is_empty()
    }
}
