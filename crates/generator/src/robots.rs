//! robots.txt generation.

use sports_portal_core::i18n::SUPPORTED_LANGUAGES;
use sports_portal_core::{DomainIndex, PortalPaths, Result, WebsiteEntry, load_registry};
use std::fmt::Write;
use tracing::info;

/// Language path prefixes the site does not serve
pub fn disallowed_language_paths(entry: &WebsiteEntry) -> Vec<String> {
    SUPPORTED_LANGUAGES
        .iter()
        .filter(|lang| !entry.serves_language(lang))
        .map(|lang| format!("/{}/", lang))
        .collect()
}

/// Render robots.txt for one site
pub fn render_robots(entry: &WebsiteEntry) -> String {
    let mut out = String::from("User-agent: *\nAllow: /\n");
    for path in disallowed_language_paths(entry) {
        let _ = writeln!(out, "Disallow: {path}");
    }
    let _ = writeln!(out, "\nSitemap: {}/sitemap.xml", entry.base_url());
    out
}

/// Resolve `host` against the registry and render its robots.txt
pub fn robots_for_host(paths: &PortalPaths, host: &str) -> Result<String> {
    let index = DomainIndex::new(load_registry(paths.registry())?);
    let entry = index.resolve(host)?;
    info!(domain = %entry.domain, "Generating robots.txt");
    Ok(render_robots(entry))
}
