use anyhow::{Context, Result};
use chrono::NaiveDate;
use sports_portal_generator::sitemap_for_host;
use std::fs;
use std::path::PathBuf;

use crate::settings::PortalSettings;

/// Generate the sitemap for `domain`, updating the lastmod store.
///
/// Writes to `output` when given, otherwise prints the XML to stdout.
pub async fn run(
    domain: String,
    settings: PortalSettings,
    output: Option<PathBuf>,
    date: Option<NaiveDate>,
) -> Result<()> {
    let today = date.unwrap_or_else(|| settings.today());

    let xml = sitemap_for_host(&settings.paths, &domain, today, &settings.timezone)
        .with_context(|| format!("Failed to generate sitemap for {}", domain))?;

    match output {
        Some(path) => {
            fs::write(&path, &xml)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("🗺  Sitemap for {} ({} URLs)", domain, xml.matches("<url>").count());
            println!("   Output: {}", path.display());
            println!("   Lastmod store: {}", settings.paths.lastmod_store().display());
        }
        None => print!("{}", xml),
    }

    Ok(())
}
