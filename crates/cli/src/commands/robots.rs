use anyhow::{Context, Result};
use sports_portal_generator::robots_for_host;
use std::fs;
use std::path::PathBuf;

use crate::settings::PortalSettings;

pub async fn run(domain: String, settings: PortalSettings, output: Option<PathBuf>) -> Result<()> {
    let robots = robots_for_host(&settings.paths, &domain)
        .with_context(|| format!("Failed to generate robots.txt for {}", domain))?;

    match output {
        Some(path) => {
            fs::write(&path, &robots)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("🤖 robots.txt for {}", domain);
            println!("   Output: {}", path.display());
        }
        None => print!("{}", robots),
    }

    Ok(())
}
