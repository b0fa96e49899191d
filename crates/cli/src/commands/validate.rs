use sports_portal_validator::validate_portal;

use crate::settings::PortalSettings;

pub async fn run(settings: PortalSettings) -> anyhow::Result<()> {
    println!("Validating portal config at: {}", settings.paths.config_dir.display());
    println!("   Games file: {}", settings.paths.data_file.display());
    println!();

    let report = validate_portal(&settings.paths);

    for line in &report.info {
        println!("ℹ {}", line);
    }
    for line in &report.warnings {
        println!("⚠ {}", line);
    }
    for line in &report.errors {
        println!("✗ {}", line);
    }

    println!();
    if !report.is_ok() {
        anyhow::bail!(
            "Validation failed with {} error(s) and {} warning(s)",
            report.errors.len(),
            report.warnings.len()
        );
    }

    println!("✓ Portal config valid ({} warning(s))", report.warnings.len());
    Ok(())
}
