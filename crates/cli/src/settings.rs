use anyhow::{Result, anyhow};
use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use clap::Args;
use sports_portal_core::PortalPaths;
use sports_portal_generator::listing::DEFAULT_PAGE_SIZE;
use std::path::PathBuf;

/// File locations and timezone shared by every command
#[derive(Debug, Clone, Args)]
pub struct PortalArgs {
    /// Directory holding websites.json, sitemap-lastmod.json and sites/
    #[arg(long, env = "PORTAL_CONFIG_DIR", default_value = "config")]
    pub config_dir: PathBuf,

    /// Shared games file
    #[arg(long, env = "PORTAL_DATA_FILE", default_value = "data.json")]
    pub data_file: PathBuf,

    /// Directory served under /static (sport icons, logos)
    #[arg(long, env = "PORTAL_PUBLIC_DIR", default_value = "public")]
    pub public_dir: PathBuf,

    /// IANA timezone deciding what "today" means
    #[arg(long, env = "PORTAL_TIMEZONE", default_value = "UTC")]
    pub timezone: String,
}

impl PortalArgs {
    pub fn resolve(self) -> Result<PortalSettings> {
        let timezone: Tz = self
            .timezone
            .parse()
            .map_err(|e| anyhow!("Invalid timezone '{}': {}", self.timezone, e))?;

        Ok(PortalSettings {
            paths: PortalPaths::new(self.config_dir, self.data_file),
            public_dir: self.public_dir,
            timezone,
            page_size: DEFAULT_PAGE_SIZE,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PortalSettings {
    pub paths: PortalPaths,
    pub public_dir: PathBuf,
    pub timezone: Tz,
    pub page_size: usize,
}

impl PortalSettings {
    /// Current calendar date in the portal's timezone
    pub fn today(&self) -> NaiveDate {
        Utc::now().with_timezone(&self.timezone).date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(timezone: &str) -> PortalArgs {
        PortalArgs {
            config_dir: "config".into(),
            data_file: "data.json".into(),
            public_dir: "public".into(),
            timezone: timezone.into(),
        }
    }

    #[test]
    fn test_resolve_valid_timezone() {
        let settings = args("Europe/Madrid").resolve().unwrap();
        assert_eq!(settings.timezone, chrono_tz::Europe::Madrid);
        assert_eq!(settings.paths.registry(), PathBuf::from("config/websites.json"));
        assert_eq!(settings.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn test_resolve_rejects_unknown_timezone() {
        let err = args("Mars/Olympus").resolve().unwrap_err();
        assert!(err.to_string().contains("Mars/Olympus"));
    }
}
