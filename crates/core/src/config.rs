use crate::domain::normalize_domain;
use crate::error::{Error, Result};
use crate::types::*;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const REGISTRY_FILE: &str = "websites.json";
pub const LASTMOD_FILE: &str = "sitemap-lastmod.json";
pub const SITES_DIR: &str = "sites";

/// Locations of every file the portal reads or writes
#[derive(Debug, Clone)]
pub struct PortalPaths {
    pub config_dir: PathBuf,
    pub data_file: PathBuf,
}

impl PortalPaths {
    pub fn new(config_dir: impl Into<PathBuf>, data_file: impl Into<PathBuf>) -> Self {
        Self {
            config_dir: config_dir.into(),
            data_file: data_file.into(),
        }
    }

    pub fn registry(&self) -> PathBuf {
        self.config_dir.join(REGISTRY_FILE)
    }

    pub fn lastmod_store(&self) -> PathBuf {
        self.config_dir.join(LASTMOD_FILE)
    }

    pub fn sites_dir(&self) -> PathBuf {
        self.config_dir.join(SITES_DIR)
    }

    /// `config/sites/<normalized domain>.toml`
    pub fn site_config(&self, domain: &str) -> PathBuf {
        self.sites_dir()
            .join(format!("{}.toml", normalize_domain(domain)))
    }
}

/// Raw websites.json structure
#[derive(Debug, Deserialize)]
struct RawRegistry {
    #[serde(default)]
    websites: Vec<WebsiteEntry>,
}

/// Load the website registry from a file path
pub fn load_registry<P: AsRef<Path>>(path: P) -> Result<Vec<WebsiteEntry>> {
    let content = fs::read_to_string(path)?;
    parse_registry_str(&content)
}

/// Parse the website registry from a string.
///
/// Language codes are trimmed and lowercased so every later comparison is exact.
pub fn parse_registry_str(content: &str) -> Result<Vec<WebsiteEntry>> {
    let mut raw: RawRegistry = serde_json::from_str(content)?;
    for site in &mut raw.websites {
        for lang in &mut site.languages {
            *lang = lang.trim().to_ascii_lowercase();
        }
    }
    Ok(raw.websites)
}

/// Load the shared games file
pub fn load_game_data<P: AsRef<Path>>(path: P) -> Result<GameData> {
    let content = fs::read_to_string(path)?;
    parse_game_data_str(&content)
}

pub fn parse_game_data_str(content: &str) -> Result<GameData> {
    Ok(serde_json::from_str(content)?)
}

/// Raw TOML structure of a per-domain site file
#[derive(Debug, Deserialize)]
struct RawSiteConfig {
    site: RawSite,
    seo: RawSeo,
}

#[derive(Debug, Deserialize)]
struct RawSite {
    name: String,
    tagline: Option<String>,
    accent_color: Option<String>,
    logo: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawSeo {
    title: Option<String>,
    description: String,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    localized: HashMap<String, LocalizedSeo>,
}

const DEFAULT_ACCENT: &str = "#e63946";

/// Load `config/sites/<domain>.toml`
pub fn load_site_config(paths: &PortalPaths, domain: &str) -> Result<SiteConfig> {
    let content = fs::read_to_string(paths.site_config(domain))?;
    parse_site_config_str(&content)
}

/// Parse a site file from a string (useful for testing)
pub fn parse_site_config_str(content: &str) -> Result<SiteConfig> {
    let raw: RawSiteConfig = toml::from_str(content)?;

    if raw.site.name.trim().is_empty() {
        return Err(Error::ConfigParse("site.name must not be empty".to_string()));
    }

    let accent_color = match raw.site.accent_color {
        Some(color) => validate_color(&color)?,
        None => DEFAULT_ACCENT.to_string(),
    };

    let logo = match raw.site.logo {
        Some(logo) => Some(validate_asset_path(&logo, "site.logo")?),
        None => None,
    };

    let title = raw.seo.title.unwrap_or_else(|| raw.site.name.clone());

    Ok(SiteConfig {
        site: SiteBranding {
            name: raw.site.name,
            tagline: raw.site.tagline,
            accent_color,
            logo,
        },
        seo: SeoConfig {
            title,
            description: raw.seo.description,
            keywords: raw.seo.keywords,
            localized: raw.seo.localized,
        },
    })
}

/// Accept `#rgb` or `#rrggbb` colors only; the value lands inside a `<style>` block.
fn validate_color(color: &str) -> Result<String> {
    let color = color.trim();
    let valid = color
        .strip_prefix('#')
        .map(|hex| (hex.len() == 3 || hex.len() == 6) && hex.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false);

    if !valid {
        return Err(Error::ConfigParse(format!(
            "Invalid accent_color '{}', expected #rgb or #rrggbb",
            color
        )));
    }
    Ok(color.to_string())
}

/// Validate an asset path relative to the public directory.
///
/// Rejects absolute paths, `..` components and empty values so a site file
/// cannot point the page at anything outside `/static/`.
fn validate_asset_path(path_str: &str, field_name: &str) -> Result<String> {
    if path_str.trim().is_empty() {
        return Err(Error::ConfigParse(format!(
            "Empty path in '{}' field",
            field_name
        )));
    }

    let path = Path::new(path_str);

    if path.is_absolute() || path_str.starts_with('/') {
        return Err(Error::ConfigParse(format!(
            "Absolute paths not allowed in '{}': '{}'. Use relative paths only.",
            field_name, path_str
        )));
    }

    for component in path.components() {
        if component == std::path::Component::ParentDir {
            return Err(Error::ConfigParse(format!(
                "Parent directory references (..) not allowed in '{}': '{}'",
                field_name, path_str
            )));
        }
    }

    Ok(path_str.to_string())
}
