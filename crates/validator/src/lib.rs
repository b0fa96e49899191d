//! Offline consistency checks over the registry, site files and games file.

use sports_portal_core::config::parse_site_config_str;
use sports_portal_core::i18n::is_supported;
use sports_portal_core::{GameData, PortalPaths, WebsiteEntry, load_game_data, load_registry, normalize_domain};
use sports_portal_generator::LastmodStore;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

#[derive(Debug, Default)]
pub struct ValidationReport {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub info: Vec<String>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Validate every file the portal reads
pub fn validate_portal(paths: &PortalPaths) -> ValidationReport {
    let mut report = ValidationReport::default();

    let sites = match load_registry(paths.registry()) {
        Ok(sites) => sites,
        Err(e) => {
            report
                .errors
                .push(format!("{}: {}", paths.registry().display(), e));
            return report;
        }
    };

    let active = sites.iter().filter(|s| s.is_active()).count();
    report.info.push(format!(
        "{} websites configured ({} active)",
        sites.len(),
        active
    ));

    check_registry(&sites, &mut report);
    check_site_configs(paths, &sites, &mut report);

    // A store that fails to parse blocks sitemap generation until repaired
    if let Err(e) = LastmodStore::load(paths.lastmod_store()) {
        report.errors.push(e.to_string());
    }

    match load_game_data(&paths.data_file) {
        Ok(games) => check_games(&games, &sites, &mut report),
        Err(e) => report
            .errors
            .push(format!("{}: {}", paths.data_file.display(), e)),
    }

    report
}

fn check_registry(sites: &[WebsiteEntry], report: &mut ValidationReport) {
    let mut active_domains: HashMap<String, usize> = HashMap::new();

    for (idx, site) in sites.iter().enumerate() {
        let domain = normalize_domain(&site.domain);
        if domain.is_empty() {
            report
                .errors
                .push(format!("websites[{}]: empty domain", idx));
            continue;
        }

        if site.is_active() {
            if let Some(first) = active_domains.get(&domain) {
                report.errors.push(format!(
                    "websites[{}]: '{}' duplicates active websites[{}]; only the first is served",
                    idx, domain, first
                ));
            } else {
                active_domains.insert(domain.clone(), idx);
            }

            if site.sports_categories.is_empty() {
                report
                    .warnings
                    .push(format!("{}: no sports_categories enabled", domain));
            }
        }

        for lang in &site.languages {
            if !is_supported(lang) {
                report
                    .errors
                    .push(format!("{}: unsupported language '{}'", domain, lang));
            }
        }

        for sport in repeated(&site.sports_categories) {
            report
                .warnings
                .push(format!("{}: sport '{}' listed more than once", domain, sport));
        }
        for lang in repeated(&site.languages) {
            report
                .warnings
                .push(format!("{}: language '{}' listed more than once", domain, lang));
        }

        for sport in site.sports_icons.keys() {
            if !site.has_sport(sport) {
                report.warnings.push(format!(
                    "{}: icon configured for '{}', which is not in sports_categories",
                    domain, sport
                ));
            }
        }
    }
}

/// Values appearing more than once, each reported once in first-seen order
fn repeated(values: &[String]) -> Vec<&str> {
    let mut seen = HashSet::new();
    let mut dups = Vec::new();
    for value in values {
        if !seen.insert(value.as_str()) && !dups.contains(&value.as_str()) {
            dups.push(value.as_str());
        }
    }
    dups
}

fn check_site_configs(paths: &PortalPaths, sites: &[WebsiteEntry], report: &mut ValidationReport) {
    let known: HashSet<String> = sites.iter().map(|s| normalize_domain(&s.domain)).collect();

    for site in sites.iter().filter(|s| s.is_active()) {
        let path = paths.site_config(&site.domain);
        if !path.exists() {
            report.errors.push(format!(
                "{}: site config not found at {}",
                normalize_domain(&site.domain),
                path.display()
            ));
        }
    }

    let sites_dir = paths.sites_dir();
    if !sites_dir.exists() {
        return;
    }

    for entry in WalkDir::new(&sites_dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("toml") {
            continue;
        }
        debug!(path = %path.display(), "Checking site config");
        check_site_file(path, &known, report);
    }
}

fn check_site_file(path: &Path, known: &HashSet<String>, report: &mut ValidationReport) {
    let Some(domain) = path.file_stem().and_then(|s| s.to_str()) else {
        return;
    };

    if !known.contains(domain) {
        report.warnings.push(format!(
            "{}: no registry entry for '{}'",
            path.display(),
            domain
        ));
    }

    match std::fs::read_to_string(path) {
        Ok(content) => {
            if let Err(e) = parse_site_config_str(&content) {
                report.errors.push(format!("{}: {}", path.display(), e));
            }
        }
        Err(e) => report.errors.push(format!("{}: {}", path.display(), e)),
    }
}

fn check_games(games: &GameData, sites: &[WebsiteEntry], report: &mut ValidationReport) {
    report
        .info
        .push(format!("{} games in data file", games.games.len()));

    let mut seen_ids = HashSet::new();
    let mut orphan_sports = HashSet::new();

    for game in &games.games {
        if !seen_ids.insert(game.id.as_str()) {
            report
                .warnings
                .push(format!("game '{}': duplicate id, links lookups use the first", game.id));
        }
        if game.links.is_empty() {
            report
                .warnings
                .push(format!("game '{}': no stream links", game.id));
        }
        let enabled = sites
            .iter()
            .any(|s| s.is_active() && s.has_sport(&game.sport));
        if !enabled && orphan_sports.insert(game.sport.to_lowercase()) {
            report.warnings.push(format!(
                "sport '{}' has games but is enabled on no active website",
                game.sport
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const SITE_TOML: &str = "[site]\nname = \"Example\"\n\n[seo]\ndescription = \"d\"\n";

    fn portal(registry: &str, games: &str) -> (tempfile::TempDir, PortalPaths) {
        let dir = tempfile::tempdir().unwrap();
        let paths = PortalPaths::new(dir.path().join("config"), dir.path().join("data.json"));
        fs::create_dir_all(paths.sites_dir()).unwrap();
        fs::write(paths.registry(), registry).unwrap();
        fs::write(&paths.data_file, games).unwrap();
        (dir, paths)
    }

    #[test]
    fn test_valid_portal() {
        let (_dir, paths) = portal(
            r#"{"websites": [{"domain": "example.com", "status": "active",
                "sports_categories": ["football"], "languages": ["en", "es"]}]}"#,
            r#"{"games": [{"id": 1, "sport": "football", "home_team": "A", "away_team": "B",
                "start_time": "2026-10-18T10:00:00Z", "links": [{"type": "hd", "link": "x"}]}]}"#,
        );
        fs::write(paths.site_config("example.com"), SITE_TOML).unwrap();

        let report = validate_portal(&paths);
        assert!(report.is_ok(), "{:?}", report.errors);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
        assert_eq!(report.info.len(), 2);
    }

    #[test]
    fn test_missing_registry_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PortalPaths::new(dir.path(), dir.path().join("data.json"));
        let report = validate_portal(&paths);
        assert_eq!(report.errors.len(), 1);
        assert!(report.info.is_empty());
    }

    #[test]
    fn test_duplicate_active_domains_reported() {
        let (_dir, paths) = portal(
            r#"{"websites": [
                {"domain": "www.example.com", "status": "active", "sports_categories": ["football"]},
                {"domain": "Example.com", "status": "active", "sports_categories": ["football"]},
                {"domain": "example.com", "status": "inactive"}
            ]}"#,
            r#"{"games": []}"#,
        );
        fs::write(paths.site_config("example.com"), SITE_TOML).unwrap();

        let report = validate_portal(&paths);
        let dupes: Vec<_> = report
            .errors
            .iter()
            .filter(|e| e.contains("duplicates"))
            .collect();
        assert_eq!(dupes.len(), 1);
        assert!(dupes[0].starts_with("websites[1]"));
    }

    #[test]
    fn test_config_problems_reported() {
        let (_dir, paths) = portal(
            r#"{"websites": [{"domain": "example.com", "status": "active",
                "sports_categories": ["football"], "sports_icons": {"golf": "golf.svg"},
                "languages": ["en", "xx"]}]}"#,
            r#"{"games": [{"id": "g", "sport": "curling", "home_team": "A", "away_team": "B",
                "start_time": "2026-10-18T10:00:00Z"}]}"#,
        );
        fs::write(paths.sites_dir().join("orphan.net.toml"), "[site]\nname = \"\"\n[seo]\ndescription = \"d\"\n").unwrap();

        let report = validate_portal(&paths);
        let all = |v: &[String], needle: &str| v.iter().any(|m| m.contains(needle));
        assert!(all(&report.errors, "unsupported language 'xx'"));
        assert!(all(&report.errors, "site config not found"));
        assert!(all(&report.errors, "site.name must not be empty"));
        assert!(all(&report.warnings, "icon configured for 'golf'"));
        assert!(all(&report.warnings, "no registry entry for 'orphan.net'"));
        assert!(all(&report.warnings, "no stream links"));
        assert!(all(&report.warnings, "sport 'curling'"));
    }

    #[test]
    fn test_repeated_sports_and_languages_warned() {
        let (_dir, paths) = portal(
            r#"{"websites": [{"domain": "example.com", "status": "active",
                "sports_categories": ["football", "tennis", "football"],
                "languages": ["en", "es", "ES"]}]}"#,
            r#"{"games": []}"#,
        );
        fs::write(paths.site_config("example.com"), SITE_TOML).unwrap();

        let report = validate_portal(&paths);
        assert!(report.is_ok(), "{:?}", report.errors);
        assert_eq!(
            report.warnings,
            vec![
                "example.com: sport 'football' listed more than once".to_string(),
                "example.com: language 'es' listed more than once".to_string(),
            ]
        );
    }

    #[test]
    fn test_unreadable_lastmod_store_reported() {
        let (_dir, paths) = portal(
            r#"{"websites": [{"domain": "example.com", "status": "active", "sports_categories": ["football"]}]}"#,
            r#"{"games": []}"#,
        );
        fs::write(paths.site_config("example.com"), SITE_TOML).unwrap();
        fs::write(paths.lastmod_store(), "{\"https://www.example.com/\": ").unwrap();

        let report = validate_portal(&paths);
        assert!(report.errors.iter().any(|e| e.contains("Lastmod store")), "{:?}", report.errors);
    }
}
