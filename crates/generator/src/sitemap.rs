use chrono::NaiveDate;
use chrono_tz::Tz;
use sports_portal_core::{DomainIndex, GameData, PortalPaths, Result, WebsiteEntry, load_game_data, load_registry};
use std::collections::HashSet;
use std::fmt::Write;
use tracing::{info, warn};

use crate::escape::xml_escape;
use crate::lastmod::LastmodStore;

/// Category of a sitemap URL, which fixes its priority
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UrlKind {
    Home,
    Sport,
    Language,
}

impl UrlKind {
    pub fn priority(self) -> f64 {
        match self {
            UrlKind::Home => 1.0,
            UrlKind::Sport => 0.8,
            UrlKind::Language => 0.6,
        }
    }
}

/// A URL the sitemap will list, before its lastmod is known
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub loc: String,
    pub kind: UrlKind,
    /// Sport backing a sport page; `None` for pages covering every sport
    pub sport: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SitemapUrl {
    pub loc: String,
    pub lastmod: NaiveDate,
    pub priority: f64,
}

/// Path of a sport landing page
pub fn sport_path(sport: &str) -> String {
    format!("/live-{}", sport)
}

/// Every URL a site exposes: home, one page per sport, one per extra language.
///
/// Repeated sports or languages in the registry yield a single URL.
pub fn candidate_urls(entry: &WebsiteEntry) -> Vec<Candidate> {
    let base = entry.base_url();
    let mut seen = HashSet::new();
    let mut urls = Vec::with_capacity(1 + entry.sports_categories.len() + entry.languages.len());
    let mut push = |candidate: Candidate| {
        if seen.insert(candidate.loc.clone()) {
            urls.push(candidate);
        }
    };

    push(Candidate {
        loc: format!("{}/", base),
        kind: UrlKind::Home,
        sport: None,
    });

    for sport in &entry.sports_categories {
        push(Candidate {
            loc: format!("{}{}", base, sport_path(sport)),
            kind: UrlKind::Sport,
            sport: Some(sport.clone()),
        });
    }

    for lang in entry.language_variants() {
        push(Candidate {
            loc: format!("{}/{}/", base, lang),
            kind: UrlKind::Language,
            sport: None,
        });
    }

    urls
}

/// Resolve lastmod for every candidate URL of `entry`, recording the results in `store`.
///
/// The store is only mutated in memory; the caller flushes it.
pub fn generate_sitemap(
    entry: &WebsiteEntry,
    games: &GameData,
    store: &mut LastmodStore,
    today: NaiveDate,
    tz: &Tz,
) -> Vec<SitemapUrl> {
    let fresh_sports: HashSet<&str> = entry
        .sports_categories
        .iter()
        .map(String::as_str)
        .filter(|sport| games.sport_has_current_games(sport, today, tz))
        .collect();
    let any_fresh = !fresh_sports.is_empty();

    candidate_urls(entry)
        .into_iter()
        .map(|candidate| {
            let fresh = match &candidate.sport {
                Some(sport) => fresh_sports.contains(sport.as_str()),
                None => any_fresh,
            };
            let priority = candidate.kind.priority();
            let lastmod = store.update(&candidate.loc, fresh, today, priority);
            SitemapUrl {
                loc: candidate.loc,
                lastmod,
                priority,
            }
        })
        .collect()
}

/// Serialize URLs as a sitemaps.org urlset document
pub fn render_sitemap_xml(urls: &[SitemapUrl]) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for url in urls {
        let _ = write!(
            xml,
            "  <url>\n    <loc>{}</loc>\n    <lastmod>{}</lastmod>\n    <priority>{:.1}</priority>\n  </url>\n",
            xml_escape(&url.loc),
            url.lastmod.format("%Y-%m-%d"),
            url.priority
        );
    }
    xml.push_str("</urlset>\n");
    xml
}

/// Full sitemap pipeline for one request host.
///
/// Loads the registry, games and lastmod store, merges, flushes the store
/// once, and returns the XML. Unknown or inactive hosts and a missing
/// registry are errors; a missing games file only means nothing is fresh.
pub fn sitemap_for_host(paths: &PortalPaths, host: &str, today: NaiveDate, tz: &Tz) -> Result<String> {
    let index = DomainIndex::new(load_registry(paths.registry())?);
    let entry = index.resolve(host)?;

    let games = match load_game_data(&paths.data_file) {
        Ok(games) => games,
        Err(e) => {
            warn!(path = %paths.data_file.display(), error = %e, "Games unavailable, treating every sport as stale");
            GameData::default()
        }
    };

    let mut store = LastmodStore::load(paths.lastmod_store())?;
    let urls = generate_sitemap(entry, &games, &mut store, today, tz);
    store.flush()?;

    info!(domain = %entry.domain, urls = urls.len(), "Sitemap generated");
    Ok(render_sitemap_xml(&urls))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sports_portal_core::{Error, Game, SiteStatus};
    use std::fs;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, d).unwrap()
    }

    fn example_site() -> WebsiteEntry {
        WebsiteEntry {
            domain: "example.com".into(),
            status: SiteStatus::Active,
            canonical_url: None,
            sports_categories: vec!["football".into(), "tennis".into()],
            sports_icons: Default::default(),
            languages: vec!["en".into(), "es".into()],
        }
    }

    fn game(id: &str, sport: &str, start: &str, live: bool) -> Game {
        Game {
            id: id.into(),
            sport: sport.into(),
            competition: "League".into(),
            home_team: "Home".into(),
            away_team: "Away".into(),
            start_time: start.parse().unwrap(),
            live,
            links: vec![],
        }
    }

    fn lastmod_of(urls: &[SitemapUrl], suffix: &str) -> NaiveDate {
        urls.iter()
            .find(|u| u.loc.ends_with(suffix))
            .unwrap_or_else(|| panic!("no url ending in {suffix}"))
            .lastmod
    }

    #[test]
    fn test_candidate_urls_cover_home_sports_and_languages() {
        let urls = candidate_urls(&example_site());
        let locs: Vec<&str> = urls.iter().map(|c| c.loc.as_str()).collect();
        assert_eq!(
            locs,
            vec![
                "https://www.example.com/",
                "https://www.example.com/live-football",
                "https://www.example.com/live-tennis",
                "https://www.example.com/es/",
            ]
        );
        assert_eq!(urls[0].kind, UrlKind::Home);
        assert_eq!(urls[1].sport.as_deref(), Some("football"));
        assert_eq!(urls[3].kind, UrlKind::Language);
    }

    #[test]
    fn test_repeated_sports_and_languages_listed_once() {
        let mut site = example_site();
        site.sports_categories = vec!["football".into(), "football".into()];
        site.languages = vec!["en".into(), "es".into(), "es".into(), "en".into()];

        let dir = tempfile::tempdir().unwrap();
        let mut store = LastmodStore::load(dir.path().join("l.json")).unwrap();
        let urls = generate_sitemap(&site, &GameData::default(), &mut store, day(18), &Tz::UTC);
        let xml = render_sitemap_xml(&urls);

        assert_eq!(urls.len(), 3);
        assert_eq!(store.len(), 3);
        assert_eq!(xml.matches("<url>").count(), 3);
        assert_eq!(xml.matches("/live-football</loc>").count(), 1);
        assert!(!xml.contains("/en/</loc>"));
    }

    #[test]
    fn test_every_sport_listed_even_without_games() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LastmodStore::load(dir.path().join("l.json")).unwrap();
        let urls = generate_sitemap(&example_site(), &GameData::default(), &mut store, day(18), &Tz::UTC);
        assert_eq!(urls.len(), 4);
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn test_fresh_and_stale_sports_across_runs() {
        let dir = tempfile::tempdir().unwrap();
        let store_path = dir.path().join("l.json");
        let site = example_site();

        // Day 18: football plays today, tennis has nothing.
        let games = GameData {
            games: vec![game("1", "football", "2026-10-18T20:00:00Z", false)],
        };
        let mut store = LastmodStore::load(&store_path).unwrap();
        let first = generate_sitemap(&site, &games, &mut store, day(18), &Tz::UTC);
        store.flush().unwrap();
        assert_eq!(lastmod_of(&first, "/live-football"), day(18));
        assert_eq!(lastmod_of(&first, "/live-tennis"), day(18));

        // Day 20: football is live again, tennis still empty.
        let games = GameData {
            games: vec![game("2", "football", "2026-10-19T22:00:00Z", true)],
        };
        let mut store = LastmodStore::load(&store_path).unwrap();
        let second = generate_sitemap(&site, &games, &mut store, day(20), &Tz::UTC);
        store.flush().unwrap();
        assert_eq!(lastmod_of(&second, "/live-football"), day(20));
        assert_eq!(lastmod_of(&second, "/live-tennis"), day(18));
        assert_eq!(lastmod_of(&second, ".com/"), day(20));
        assert_eq!(lastmod_of(&second, "/es/"), day(20));
    }

    #[test]
    fn test_regeneration_without_games_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let store_path = dir.path().join("l.json");
        let site = example_site();
        let games = GameData {
            games: vec![game("1", "tennis", "2026-10-18T09:00:00Z", false)],
        };

        let mut store = LastmodStore::load(&store_path).unwrap();
        generate_sitemap(&site, &games, &mut store, day(18), &Tz::UTC);
        store.flush().unwrap();

        // The tennis game is now in the past; nothing is fresh.
        let mut runs = Vec::new();
        for today in [day(21), day(22)] {
            let mut store = LastmodStore::load(&store_path).unwrap();
            runs.push(generate_sitemap(&site, &games, &mut store, today, &Tz::UTC));
            store.flush().unwrap();
        }
        assert_eq!(runs[0], runs[1]);
        assert!(runs[1].iter().all(|u| u.lastmod == day(18)));
    }

    #[test]
    fn test_past_games_are_not_fresh() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = LastmodStore::load(dir.path().join("l.json")).unwrap();
        store.update("https://www.example.com/live-tennis", false, day(1), 0.8);

        let games = GameData {
            games: vec![game("1", "tennis", "2026-10-17T09:00:00Z", false)],
        };
        let urls = generate_sitemap(&example_site(), &games, &mut store, day(18), &Tz::UTC);
        assert_eq!(lastmod_of(&urls, "/live-tennis"), day(1));
    }

    #[test]
    fn test_render_sitemap_xml_escapes_loc() {
        let xml = render_sitemap_xml(&[SitemapUrl {
            loc: "https://a.com/?a=1&b=2".into(),
            lastmod: day(18),
            priority: 0.8,
        }]);
        assert!(xml.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
        assert!(xml.contains("<loc>https://a.com/?a=1&amp;b=2</loc>"));
        assert!(xml.contains("<lastmod>2026-10-18</lastmod>"));
        assert!(xml.contains("<priority>0.8</priority>"));
        assert!(xml.trim_end().ends_with("</urlset>"));
    }

    #[test]
    fn test_sitemap_for_host_persists_store() {
        let dir = tempfile::tempdir().unwrap();
        let config = dir.path().join("config");
        fs::create_dir_all(&config).unwrap();
        fs::write(
            config.join("websites.json"),
            serde_json::json!({"websites": [{
                "domain": "example.com",
                "status": "active",
                "sports_categories": ["football"],
                "languages": ["en"]
            }]})
            .to_string(),
        )
        .unwrap();
        let paths = PortalPaths::new(&config, dir.path().join("data.json"));

        let xml = sitemap_for_host(&paths, "WWW.example.com:443", day(18), &Tz::UTC).unwrap();
        assert_eq!(xml.matches("<url>").count(), 2);

        let store = LastmodStore::load(paths.lastmod_store()).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_sitemap_for_host_keeps_unreadable_store() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("websites.json"),
            r#"{"websites": [{"domain": "example.com", "status": "active", "sports_categories": ["football"]}]}"#,
        )
        .unwrap();
        let paths = PortalPaths::new(dir.path(), dir.path().join("data.json"));

        let mut store = LastmodStore::load(paths.lastmod_store()).unwrap();
        store.update("https://www.other.com/live-tennis", false, day(2), 0.8);
        store.flush().unwrap();
        let good = fs::read_to_string(paths.lastmod_store()).unwrap();

        let truncated = &good[..good.len() / 2];
        fs::write(paths.lastmod_store(), truncated).unwrap();
        let err = sitemap_for_host(&paths, "example.com", day(18), &Tz::UTC).unwrap_err();
        assert!(matches!(err, Error::ConfigParse(_)));
        assert_eq!(fs::read_to_string(paths.lastmod_store()).unwrap(), truncated);

        fs::write(paths.lastmod_store(), &good).unwrap();
        sitemap_for_host(&paths, "example.com", day(18), &Tz::UTC).unwrap();
        let store = LastmodStore::load(paths.lastmod_store()).unwrap();
        assert_eq!(store.get("https://www.other.com/live-tennis").unwrap().lastmod, day(2));
        assert_eq!(store.len(), 3);
    }

    #[test]
    fn test_sitemap_for_host_unknown_domain() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("websites.json"), r#"{"websites": []}"#).unwrap();
        let paths = PortalPaths::new(dir.path(), dir.path().join("data.json"));

        let err = sitemap_for_host(&paths, "example.com", day(18), &Tz::UTC).unwrap_err();
        assert!(matches!(err, Error::UnknownDomain(_)));
        assert!(!paths.lastmod_store().exists());
    }

    #[test]
    fn test_sitemap_for_host_missing_registry() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PortalPaths::new(dir.path(), dir.path().join("data.json"));
        let err = sitemap_for_host(&paths, "example.com", day(18), &Tz::UTC).unwrap_err();
        assert!(err.is_not_found());
    }
}
