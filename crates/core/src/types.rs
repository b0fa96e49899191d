use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::i18n::DEFAULT_LANGUAGE;

/// Whether a registry entry is served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteStatus {
    Active,
    Inactive,
}

/// One configured domain from websites.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebsiteEntry {
    pub domain: String,
    pub status: SiteStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,
    #[serde(default)]
    pub sports_categories: Vec<String>,
    #[serde(default)]
    pub sports_icons: BTreeMap<String, String>,
    #[serde(default)]
    pub languages: Vec<String>,
}

impl WebsiteEntry {
    pub fn is_active(&self) -> bool {
        self.status == SiteStatus::Active
    }

    /// Absolute base URL without a trailing slash.
    ///
    /// Falls back to `https://www.<domain>` when no canonical URL is set.
    pub fn base_url(&self) -> String {
        let base = match self.canonical_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => url.to_string(),
            _ => format!("https://www.{}", crate::domain::normalize_domain(&self.domain)),
        };
        base.trim_end_matches('/').to_string()
    }

    /// Language served at the site root
    pub fn primary_language(&self) -> &str {
        self.languages
            .first()
            .map(String::as_str)
            .unwrap_or(DEFAULT_LANGUAGE)
    }

    /// Configured languages served under `/<lang>/`; repeats of the primary are skipped
    pub fn language_variants(&self) -> impl Iterator<Item = &str> {
        let primary = self.primary_language();
        self.languages
            .iter()
            .skip(1)
            .map(String::as_str)
            .filter(move |lang| *lang != primary)
    }

    /// Codes are lowercase once loaded from the registry, so matching is exact
    pub fn serves_language(&self, lang: &str) -> bool {
        if self.languages.is_empty() {
            return lang == DEFAULT_LANGUAGE;
        }
        self.languages.iter().any(|l| l == lang)
    }

    pub fn has_sport(&self, sport: &str) -> bool {
        self.sports_categories
            .iter()
            .any(|s| s.eq_ignore_ascii_case(sport))
    }

    pub fn icon_for(&self, sport: &str) -> Option<&str> {
        self.sports_icons.get(sport).map(String::as_str)
    }
}

/// A single `{type, link}` stream entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamLink {
    #[serde(rename = "type")]
    pub kind: String,
    pub link: String,
}

/// A scheduled or live game from data.json
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    pub sport: String,
    #[serde(default)]
    pub competition: String,
    pub home_team: String,
    pub away_team: String,
    pub start_time: DateTime<Utc>,
    #[serde(default)]
    pub live: bool,
    #[serde(default)]
    pub links: Vec<StreamLink>,
}

impl Game {
    /// Calendar date of kick-off in the portal's timezone
    pub fn local_date(&self, tz: &Tz) -> NaiveDate {
        self.start_time.with_timezone(tz).date_naive()
    }

    /// Live now, or scheduled for `today` or later
    pub fn is_current(&self, today: NaiveDate, tz: &Tz) -> bool {
        self.live || self.local_date(tz) >= today
    }

    pub fn is_sport(&self, sport: &str) -> bool {
        self.sport.eq_ignore_ascii_case(sport)
    }
}

/// The shared games file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameData {
    #[serde(default)]
    pub games: Vec<Game>,
}

impl GameData {
    pub fn find(&self, id: &str) -> Option<&Game> {
        self.games.iter().find(|g| g.id == id)
    }

    /// Whether `sport` has a live game or one scheduled today or later
    pub fn sport_has_current_games(&self, sport: &str, today: NaiveDate, tz: &Tz) -> bool {
        self.games
            .iter()
            .any(|g| g.is_sport(sport) && g.is_current(today, tz))
    }
}

/// Per-domain branding and SEO constants
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    pub site: SiteBranding,
    pub seo: SeoConfig,
}

impl SiteConfig {
    /// Title and description for `lang`, falling back to the defaults
    pub fn seo_text(&self, lang: &str) -> (&str, &str) {
        match self.seo.localized.get(lang) {
            Some(text) => (
                text.title.as_deref().unwrap_or(&self.seo.title),
                text.description.as_deref().unwrap_or(&self.seo.description),
            ),
            None => (&self.seo.title, &self.seo.description),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteBranding {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    pub accent_color: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeoConfig {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub localized: HashMap<String, LocalizedSeo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalizedSeo {
    pub title: Option<String>,
    pub description: Option<String>,
}

fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Id {
        Text(String),
        Number(i64),
    }

    Ok(match Id::deserialize(deserializer)? {
        Id::Text(s) => s,
        Id::Number(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(canonical: Option<&str>) -> WebsiteEntry {
        WebsiteEntry {
            domain: "WWW.Example.com ".to_string(),
            status: SiteStatus::Active,
            canonical_url: canonical.map(String::from),
            sports_categories: vec!["football".into()],
            sports_icons: BTreeMap::new(),
            languages: vec!["en".into(), "es".into()],
        }
    }

    #[test]
    fn test_base_url_synthesized_from_domain() {
        assert_eq!(entry(None).base_url(), "https://www.example.com");
        assert_eq!(entry(Some("  ")).base_url(), "https://www.example.com");
    }

    #[test]
    fn test_base_url_strips_trailing_slash() {
        assert_eq!(
            entry(Some("https://example.com/")).base_url(),
            "https://example.com"
        );
    }

    #[test]
    fn test_language_variants_skip_primary() {
        let e = entry(None);
        assert_eq!(e.primary_language(), "en");
        assert_eq!(e.language_variants().collect::<Vec<_>>(), vec!["es"]);
        assert!(e.serves_language("es"));
        assert!(!e.serves_language("ES"));
        assert!(!e.serves_language("fr"));
    }

    #[test]
    fn test_game_id_accepts_numbers() {
        let game: Game = serde_json::from_value(serde_json::json!({
            "id": 42,
            "sport": "football",
            "home_team": "A",
            "away_team": "B",
            "start_time": "2026-10-18T19:00:00Z"
        }))
        .unwrap();
        assert_eq!(game.id, "42");
        assert!(game.links.is_empty());
        assert!(!game.live);
    }

    #[test]
    fn test_game_local_date_uses_timezone() {
        let game: Game = serde_json::from_value(serde_json::json!({
            "id": "1",
            "sport": "football",
            "home_team": "A",
            "away_team": "B",
            "start_time": "2026-10-18T23:30:00Z"
        }))
        .unwrap();
        let madrid: Tz = "Europe/Madrid".parse().unwrap();
        assert_eq!(
            game.local_date(&madrid),
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
        );
        assert_eq!(
            game.local_date(&Tz::UTC),
            NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
        );
    }
}
