use chrono::NaiveDate;
use chrono_tz::Tz;
use sports_portal_core::i18n::Labels;
use sports_portal_core::{Game, GameData, StreamLink};
use std::collections::BTreeMap;
use std::fmt::Write;

use crate::escape::{html_escape, script_json_escape};

pub const DEFAULT_PAGE_SIZE: usize = 20;
pub const MAX_PAGE_SIZE: usize = 100;

/// Listing filter selected in the tab bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    All,
    Live,
    Today,
    Upcoming,
}

impl Tab {
    pub const ALL: [Tab; 4] = [Tab::All, Tab::Live, Tab::Today, Tab::Upcoming];

    /// Parse a query value; anything unrecognised is `All`
    pub fn parse(value: &str) -> Tab {
        match value.trim().to_ascii_lowercase().as_str() {
            "live" => Tab::Live,
            "today" => Tab::Today,
            "upcoming" => Tab::Upcoming,
            _ => Tab::All,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tab::All => "all",
            Tab::Live => "live",
            Tab::Today => "today",
            Tab::Upcoming => "upcoming",
        }
    }

    pub fn label(self, labels: &Labels) -> &'static str {
        match self {
            Tab::All => labels.all,
            Tab::Live => labels.live,
            Tab::Today => labels.today,
            Tab::Upcoming => labels.upcoming,
        }
    }

    fn matches(self, game: &Game, today: NaiveDate, tz: &Tz) -> bool {
        match self {
            Tab::All => true,
            Tab::Live => game.live,
            Tab::Today => game.live || game.local_date(tz) == today,
            Tab::Upcoming => !game.live && game.local_date(tz) > today,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListingQuery {
    pub offset: usize,
    pub limit: Option<usize>,
    pub sport: Option<String>,
    pub tab: Tab,
}

impl ListingQuery {
    pub fn page_size(&self) -> usize {
        self.limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE)
    }
}

/// One rendered slice of the listing plus pagination state
#[derive(Debug, Clone)]
pub struct ListingPage {
    pub html: String,
    pub has_more: bool,
    pub loaded: usize,
    pub total: usize,
}

/// Games visible for a site, in display order.
///
/// Keeps live games and games scheduled today or later, restricted to
/// `site_sports` (when non-empty), the query's sport and its tab. Live games
/// come first, then by kick-off.
pub fn visible_games<'a>(
    data: &'a GameData,
    query: &ListingQuery,
    site_sports: &[String],
    today: NaiveDate,
    tz: &Tz,
) -> Vec<&'a Game> {
    let mut games: Vec<&Game> = data
        .games
        .iter()
        .filter(|g| g.is_current(today, tz))
        .filter(|g| site_sports.is_empty() || site_sports.iter().any(|s| g.is_sport(s)))
        .filter(|g| query.sport.as_deref().is_none_or(|s| g.is_sport(s)))
        .filter(|g| query.tab.matches(g, today, tz))
        .collect();

    games.sort_by(|a, b| {
        b.live
            .cmp(&a.live)
            .then(a.start_time.cmp(&b.start_time))
            .then_with(|| a.id.cmp(&b.id))
    });
    games
}

/// Render one page of game cards for the listing and games API
pub fn render_listing(
    data: &GameData,
    query: &ListingQuery,
    site_sports: &[String],
    labels: &Labels,
    today: NaiveDate,
    tz: &Tz,
) -> ListingPage {
    let games = visible_games(data, query, site_sports, today, tz);
    let total = games.len();
    let page: Vec<&Game> = games
        .into_iter()
        .skip(query.offset)
        .take(query.page_size())
        .collect();
    let loaded = (query.offset + page.len()).min(total);

    let html = if page.is_empty() {
        if query.offset == 0 {
            format!(r#"<p class="no-games">{}</p>"#, html_escape(labels.no_games))
        } else {
            String::new()
        }
    } else {
        render_groups(&page, labels, today, tz)
    };

    ListingPage {
        html,
        has_more: loaded < total,
        loaded,
        total,
    }
}

/// Group games sport -> competition, keeping first-appearance order
fn group_games<'a>(games: &[&'a Game]) -> Vec<(&'a str, Vec<(&'a str, Vec<&'a Game>)>)> {
    let mut groups: Vec<(&str, Vec<(&str, Vec<&Game>)>)> = Vec::new();
    for &game in games {
        let sport_idx = match groups.iter().position(|(s, _)| *s == game.sport) {
            Some(i) => i,
            None => {
                groups.push((game.sport.as_str(), Vec::new()));
                groups.len() - 1
            }
        };
        let competitions = &mut groups[sport_idx].1;
        match competitions.iter_mut().find(|(c, _)| *c == game.competition) {
            Some((_, list)) => list.push(game),
            None => competitions.push((game.competition.as_str(), vec![game])),
        }
    }
    groups
}

fn render_groups(page: &[&Game], labels: &Labels, today: NaiveDate, tz: &Tz) -> String {
    let mut html = String::new();

    for (sport, competitions) in group_games(page) {
        let sport_attr = html_escape(sport);
        let _ = write!(
            html,
            r#"<section class="sport-group" data-sport="{}"><h2 class="sport-title">{}</h2>"#,
            sport_attr,
            html_escape(&display_name(sport))
        );

        for (competition, games) in competitions {
            let league = html_escape(competition);
            let _ = write!(
                html,
                r#"<div class="competition" data-league="{league}"><h3 class="competition-title"><button type="button" class="fav-league" data-league="{league}" aria-label="{fav}">☆</button> {league}</h3>"#,
                league = league,
                fav = html_escape(labels.favorites),
            );
            for game in games {
                render_card(&mut html, game, labels, today, tz);
            }
            html.push_str("</div>");
        }

        html.push_str("</section>");
    }

    let links: BTreeMap<&str, &[StreamLink]> = page
        .iter()
        .map(|g| (g.id.as_str(), g.links.as_slice()))
        .collect();
    let json = serde_json::to_string(&links).unwrap_or_else(|_| "{}".to_string());
    let _ = write!(
        html,
        r#"<script type="application/json" class="links-data">{}</script>"#,
        script_json_escape(&json)
    );

    html
}

fn render_card(html: &mut String, game: &Game, labels: &Labels, today: NaiveDate, tz: &Tz) {
    let id = html_escape(&game.id);
    let local = game.start_time.with_timezone(tz);
    let time_label = if local.date_naive() == today {
        local.format("%H:%M").to_string()
    } else {
        local.format("%d/%m %H:%M").to_string()
    };
    let live_badge = if game.live {
        format!(r#"<span class="live-badge">{}</span>"#, html_escape(labels.live))
    } else {
        String::new()
    };

    let _ = write!(
        html,
        r#"<article class="game-card{live_class}" data-game-id="{id}" data-league="{league}" data-sport="{sport}"><button type="button" class="fav-game" data-game-id="{id}" aria-label="{fav}">☆</button><time class="game-time" datetime="{datetime}">{time}</time><div class="teams"><span class="team home">{home}</span> <span class="vs">{vs}</span> <span class="team away">{away}</span></div>{live_badge}<div class="game-links" hidden></div></article>"#,
        live_class = if game.live { " live" } else { "" },
        id = id,
        league = html_escape(&game.competition),
        sport = html_escape(&game.sport),
        fav = html_escape(labels.favorites),
        datetime = game.start_time.to_rfc3339(),
        time = time_label,
        home = html_escape(&game.home_team),
        vs = html_escape(labels.vs),
        away = html_escape(&game.away_team),
        live_badge = live_badge,
    );
}

/// `"ice-hockey"` -> `"Ice Hockey"`
pub fn display_name(slug: &str) -> String {
    slug.split(['-', '_', ' '])
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
