use sports_portal_core::i18n::labels;
use sports_portal_core::{SiteConfig, WebsiteEntry};
use sports_portal_generator::escape::html_escape;
use sports_portal_generator::listing::{ListingPage, Tab, display_name};
use sports_portal_generator::sitemap::sport_path;

/// Everything the landing page template needs
pub struct PageContext<'a> {
    pub site: &'a WebsiteEntry,
    pub config: &'a SiteConfig,
    pub lang: &'a str,
    pub sport: Option<&'a str>,
    pub tab: Tab,
    pub listing: &'a ListingPage,
    pub page_size: usize,
}

/// URL prefix for a language: empty for the site's primary language
pub fn lang_prefix(site: &WebsiteEntry, lang: &str) -> String {
    if lang == site.primary_language() {
        String::new()
    } else {
        format!("/{}", lang)
    }
}

/// Path of a page for `lang` and an optional sport
pub fn page_path(site: &WebsiteEntry, lang: &str, sport: Option<&str>) -> String {
    let prefix = lang_prefix(site, lang);
    match sport {
        Some(sport) => format!("{}{}", prefix, sport_path(sport)),
        None => format!("{}/", prefix),
    }
}

/// `hreflang` alternates for every language the site serves
fn alternate_links(site: &WebsiteEntry, sport: Option<&str>) -> String {
    let base = site.base_url();
    let primary = site.primary_language();

    let mut links = format!(
        r#"<link rel="alternate" hreflang="x-default" href="{}{}">"#,
        html_escape(&base),
        html_escape(&page_path(site, primary, sport))
    );
    for lang in std::iter::once(primary).chain(site.language_variants()) {
        links.push_str(&format!(
            r#"<link rel="alternate" hreflang="{}" href="{}{}">"#,
            html_escape(lang),
            html_escape(&base),
            html_escape(&page_path(site, lang, sport))
        ));
    }
    links
}

/// Generate the complete HTML for a landing page
///
/// The first listing page is rendered inline; the client script pulls the
/// rest from the games API as the reader scrolls.
pub fn render_page(ctx: &PageContext<'_>) -> String {
    let site = ctx.site;
    let labels = labels(ctx.lang);
    let (seo_title, seo_description) = ctx.config.seo_text(ctx.lang);

    let title = match ctx.sport {
        Some(sport) => format!("{} - {}", display_name(sport), seo_title),
        None => seo_title.to_string(),
    };
    let canonical = format!("{}{}", site.base_url(), page_path(site, ctx.lang, ctx.sport));
    let current_path = page_path(site, ctx.lang, ctx.sport);
    let home_path = page_path(site, ctx.lang, None);

    let logo_html = match &ctx.config.site.logo {
        Some(logo) => format!(
            r#"<img class="logo" src="/static/{}" alt="" width="32" height="32">"#,
            html_escape(logo)
        ),
        None => String::new(),
    };

    let tagline_html = match &ctx.config.site.tagline {
        Some(tagline) => format!(r#"<p class="tagline">{}</p>"#, html_escape(tagline)),
        None => String::new(),
    };

    // Sport navigation, "all sports" first
    let mut sport_nav = format!(
        r#"<a class="sport-link{}" href="{}">{}</a>"#,
        if ctx.sport.is_none() { " active" } else { "" },
        html_escape(&home_path),
        html_escape(labels.all)
    );
    for sport in &site.sports_categories {
        let icon = site
            .icon_for(sport)
            .map(|icon| {
                format!(
                    r#"<img src="/static/icons/{}" alt="" width="20" height="20">"#,
                    html_escape(icon)
                )
            })
            .unwrap_or_default();
        sport_nav.push_str(&format!(
            r#"<a class="sport-link{}" href="{}">{}{}</a>"#,
            if ctx.sport == Some(sport.as_str()) { " active" } else { "" },
            html_escape(&page_path(site, ctx.lang, Some(sport))),
            icon,
            html_escape(&display_name(sport))
        ));
    }

    let mut tabs: String = Tab::ALL
        .iter()
        .map(|tab| {
            let href = match tab {
                Tab::All => current_path.clone(),
                _ => format!("{}?tab={}", current_path, tab.as_str()),
            };
            format!(
                r#"<a class="tab{}" href="{}" data-tab="{}">{}</a>"#,
                if *tab == ctx.tab { " active" } else { "" },
                html_escape(&href),
                tab.as_str(),
                html_escape(tab.label(labels))
            )
        })
        .collect();
    tabs.push_str(&format!(
        r#"<button type="button" class="tab" data-tab="favorites">★ {}</button>"#,
        html_escape(labels.favorites)
    ));

    let keywords = ctx.config.seo.keywords.join(", ");
    let site_name = html_escape(&ctx.config.site.name);

    format!(
        r#"<!DOCTYPE html>
<html lang="{lang}" data-theme="light">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <meta name="description" content="{description}">
    <meta name="keywords" content="{keywords}">
    <link rel="canonical" href="{canonical}">
    {alternates}
    <link rel="stylesheet" href="/assets/style.css">
    <style>:root {{ --accent: {accent}; }}</style>
    <script>
        try {{
            if (localStorage.getItem('darkMode') === '1') document.documentElement.dataset.theme = 'dark';
        }} catch (e) {{}}
    </script>
</head>
<body data-lang="{lang}" data-sport="{sport}" data-tab="{tab}" data-limit="{limit}" data-loaded="{loaded}" data-total="{total}" data-has-more="{has_more}" data-loading-label="{loading}" data-no-links-label="{no_links}">
    <header class="site-header">
        <a class="brand" href="{home}">{logo}<span class="site-name">{site_name}</span></a>
        {tagline}
        <button type="button" id="dark-toggle" class="dark-toggle" aria-label="{dark_mode}" title="{dark_mode}">◐</button>
    </header>

    <nav class="sport-nav">{sport_nav}</nav>
    <nav class="tab-bar">{tabs}</nav>

    <main id="games" class="games">{listing}</main>
    <div id="scroll-sentinel" class="sentinel"{sentinel_hidden}></div>

    <footer class="site-footer">&copy; {site_name}</footer>

    <script src="/assets/app.js" defer></script>
</body>
</html>"#,
        lang = html_escape(ctx.lang),
        title = html_escape(&title),
        description = html_escape(seo_description),
        keywords = html_escape(&keywords),
        canonical = html_escape(&canonical),
        alternates = alternate_links(site, ctx.sport),
        accent = ctx.config.site.accent_color,
        sport = html_escape(ctx.sport.unwrap_or("")),
        tab = ctx.tab.as_str(),
        limit = ctx.page_size,
        loaded = ctx.listing.loaded,
        total = ctx.listing.total,
        has_more = ctx.listing.has_more,
        loading = html_escape(labels.loading),
        no_links = html_escape(labels.no_links),
        home = html_escape(&home_path),
        logo = logo_html,
        site_name = site_name,
        tagline = tagline_html,
        dark_mode = html_escape(labels.dark_mode),
        sport_nav = sport_nav,
        tabs = tabs,
        listing = ctx.listing.html,
        sentinel_hidden = if ctx.listing.has_more { "" } else { " hidden" },
    )
}

/// Stylesheet served at /assets/style.css
pub fn stylesheet() -> &'static str {
    r#":root {
    --accent: #e63946;
    --bg: #f6f7f9;
    --surface: #ffffff;
    --text: #1d232b;
    --muted: #6b7380;
    --border: #e2e5ea;
}

html[data-theme="dark"] {
    --bg: #121418;
    --surface: #1c1f26;
    --text: #e6e8eb;
    --muted: #9aa1ab;
    --border: #2c313a;
}

* { margin: 0; padding: 0; box-sizing: border-box; }

body {
    font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, sans-serif;
    line-height: 1.5;
    color: var(--text);
    background: var(--bg);
    max-width: 960px;
    margin: 0 auto;
    padding: 1rem;
}

a { color: inherit; text-decoration: none; }

.site-header {
    display: flex;
    align-items: center;
    gap: 1rem;
    padding: 0.75rem 0;
    border-bottom: 3px solid var(--accent);
}

.brand { display: flex; align-items: center; gap: 0.5rem; font-weight: 700; font-size: 1.25rem; }
.tagline { color: var(--muted); flex: 1; }

.dark-toggle {
    margin-left: auto;
    background: none;
    border: 1px solid var(--border);
    color: var(--text);
    border-radius: 50%;
    width: 2.25rem;
    height: 2.25rem;
    cursor: pointer;
}

.sport-nav, .tab-bar {
    display: flex;
    flex-wrap: wrap;
    gap: 0.5rem;
    margin: 1rem 0;
}

.sport-link, .tab {
    display: inline-flex;
    align-items: center;
    gap: 0.35rem;
    padding: 0.35rem 0.8rem;
    border-radius: 999px;
    border: 1px solid var(--border);
    background: var(--surface);
    color: var(--text);
    font: inherit;
    cursor: pointer;
}

.sport-link.active, .tab.active {
    background: var(--accent);
    border-color: var(--accent);
    color: #fff;
}

.sport-group { margin-bottom: 1.5rem; }
.sport-title { font-size: 1.1rem; margin: 1rem 0 0.5rem; }

.competition {
    background: var(--surface);
    border: 1px solid var(--border);
    border-radius: 8px;
    margin-bottom: 0.75rem;
    overflow: hidden;
}

.competition-title {
    font-size: 0.95rem;
    padding: 0.5rem 0.75rem;
    border-bottom: 1px solid var(--border);
    color: var(--muted);
}

.game-card {
    display: grid;
    grid-template-columns: 2rem 5.5rem 1fr auto;
    align-items: center;
    gap: 0.5rem;
    padding: 0.6rem 0.75rem;
    border-bottom: 1px solid var(--border);
    cursor: pointer;
}

.game-card:last-child { border-bottom: none; }
.game-card:hover { background: rgba(127, 127, 127, 0.06); }

.fav-game, .fav-league {
    background: none;
    border: none;
    font-size: 1.1rem;
    color: var(--muted);
    cursor: pointer;
}

.fav-game.active, .fav-league.active { color: #f5b301; }

.game-time { color: var(--muted); font-variant-numeric: tabular-nums; }
.vs { color: var(--muted); font-size: 0.85rem; }

.live-badge {
    background: var(--accent);
    color: #fff;
    font-size: 0.75rem;
    font-weight: 700;
    text-transform: uppercase;
    padding: 0.1rem 0.45rem;
    border-radius: 4px;
}

.game-links {
    grid-column: 1 / -1;
    display: flex;
    flex-wrap: wrap;
    gap: 0.5rem;
    padding-top: 0.5rem;
    color: var(--muted);
}

.game-links[hidden], [hidden] { display: none !important; }

.stream-link {
    padding: 0.25rem 0.7rem;
    border-radius: 4px;
    background: var(--accent);
    color: #fff;
    font-size: 0.85rem;
}

.no-games { color: var(--muted); text-align: center; padding: 2rem 0; }
.sentinel { height: 1px; }

.site-footer {
    margin-top: 2rem;
    padding-top: 1rem;
    border-top: 1px solid var(--border);
    color: var(--muted);
    font-size: 0.85rem;
    text-align: center;
}

@media (max-width: 600px) {
    .game-card { grid-template-columns: 2rem 4.5rem 1fr; }
    .live-badge { grid-column: 3; justify-self: start; }
}
"#
}

/// Client script served at /assets/app.js
///
/// Favorites live in two localStorage-backed sets behind `FavoriteSet`;
/// everything touching the DOM sits outside that class.
pub fn client_script() -> &'static str {
    r##"// Sports portal client: favorites, infinite scroll, stream links, dark mode
(function () {
    'use strict';

    const STORAGE_KEYS = {
        games: 'favoriteGames',
        leagues: 'favoriteLeagues',
        darkMode: 'darkMode',
    };
    const LINK_DELAY_MS = 300;

    // A set of ids persisted in localStorage
    class FavoriteSet {
        constructor(key) {
            this.key = key;
            this.items = new Set(FavoriteSet.read(key));
        }

        static read(key) {
            try {
                const parsed = JSON.parse(localStorage.getItem(key) || '[]');
                return Array.isArray(parsed) ? parsed.map(String) : [];
            } catch (e) {
                return [];
            }
        }

        has(id) {
            return this.items.has(String(id));
        }

        // Returns true when the id is now a favorite
        toggle(id) {
            const key = String(id);
            const added = !this.items.has(key);
            if (added) {
                this.items.add(key);
            } else {
                this.items.delete(key);
            }
            this.save();
            return added;
        }

        save() {
            try {
                localStorage.setItem(this.key, JSON.stringify(Array.from(this.items)));
            } catch (e) {
                console.warn('Could not persist favorites', e);
            }
        }
    }

    const favoriteGames = new FavoriteSet(STORAGE_KEYS.games);
    const favoriteLeagues = new FavoriteSet(STORAGE_KEYS.leagues);
    const linksByGame = {};

    const body = document.body;
    const container = document.getElementById('games');
    const sentinel = document.getElementById('scroll-sentinel');

    const state = {
        offset: parseInt(body.dataset.loaded || '0', 10),
        limit: parseInt(body.dataset.limit || '20', 10),
        hasMore: body.dataset.hasMore === 'true',
        isLoading: false,
        sport: body.dataset.sport || '',
        tab: body.dataset.tab || 'all',
        showFavorites: false,
    };

    function escapeHtml(value) {
        return String(value)
            .replace(/&/g, '&amp;')
            .replace(/</g, '&lt;')
            .replace(/>/g, '&gt;')
            .replace(/"/g, '&quot;')
            .replace(/'/g, '&#x27;');
    }

    // Move embedded per-page link data into linksByGame
    function collectLinks(root) {
        root.querySelectorAll('script.links-data').forEach((node) => {
            try {
                Object.assign(linksByGame, JSON.parse(node.textContent));
            } catch (e) {
                console.warn('Ignoring malformed link data', e);
            }
            node.remove();
        });
    }

    function renderStars(root) {
        root.querySelectorAll('.fav-game').forEach((button) => {
            const on = favoriteGames.has(button.dataset.gameId);
            button.textContent = on ? '★' : '☆';
            button.classList.toggle('active', on);
        });
        root.querySelectorAll('.fav-league').forEach((button) => {
            const on = favoriteLeagues.has(button.dataset.league);
            button.textContent = on ? '★' : '☆';
            button.classList.toggle('active', on);
        });
    }

    function applyFavoritesFilter() {
        container.querySelectorAll('.game-card').forEach((card) => {
            const favorite = favoriteGames.has(card.dataset.gameId) || favoriteLeagues.has(card.dataset.league);
            card.hidden = state.showFavorites && !favorite;
        });
        container.querySelectorAll('.competition, .sport-group').forEach((group) => {
            const cards = group.querySelectorAll('.game-card');
            group.hidden = cards.length > 0 && Array.from(cards).every((card) => card.hidden);
        });
    }

    function renderLinks(panel, links) {
        const safe = links.filter((l) => /^https?:\/\//i.test(l.link || ''));
        if (safe.length === 0) {
            panel.textContent = body.dataset.noLinksLabel || 'No streams available yet.';
            return;
        }
        panel.innerHTML = safe
            .map((l) => `<a class="stream-link" href="${escapeHtml(l.link)}" target="_blank" rel="noopener nofollow">${escapeHtml(l.type || 'link')}</a>`)
            .join('');
    }

    // Expand or collapse a game's stream list from the embedded link data
    function toggleLinks(card) {
        const panel = card.querySelector('.game-links');
        if (!panel) return;

        if (!panel.hidden) {
            panel.hidden = true;
            return;
        }
        panel.hidden = false;
        if (panel.dataset.ready === 'true') return;

        panel.textContent = body.dataset.loadingLabel || 'Loading...';
        setTimeout(() => {
            renderLinks(panel, linksByGame[card.dataset.gameId] || []);
            panel.dataset.ready = 'true';
        }, LINK_DELAY_MS);
    }

    async function loadMore() {
        if (state.isLoading || !state.hasMore) return;
        state.isLoading = true;

        const params = new URLSearchParams({
            offset: String(state.offset),
            limit: String(state.limit),
            sport: state.sport,
            tab: state.tab,
            lang: body.dataset.lang || '',
        });

        try {
            const response = await fetch(`/api/load-games?${params.toString()}`);
            if (!response.ok) throw new Error(`HTTP ${response.status}`);
            const data = await response.json();
            if (!data.success) throw new Error(data.error || 'Request failed');

            const fragment = document.createElement('div');
            fragment.innerHTML = data.html;
            collectLinks(fragment);
            renderStars(fragment);
            while (fragment.firstChild) {
                container.appendChild(fragment.firstChild);
            }

            state.offset = data.loaded;
            state.hasMore = data.hasMore;
            applyFavoritesFilter();
        } catch (e) {
            console.error('Failed to load more games', e);
            state.hasMore = false;
        } finally {
            state.isLoading = false;
            if (!state.hasMore && sentinel) sentinel.hidden = true;
        }
    }

    container.addEventListener('click', (event) => {
        const gameStar = event.target.closest('.fav-game');
        if (gameStar) {
            favoriteGames.toggle(gameStar.dataset.gameId);
            renderStars(container);
            applyFavoritesFilter();
            return;
        }

        const leagueStar = event.target.closest('.fav-league');
        if (leagueStar) {
            favoriteLeagues.toggle(leagueStar.dataset.league);
            renderStars(container);
            applyFavoritesFilter();
            return;
        }

        if (event.target.closest('.game-links')) return;

        const card = event.target.closest('.game-card');
        if (card) toggleLinks(card);
    });

    const favoritesTab = document.querySelector('.tab[data-tab="favorites"]');
    if (favoritesTab) {
        favoritesTab.addEventListener('click', () => {
            state.showFavorites = !state.showFavorites;
            favoritesTab.classList.toggle('active', state.showFavorites);
            applyFavoritesFilter();
        });
    }

    const darkToggle = document.getElementById('dark-toggle');
    if (darkToggle) {
        darkToggle.addEventListener('click', () => {
            const dark = document.documentElement.dataset.theme !== 'dark';
            document.documentElement.dataset.theme = dark ? 'dark' : 'light';
            try {
                localStorage.setItem(STORAGE_KEYS.darkMode, dark ? '1' : '0');
            } catch (e) {
                console.warn('Could not persist theme', e);
            }
        });
    }

    if (sentinel && 'IntersectionObserver' in window) {
        const observer = new IntersectionObserver((entries) => {
            if (entries.some((entry) => entry.isIntersecting)) loadMore();
        }, { rootMargin: '300px' });
        observer.observe(sentinel);
    }

    collectLinks(container);
    renderStars(container);
})();
"##
}
