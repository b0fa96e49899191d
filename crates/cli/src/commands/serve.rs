use anyhow::{Context, Result};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use sports_portal_core::i18n::labels;
use sports_portal_core::{
    DomainIndex, Error as PortalError, StreamLink, WebsiteEntry, load_game_data, load_registry,
    load_site_config,
};
use sports_portal_generator::listing::{ListingQuery, Tab, render_listing};
use sports_portal_generator::{robots_for_host, sitemap_for_host};
use std::{net::SocketAddr, sync::Arc};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{debug, info, warn};

use super::template::{PageContext, client_script, render_page, stylesheet};
use crate::settings::PortalSettings;

#[derive(Clone)]
struct AppState {
    settings: Arc<PortalSettings>,
}

/// Run the portal server.
///
/// Every request re-reads the registry, site file and games file it needs,
/// so edits on disk show up without a restart.
pub async fn run(settings: PortalSettings, bind: SocketAddr) -> Result<()> {
    info!(
        config_dir = %settings.paths.config_dir.display(),
        data_file = %settings.paths.data_file.display(),
        timezone = %settings.timezone,
        "Starting portal server"
    );

    if !settings.paths.registry().exists() {
        warn!(path = %settings.paths.registry().display(), "Registry not found; every domain will 404 until it exists");
    }

    let app = router(settings);

    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .context("Failed to bind to address")?;
    info!(%bind, "Portal ready");

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

fn router(settings: PortalSettings) -> Router {
    let public_dir = settings.public_dir.clone();
    let state = AppState {
        settings: Arc::new(settings),
    };

    Router::new()
        .route("/", get(home_handler))
        .route("/{segment}", get(segment_handler))
        .route("/{segment}/", get(language_home_handler))
        .route("/{segment}/{page}", get(language_segment_handler))
        .route("/sitemap.xml", get(sitemap_handler))
        .route("/sitemap.php", get(sitemap_handler))
        .route("/robots.txt", get(robots_handler))
        .route("/robots.php", get(robots_handler))
        .route("/api/load-games", get(load_games_handler))
        .route("/api/load-games.php", get(load_games_handler))
        .route("/api/get-links", get(get_links_handler))
        .route("/api/get-links.php", get(get_links_handler))
        .route("/assets/app.js", get(script_handler))
        .route("/assets/style.css", get(stylesheet_handler))
        .nest_service("/static", ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn request_host(headers: &HeaderMap) -> String {
    headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Map a core error onto the portal's binary error responses
fn error_response(err: &PortalError) -> Response {
    if matches!(err, PortalError::UnknownDomain(_)) || err.is_not_found() {
        debug!(error = %err, "Not found");
        (StatusCode::NOT_FOUND, "Not Found").into_response()
    } else {
        warn!(error = %err, "Request failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "Not Found").into_response()
}

fn resolve_site(settings: &PortalSettings, host: &str) -> Result<WebsiteEntry, PortalError> {
    let index = DomainIndex::new(load_registry(settings.paths.registry())?);
    index.resolve(host).cloned()
}

/// Sitemap generation reads and rewrites files, so it runs on the blocking pool
async fn sitemap_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let settings = Arc::clone(&state.settings);
    let host = request_host(&headers);
    let generated = tokio::task::spawn_blocking(move || {
        sitemap_for_host(&settings.paths, &host, settings.today(), &settings.timezone)
    })
    .await;

    match generated {
        Ok(Ok(xml)) => (
            [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
            xml,
        )
            .into_response(),
        Ok(Err(e)) => error_response(&e),
        Err(e) => task_failed(e),
    }
}

async fn robots_handler(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let settings = Arc::clone(&state.settings);
    let host = request_host(&headers);
    let generated = tokio::task::spawn_blocking(move || robots_for_host(&settings.paths, &host)).await;

    match generated {
        Ok(Ok(body)) => ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], body).into_response(),
        Ok(Err(e)) => error_response(&e),
        Err(e) => task_failed(e),
    }
}

fn task_failed(err: tokio::task::JoinError) -> Response {
    warn!(error = %err, "Blocking task failed");
    (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
}

#[derive(Debug, Default, Deserialize)]
struct PageParams {
    tab: Option<String>,
}

async fn home_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<PageParams>,
) -> Response {
    render_site_page(&state.settings, &request_host(&headers), None, None, &params)
}

/// `/live-<sport>` or `/<lang>`
async fn segment_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(segment): Path<String>,
    Query(params): Query<PageParams>,
) -> Response {
    let host = request_host(&headers);
    match segment.strip_prefix("live-") {
        Some(sport) => render_site_page(&state.settings, &host, None, Some(sport), &params),
        None => render_site_page(&state.settings, &host, Some(segment.as_str()), None, &params),
    }
}

async fn language_home_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(lang): Path<String>,
    Query(params): Query<PageParams>,
) -> Response {
    render_site_page(&state.settings, &request_host(&headers), Some(lang.as_str()), None, &params)
}

/// `/<lang>/live-<sport>`
async fn language_segment_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((lang, segment)): Path<(String, String)>,
    Query(params): Query<PageParams>,
) -> Response {
    match segment.strip_prefix("live-") {
        Some(sport) => render_site_page(
            &state.settings,
            &request_host(&headers),
            Some(lang.as_str()),
            Some(sport),
            &params,
        ),
        None => not_found(),
    }
}

fn render_site_page(
    settings: &PortalSettings,
    host: &str,
    lang: Option<&str>,
    sport: Option<&str>,
    params: &PageParams,
) -> Response {
    let site = match resolve_site(settings, host) {
        Ok(site) => site,
        Err(e) => return error_response(&e),
    };

    let lang = match lang {
        None => site.primary_language().to_string(),
        Some(l) if l.eq_ignore_ascii_case(site.primary_language()) => {
            // The primary language lives at the root
            let path = match sport {
                Some(s) => format!("/live-{}", s),
                None => "/".to_string(),
            };
            return Redirect::permanent(&path).into_response();
        }
        Some(l) => match site.language_variants().find(|v| v.eq_ignore_ascii_case(l)) {
            Some(variant) => variant.to_string(),
            None => return not_found(),
        },
    };

    let sport = match sport {
        Some(s) => match site.sports_categories.iter().find(|c| c.eq_ignore_ascii_case(s)) {
            Some(configured) => Some(configured.clone()),
            None => return not_found(),
        },
        None => None,
    };

    let config = match load_site_config(&settings.paths, &site.domain) {
        Ok(config) => config,
        Err(e) => return error_response(&e),
    };

    let games = match load_game_data(&settings.paths.data_file) {
        Ok(games) => games,
        Err(e) => {
            warn!(path = %settings.paths.data_file.display(), error = %e, "Game data unavailable");
            return (StatusCode::INTERNAL_SERVER_ERROR, "Game data unavailable").into_response();
        }
    };

    let tab = params.tab.as_deref().map(Tab::parse).unwrap_or_default();
    let query = ListingQuery {
        offset: 0,
        limit: Some(settings.page_size),
        sport: sport.clone(),
        tab,
    };
    let listing = render_listing(
        &games,
        &query,
        &site.sports_categories,
        labels(&lang),
        settings.today(),
        &settings.timezone,
    );

    Html(render_page(&PageContext {
        site: &site,
        config: &config,
        lang: &lang,
        sport: sport.as_deref(),
        tab,
        listing: &listing,
        page_size: query.page_size(),
    }))
    .into_response()
}

#[derive(Debug, Serialize)]
struct ApiError {
    error: String,
}

fn api_error(message: impl Into<String>) -> Response {
    Json(ApiError {
        error: message.into(),
    })
    .into_response()
}

/// Query values arrive as strings so malformed numbers degrade to defaults
#[derive(Debug, Default, Deserialize)]
struct LoadGamesParams {
    offset: Option<String>,
    limit: Option<String>,
    sport: Option<String>,
    tab: Option<String>,
    lang: Option<String>,
}

#[derive(Debug, Serialize)]
struct LoadGamesResponse {
    success: bool,
    html: String,
    #[serde(rename = "hasMore")]
    has_more: bool,
    loaded: usize,
    total: usize,
}

async fn load_games_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<LoadGamesParams>,
) -> Response {
    let settings = &state.settings;

    let site = match resolve_site(settings, &request_host(&headers)) {
        Ok(site) => site,
        Err(e) => return api_error(e.to_string()),
    };
    let games = match load_game_data(&settings.paths.data_file) {
        Ok(games) => games,
        Err(e) => {
            warn!(error = %e, "Game data unavailable");
            return api_error("Game data unavailable");
        }
    };

    let lang = params
        .lang
        .as_deref()
        .filter(|l| site.serves_language(l))
        .unwrap_or(site.primary_language());
    let query = ListingQuery {
        offset: params
            .offset
            .as_deref()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0),
        limit: params.limit.as_deref().and_then(|v| v.trim().parse().ok()),
        sport: params.sport.filter(|s| !s.trim().is_empty()),
        tab: params.tab.as_deref().map(Tab::parse).unwrap_or_default(),
    };

    let page = render_listing(
        &games,
        &query,
        &site.sports_categories,
        labels(lang),
        settings.today(),
        &settings.timezone,
    );

    Json(LoadGamesResponse {
        success: true,
        html: page.html,
        has_more: page.has_more,
        loaded: page.loaded,
        total: page.total,
    })
    .into_response()
}

#[derive(Debug, Default, Deserialize)]
struct GetLinksParams {
    game_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct GetLinksResponse {
    success: bool,
    game_id: String,
    links: Vec<StreamLink>,
    count: usize,
}

async fn get_links_handler(
    State(state): State<AppState>,
    Query(params): Query<GetLinksParams>,
) -> Response {
    let Some(game_id) = params.game_id.filter(|id| !id.trim().is_empty()) else {
        return api_error("Missing game_id");
    };

    let games = match load_game_data(&state.settings.paths.data_file) {
        Ok(games) => games,
        Err(e) => {
            warn!(error = %e, "Game data unavailable");
            return api_error("Game data unavailable");
        }
    };

    match games.find(game_id.trim()) {
        Some(game) => Json(GetLinksResponse {
            success: true,
            game_id: game.id.clone(),
            links: game.links.clone(),
            count: game.links.len(),
        })
        .into_response(),
        None => api_error(format!("Game not found: {}", game_id)),
    }
}

async fn script_handler() -> Response {
    (
        [
            (header::CONTENT_TYPE, "application/javascript; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        client_script(),
    )
        .into_response()
}

async fn stylesheet_handler() -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/css; charset=utf-8"),
            (header::CACHE_CONTROL, "public, max-age=3600"),
        ],
        stylesheet(),
    )
        .into_response()
}
