//! Languages the portal can serve, and the UI strings for each.

pub const DEFAULT_LANGUAGE: &str = "en";

/// Every language code the portal knows how to render
pub const SUPPORTED_LANGUAGES: &[&str] = &["en", "es", "fr", "de", "it", "pt"];

/// UI strings for one language
#[derive(Debug, Clone, Copy)]
pub struct Labels {
    pub all: &'static str,
    pub live: &'static str,
    pub today: &'static str,
    pub upcoming: &'static str,
    pub favorites: &'static str,
    pub no_games: &'static str,
    pub loading: &'static str,
    pub no_links: &'static str,
    pub dark_mode: &'static str,
    pub vs: &'static str,
}

const EN: Labels = Labels {
    all: "All",
    live: "Live",
    today: "Today",
    upcoming: "Upcoming",
    favorites: "Favorites",
    no_games: "No games scheduled right now.",
    loading: "Loading...",
    no_links: "No streams available yet.",
    dark_mode: "Dark mode",
    vs: "vs",
};

const ES: Labels = Labels {
    all: "Todos",
    live: "En vivo",
    today: "Hoy",
    upcoming: "Próximos",
    favorites: "Favoritos",
    no_games: "No hay partidos programados ahora mismo.",
    loading: "Cargando...",
    no_links: "Todavía no hay enlaces disponibles.",
    dark_mode: "Modo oscuro",
    vs: "vs",
};

const FR: Labels = Labels {
    all: "Tous",
    live: "En direct",
    today: "Aujourd'hui",
    upcoming: "À venir",
    favorites: "Favoris",
    no_games: "Aucun match programmé pour le moment.",
    loading: "Chargement...",
    no_links: "Aucun flux disponible pour le moment.",
    dark_mode: "Mode sombre",
    vs: "contre",
};

const DE: Labels = Labels {
    all: "Alle",
    live: "Live",
    today: "Heute",
    upcoming: "Demnächst",
    favorites: "Favoriten",
    no_games: "Derzeit sind keine Spiele geplant.",
    loading: "Wird geladen...",
    no_links: "Noch keine Streams verfügbar.",
    dark_mode: "Dunkelmodus",
    vs: "gegen",
};

const IT: Labels = Labels {
    all: "Tutti",
    live: "In diretta",
    today: "Oggi",
    upcoming: "Prossimi",
    favorites: "Preferiti",
    no_games: "Nessuna partita in programma al momento.",
    loading: "Caricamento...",
    no_links: "Nessuno stream ancora disponibile.",
    dark_mode: "Modalità scura",
    vs: "vs",
};

const PT: Labels = Labels {
    all: "Todos",
    live: "Ao vivo",
    today: "Hoje",
    upcoming: "Próximos",
    favorites: "Favoritos",
    no_games: "Nenhum jogo programado no momento.",
    loading: "Carregando...",
    no_links: "Nenhuma transmissão disponível ainda.",
    dark_mode: "Modo escuro",
    vs: "x",
};

pub fn is_supported(lang: &str) -> bool {
    SUPPORTED_LANGUAGES.contains(&lang)
}

/// Labels for `lang`; unknown codes get English
pub fn labels(lang: &str) -> &'static Labels {
    match lang {
        "es" => &ES,
        "fr" => &FR,
        "de" => &DE,
        "it" => &IT,
        "pt" => &PT,
        _ => &EN,
    }
}
