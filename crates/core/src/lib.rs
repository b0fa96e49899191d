pub mod config;
pub mod domain;
pub mod error;
pub mod i18n;
pub mod types;

pub use config::{PortalPaths, load_game_data, load_registry, load_site_config};
pub use domain::{DomainIndex, normalize_domain, normalize_host};
pub use error::{Error, Result};
pub use types::*;
