//! Rendering for the portal: sitemaps, robots.txt and game listings.

pub mod escape;
pub mod lastmod;
pub mod listing;
pub mod robots;
pub mod sitemap;

pub use lastmod::{LastmodEntry, LastmodStore};
pub use listing::{ListingPage, ListingQuery, Tab, render_listing};
pub use robots::{render_robots, robots_for_host};
pub use sitemap::{SitemapUrl, generate_sitemap, render_sitemap_xml, sitemap_for_host};
