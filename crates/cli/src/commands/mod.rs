pub mod robots;
pub mod serve;
pub mod sitemap;
pub mod template;
pub mod validate;
