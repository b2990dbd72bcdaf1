// * Crawl engine: URL normalization, politeness, link discovery and the
// * batch coordinator.

pub mod crawler;
pub mod links;
pub mod normalization;
pub mod politeness;

pub use crawler::{CrawlError, CrawlPage, Crawler};
pub use links::{extract_links, is_binary_link};
pub use normalization::{join_url, normalize_url, same_site, site_host};
pub use politeness::{Politeness, RobotsPolicy};
