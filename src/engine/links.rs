// * Outbound link extraction
// * Anchors anywhere in the page (navigation and menus included) are followed
// * when they stay on the crawled site and do not point at a binary document.

use scraper::{Html, Selector};
use std::collections::BTreeSet;
use std::sync::LazyLock;

use super::normalization::{join_url, same_site, url_path};

static SELECTOR_LINKS: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href], area[href]").unwrap());

const SKIPPED_SCHEMES: &[&str] = &["mailto:", "tel:", "javascript:", "data:", "sms:"];

// * Documents, archives and media are never crawled
const BINARY_EXTENSIONS: &[&str] = &[
    ".pdf", ".doc", ".docx", ".xls", ".xlsx", ".ppt", ".pptx", ".odt", ".rtf", ".zip", ".rar",
    ".gz", ".7z", ".tar", ".jpg", ".jpeg", ".png", ".gif", ".svg", ".webp", ".bmp", ".ico",
    ".mp3", ".mp4", ".avi", ".mov", ".wav", ".webm", ".exe", ".dmg", ".msi", ".css", ".js",
    ".xml", ".json",
];

/// True if the URL path ends in a binary/document extension
pub fn is_binary_link(url: &str) -> bool {
    url_path(url)
        .map(|path| BINARY_EXTENSIONS.iter().any(|ext| path.ends_with(ext)))
        .unwrap_or(false)
}

/// Normalized same-site links found in `html`, resolved against `base`
/// (the page's final URL) and filtered to the site of `site`.
pub fn extract_links(html: &str, base: &str, site: &str) -> BTreeSet<String> {
    let document = Html::parse_document(html);

    document
        .select(&SELECTOR_LINKS)
        .filter_map(|a| a.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty() && !href.starts_with('#'))
        .filter(|href| {
            let lower = href.to_ascii_lowercase();
            !SKIPPED_SCHEMES.iter().any(|s| lower.starts_with(s))
        })
        .filter_map(|href| join_url(href, base))
        .filter(|url| same_site(url, site) && !is_binary_link(url))
        .collect()
}
