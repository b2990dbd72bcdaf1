use url::Url;

// * Normalizes a URL into the crawler's dedup key.
// *
// * Logic:
// * 1. Parse; only http/https are crawlable.
// * 2. Lowercase scheme and host, drop the default port (handled by `url`).
// * 3. Strip the trailing slash from the path (the root path becomes empty).
// * 4. Keep the query verbatim, drop the fragment and any userinfo.
// *
// * The result re-parses to itself, so normalization is idempotent.
pub fn normalize_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    normalize_parsed(&url)
}

// * Resolves `href` against `base`, then normalizes.
pub fn join_url(href: &str, base: &str) -> Option<String> {
    let base = Url::parse(base).ok()?;
    let joined = base.join(href.trim()).ok()?;
    normalize_parsed(&joined)
}

fn normalize_parsed(url: &Url) -> Option<String> {
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?.to_lowercase();

    let mut out = format!("{}://{}", url.scheme(), host);
    if let Some(port) = url.port() {
        out.push_str(&format!(":{port}"));
    }
    out.push_str(url.path().trim_end_matches('/'));
    if let Some(query) = url.query().filter(|q| !q.is_empty()) {
        out.push('?');
        out.push_str(query);
    }
    Some(out)
}

// * Host used for same-site checks: lowercase, leading "www." removed.
pub fn site_host(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let host = url.host_str()?.to_lowercase();
    Some(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
}

// * True if both URLs point at the same site (www. prefix ignored).
pub fn same_site(a: &str, b: &str) -> bool {
    match (site_host(a), site_host(b)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

// * Lowercased path of a URL, used for extension checks and URL tokenizing.
pub fn url_path(raw: &str) -> Option<String> {
    Url::parse(raw.trim()).ok().map(|u| u.path().to_lowercase())
}
