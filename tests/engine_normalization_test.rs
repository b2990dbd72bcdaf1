use verbatim::engine::normalization::{join_url, normalize_url, same_site};

// * Test Suite for URL Normalization

#[test]
fn test_default_port_equivalence() {
    assert_eq!(normalize_url("http://h:80/a/"), normalize_url("http://h/a"));
    assert_eq!(normalize_url("https://h:443/a"), normalize_url("https://h/a/"));
}

#[test]
fn test_strip_fragment() {
    assert_eq!(
        normalize_url("https://example.com/page#section1").unwrap(),
        "https://example.com/page"
    );
}

#[test]
fn test_lowercase_host() {
    assert_eq!(
        normalize_url("https://EXAMPLE.com/Page").unwrap(),
        "https://example.com/Page"
    );
}

#[test]
fn test_query_kept_verbatim() {
    assert_eq!(
        normalize_url("https://example.com/search/?b=2&a=1").unwrap(),
        "https://example.com/search?b=2&a=1"
    );
}

#[test]
fn test_idempotent() {
    let inputs = [
        "http://Example.com:80/a/b/",
        "https://example.com/?",
        "https://example.com:8443/x?y=1#z",
        "http://example.com/a%20b/",
    ];
    for raw in inputs {
        let once = normalize_url(raw).unwrap();
        assert_eq!(normalize_url(&once).unwrap(), once);
    }
}

#[test]
fn test_join_relative() {
    assert_eq!(
        join_url("page", "https://example.com/dir/").unwrap(),
        "https://example.com/dir/page"
    );
    assert_eq!(join_url("page", "not_a_url"), None);
}

#[test]
fn test_same_site_ignores_www() {
    assert!(same_site("https://www.example.com/", "https://example.com/about"));
    assert!(!same_site("https://example.org/", "https://example.com/"));
}
