// * Telemetry - JSON Logging and Prometheus Metrics
// * Logs go to stderr so stdout stays reserved for reports.

use lazy_static::lazy_static;
use prometheus::{
    register_int_counter, register_int_counter_vec, register_int_gauge, Encoder, IntCounter,
    IntCounterVec, IntGauge, TextEncoder,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

lazy_static! {
    // * Page fetches by outcome (ok, status, not_html, off_domain, ...)
    pub static ref PAGES_FETCHED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "verbatim_pages_fetched_total",
        "Pages fetched during crawls and pair comparisons, by outcome",
        &["outcome"]
    ).unwrap();

    // * Compared pairs by final status
    pub static ref PAIRS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "verbatim_pairs_total",
        "Document/page pairs processed, by status",
        &["status"]
    ).unwrap();

    // * Crawl batches dispatched to the worker pool
    pub static ref CRAWL_BATCHES_TOTAL: IntCounter = register_int_counter!(
        "verbatim_crawl_batches_total",
        "Crawl batches dispatched"
    ).unwrap();

    // * Discovered but unvisited URLs
    pub static ref FRONTIER_DEPTH: IntGauge = register_int_gauge!(
        "verbatim_frontier_depth",
        "Current crawl frontier depth"
    ).unwrap();
}

/// Initializes the tracing subscriber with JSON formatting on stderr
///
/// # Example
/// ```ignore
/// use verbatim::ops::telemetry;
///
/// telemetry::init_tracing();
/// tracing::info!(url = "https://example.com", "Crawling");
/// ```
pub fn init_tracing() {
    init_tracing_with_level("info");
}

/// Initializes tracing with a custom default level (RUST_LOG still wins)
pub fn init_tracing_with_level(level: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json().with_writer(std::io::stderr))
        .init();
}

/// Renders all registered metrics in the Prometheus text format
pub fn metrics_text() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    if encoder.encode(&metric_families, &mut buffer).is_err() {
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}

/// Records one page fetch outcome
pub fn record_page_fetch(outcome: &str) {
    PAGES_FETCHED_TOTAL.with_label_values(&[outcome]).inc();
}

/// Records one processed pair
pub fn record_pair(status: &str) {
    PAIRS_TOTAL.with_label_values(&[status]).inc();
}

/// Records one dispatched crawl batch
pub fn record_crawl_batch() {
    CRAWL_BATCHES_TOTAL.inc();
}

/// Sets the current frontier depth
pub fn set_frontier_depth(depth: usize) {
    FRONTIER_DEPTH.set(i64::try_from(depth).unwrap_or(i64::MAX));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_page_fetch() {
        let before = PAGES_FETCHED_TOTAL.with_label_values(&["ok"]).get();
        record_page_fetch("ok");
        // * Other tests may increment concurrently
        assert!(PAGES_FETCHED_TOTAL.with_label_values(&["ok"]).get() > before);
    }

    #[test]
    fn test_record_crawl_batch() {
        let before = CRAWL_BATCHES_TOTAL.get();
        record_crawl_batch();
        assert!(CRAWL_BATCHES_TOTAL.get() > before);
    }

    #[test]
    fn test_metrics_text_contains_families() {
        record_pair("ok");
        set_frontier_depth(3);
        let text = metrics_text();
        assert!(text.contains("verbatim_pairs_total"));
        assert!(text.contains("verbatim_frontier_depth"));
    }
}
