// * Operations: structured logging and process-local metrics

pub mod telemetry;

pub use telemetry::{
    init_tracing, init_tracing_with_level, metrics_text, record_crawl_batch, record_page_fetch,
    record_pair, set_frontier_depth,
};
