// * Site Crawler
// * Single-owner coordinator: only `Crawler::crawl` touches the frontier,
// * discovered set, visited set and result map. Workers fetch and parse one
// * URL each and hand the result back; results are merged in batch order.
// *
// * Frontier order is FIFO and links are queued in sorted order, so a site
// * that serves the same responses is crawled in the same order every run.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet, VecDeque};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};
use url::Url;

use super::links::extract_links;
use super::normalization::{normalize_url, same_site};
use super::politeness::{Politeness, RobotsPolicy};
use crate::config::CrawlConfig;
use crate::network::{FetchError, PageClient};
use crate::ops::telemetry;
use crate::reader::{HtmlPageReader, PageReader};

/// One fetched, same-site HTML page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlPage {
    /// URL the page was served from (after redirects)
    pub url: String,
    /// Dedup key
    pub normalized_url: String,
    pub title: String,
    pub meta_description: String,
    /// Content paragraphs joined by blank lines
    pub content: String,
    pub outbound_links: BTreeSet<String>,
}

/// Caller-level crawl failures; per-URL problems never surface here
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("Invalid seed URL: {0}")]
    InvalidSeed(String),

    #[error("No crawlable pages found from {0}")]
    NoPages(String),

    #[error("HTTP client setup failed: {0}")]
    Client(#[from] FetchError),
}

// * Shared, read-only state handed to every worker
struct WorkerContext<R> {
    client: Arc<PageClient>,
    reader: Arc<R>,
    politeness: Politeness,
    site: String,
}

pub struct Crawler<R = HtmlPageReader> {
    config: CrawlConfig,
    client: Arc<PageClient>,
    reader: Arc<R>,
}

impl Crawler<HtmlPageReader> {
    /// Creates a crawler with its own client and the default page reader
    pub fn from_config(config: CrawlConfig) -> Result<Self, CrawlError> {
        let client = Arc::new(PageClient::new(&config)?);
        Ok(Self::new(config, client, Arc::new(HtmlPageReader::new())))
    }
}

impl<R: PageReader + 'static> Crawler<R> {
    pub fn new(config: CrawlConfig, client: Arc<PageClient>, reader: Arc<R>) -> Self {
        Self {
            config,
            client,
            reader,
        }
    }

    pub fn config(&self) -> &CrawlConfig {
        &self.config
    }

    /// Crawls the seed's site up to the configured page cap
    pub async fn crawl(&self, seed: &str) -> Result<BTreeMap<String, CrawlPage>, CrawlError> {
        self.crawl_with_limit(seed, self.config.max_pages).await
    }

    /// Crawls the seed's site, visiting at most `max_pages` URLs.
    /// Returns pages keyed by normalized URL.
    pub async fn crawl_with_limit(
        &self,
        seed: &str,
        max_pages: usize,
    ) -> Result<BTreeMap<String, CrawlPage>, CrawlError> {
        let seed_url = Url::parse(seed.trim()).map_err(|_| CrawlError::InvalidSeed(seed.to_string()))?;
        let seed_key = normalize_url(seed_url.as_str())
            .ok_or_else(|| CrawlError::InvalidSeed(seed.to_string()))?;

        let robots = RobotsPolicy::fetch(&self.client, &seed_url, &self.config.robots_agent).await;
        let crawl_delay = if self.config.respect_crawl_delay {
            robots.crawl_delay()
        } else {
            None
        };

        let context = Arc::new(WorkerContext {
            client: Arc::clone(&self.client),
            reader: Arc::clone(&self.reader),
            politeness: Politeness::new(self.config.request_delay(), crawl_delay),
            site: seed_key.clone(),
        });
        let workers = Arc::new(Semaphore::new(self.config.workers.max(1)));

        let mut frontier: VecDeque<String> = VecDeque::from([seed_key.clone()]);
        let mut discovered: HashSet<String> = HashSet::from([seed_key.clone()]);
        let mut visited: HashSet<String> = HashSet::new();
        let mut pages: BTreeMap<String, CrawlPage> = BTreeMap::new();

        info!(seed = %seed_key, max_pages, "Crawl started");

        while !frontier.is_empty() && visited.len() < max_pages {
            let room = self.config.batch_size.max(1).min(max_pages - visited.len());
            let mut batch = Vec::with_capacity(room);
            while batch.len() < room {
                let Some(url) = frontier.pop_front() else {
                    break;
                };
                if visited.contains(&url) {
                    continue;
                }
                if !robots.is_allowed(&url) {
                    debug!(url = %url, "Disallowed by robots policy");
                    continue;
                }
                visited.insert(url.clone());
                batch.push(url);
            }
            if batch.is_empty() {
                continue;
            }

            telemetry::record_crawl_batch();
            debug!(size = batch.len(), frontier = frontier.len(), "Dispatching batch");

            for (url, result) in fetch_batch(&context, &workers, batch).await {
                match result {
                    Ok(page) => {
                        telemetry::record_page_fetch("ok");
                        // * Redirects can land on a page we already hold
                        if pages.contains_key(&page.normalized_url) {
                            debug!(url = %url, target = %page.normalized_url, "Duplicate after redirect");
                            continue;
                        }
                        visited.insert(page.normalized_url.clone());
                        discovered.insert(page.normalized_url.clone());
                        for link in &page.outbound_links {
                            if discovered.insert(link.clone()) {
                                frontier.push_back(link.clone());
                            }
                        }
                        pages.insert(page.normalized_url.clone(), page);
                    }
                    Err(e) => {
                        telemetry::record_page_fetch(e.kind());
                        debug!(url = %url, error = %e, "Dropped URL");
                    }
                }
            }
            telemetry::set_frontier_depth(frontier.len());
        }

        telemetry::set_frontier_depth(0);
        info!(
            seed = %seed_key,
            pages = pages.len(),
            visited = visited.len(),
            "Crawl finished"
        );

        if pages.is_empty() {
            return Err(CrawlError::NoPages(seed_key));
        }
        Ok(pages)
    }
}

// * Runs one batch across the worker pool; output is in batch order.
async fn fetch_batch<R: PageReader + 'static>(
    context: &Arc<WorkerContext<R>>,
    workers: &Arc<Semaphore>,
    batch: Vec<String>,
) -> Vec<(String, Result<CrawlPage, FetchError>)> {
    let handles: Vec<_> = batch
        .into_iter()
        .map(|url| {
            let context = Arc::clone(context);
            let workers = Arc::clone(workers);
            let task_url = url.clone();
            let handle = tokio::spawn(async move {
                let _permit = workers
                    .acquire_owned()
                    .await
                    .map_err(|e| FetchError::Worker(e.to_string()))?;
                context.politeness.wait().await;
                fetch_page(&context, &task_url).await
            });
            (url, handle)
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for (url, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => {
                warn!(url = %url, error = %e, "Fetch worker panicked");
                Err(FetchError::Worker(e.to_string()))
            }
        };
        results.push((url, result));
    }
    results
}

// * Worker body: fetch, check the final URL, read, extract links.
async fn fetch_page<R: PageReader>(
    context: &WorkerContext<R>,
    url: &str,
) -> Result<CrawlPage, FetchError> {
    let fetched = context.client.fetch_html(url).await?;

    if !same_site(&fetched.final_url, &context.site) {
        return Err(FetchError::OffDomain(fetched.final_url));
    }
    let normalized_url = normalize_url(&fetched.final_url)
        .ok_or_else(|| FetchError::InvalidUrl(fetched.final_url.clone()))?;

    let content = context.reader.read(&fetched.html);
    let outbound_links = extract_links(&fetched.html, &fetched.final_url, &context.site);

    Ok(CrawlPage {
        url: fetched.final_url,
        normalized_url,
        title: content.title.clone(),
        meta_description: content.meta_description.clone(),
        content: content.to_text(),
        outbound_links,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalid_seed() {
        let crawler = Crawler::from_config(CrawlConfig::default()).unwrap();
        assert!(matches!(
            crawler.crawl("not a url").await,
            Err(CrawlError::InvalidSeed(_))
        ));
        assert!(matches!(
            crawler.crawl("ftp://example.com/").await,
            Err(CrawlError::InvalidSeed(_))
        ));
    }

    #[test]
    fn test_crawl_page_serialization() {
        let page = CrawlPage {
            url: "https://example.com/".into(),
            normalized_url: "https://example.com".into(),
            title: "Home".into(),
            meta_description: String::new(),
            content: "<h1>Home</h1>".into(),
            outbound_links: BTreeSet::new(),
        };
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["normalized_url"], "https://example.com");
    }
}
