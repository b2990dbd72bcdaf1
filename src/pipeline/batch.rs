// * Batch runner
// * Two flows over a list of drafts:
// * - explicit pairs: every (document, url) pair is read, fetched and aligned
// * - auto-match: crawl the seed site, rank pages per document, resolve, align
// * A failing document or page downgrades only its own PairReport; the batch
// * always runs to the end.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use super::report::{BatchReport, PairReport, PairStatus};
use crate::config::Settings;
use crate::diff::{Aligner, Alignment};
use crate::engine::{normalize_url, CrawlError, Crawler};
use crate::matcher::{ManualResolver, MatchError, Matcher, Resolution};
use crate::network::{FetchError, PageClient};
use crate::ops::telemetry;
use crate::reader::{
    DocumentReader, DraftDocument, HtmlPageReader, PageContent, PageReader, PlainTextDocumentReader,
};
use crate::text::prepare_blocks;

/// Caller-level failures that stop a whole batch
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("No documents given")]
    NoDocuments,

    #[error(transparent)]
    Crawl(#[from] CrawlError),

    #[error(transparent)]
    Match(#[from] MatchError),

    #[error("HTTP client setup failed: {0}")]
    Client(#[from] FetchError),
}

/// One explicit document/URL pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairRequest {
    pub document: PathBuf,
    pub url: String,
}

impl PairRequest {
    pub fn new(document: impl Into<PathBuf>, url: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            url: url.into(),
        }
    }

    /// Parses `DOC=URL`
    pub fn parse(raw: &str) -> Option<Self> {
        let (document, url) = raw.split_once('=')?;
        let (document, url) = (document.trim(), url.trim());
        if document.is_empty() || url.is_empty() {
            return None;
        }
        Some(Self::new(document, url))
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .unwrap_or_else(|| path.display().to_string())
}

pub struct BatchRunner<D = PlainTextDocumentReader, P = HtmlPageReader> {
    settings: Settings,
    client: Arc<PageClient>,
    documents: D,
    pages: Arc<P>,
    aligner: Aligner,
    matcher: Matcher,
}

impl BatchRunner {
    /// Runner with the plain-text draft reader and the HTML page reader
    pub fn new(settings: Settings) -> Result<Self, BatchError> {
        Self::with_readers(settings, PlainTextDocumentReader::new(), HtmlPageReader::new())
    }
}

impl<D: DocumentReader, P: PageReader + 'static> BatchRunner<D, P> {
    pub fn with_readers(settings: Settings, documents: D, pages: P) -> Result<Self, BatchError> {
        let client = Arc::new(PageClient::new(&settings.crawl)?);
        Ok(Self {
            aligner: Aligner::with_config(settings.compare.clone()),
            matcher: Matcher::with_config(settings.matching.clone()),
            settings,
            client,
            documents,
            pages: Arc::new(pages),
        })
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Aligns a draft against extracted page content
    pub fn compare_content(&self, document: &DraftDocument, content: &str) -> Alignment {
        let draft = prepare_blocks(&document.to_text());
        let live = prepare_blocks(content);
        self.aligner.align(&draft, &live)
    }

    async fn fetch_content(&self, url: &str) -> Result<PageContent, FetchError> {
        let fetched = self.client.fetch_html(url).await;
        let fetched = match fetched {
            Ok(f) => f,
            Err(e) => {
                telemetry::record_page_fetch(e.kind());
                return Err(e);
            }
        };
        let content = self.pages.read(&fetched.html);
        if !content.has_content() {
            telemetry::record_page_fetch("no_content");
            return Err(FetchError::NoContent(url.to_string()));
        }
        telemetry::record_page_fetch("ok");
        Ok(content)
    }

    /// Reads, fetches and aligns one explicit pair
    pub async fn compare_pair(&self, document: &Path, url: &str) -> PairReport {
        let name = display_name(document);
        let draft = match self.documents.read(document) {
            Ok(d) => d,
            Err(e) => return finish(PairReport::failed(name, Some(url.to_string()), PairStatus::ParseError, e)),
        };
        self.compare_fetched(&draft, url).await
    }

    async fn compare_fetched(&self, draft: &DraftDocument, url: &str) -> PairReport {
        let report = match self.fetch_content(url).await {
            Ok(content) => {
                let alignment = self.compare_content(draft, &content.to_text());
                PairReport::ok(
                    draft.name.clone(),
                    url,
                    content.title,
                    content.meta_description,
                    alignment,
                )
            }
            Err(e) => PairReport::failed(draft.name.clone(), Some(url.to_string()), PairStatus::FetchError, e),
        };
        finish(report)
    }

    /// Processes explicit pairs in order
    pub async fn run_pairs(&self, pairs: &[PairRequest]) -> Result<BatchReport, BatchError> {
        if pairs.is_empty() {
            return Err(BatchError::NoDocuments);
        }
        info!(pairs = pairs.len(), "Batch started");

        let mut reports = Vec::with_capacity(pairs.len());
        for pair in pairs {
            reports.push(self.compare_pair(&pair.document, &pair.url).await);
        }

        let report = BatchReport::new(reports);
        info!(ok = report.count(PairStatus::Ok), total = report.pairs.len(), "Batch finished");
        Ok(report)
    }

    /// Crawls `seed`, matches every document to a page and aligns it.
    /// Crawled content is reused; only manually supplied URLs are fetched again.
    pub async fn run_auto(
        &self,
        seed: &str,
        documents: &[PathBuf],
        resolver: &dyn ManualResolver,
    ) -> Result<BatchReport, BatchError> {
        if documents.is_empty() {
            return Err(BatchError::NoDocuments);
        }

        // * Parse failures keep their slot in the report
        let mut slots: Vec<Result<DraftDocument, PairReport>> = Vec::with_capacity(documents.len());
        for path in documents {
            slots.push(self.documents.read(path).map_err(|e| {
                finish(PairReport::failed(display_name(path), None, PairStatus::ParseError, e))
            }));
        }

        let readable: Vec<DraftDocument> = slots.iter().filter_map(|s| s.as_ref().ok().cloned()).collect();
        if readable.is_empty() {
            warn!("No readable documents, skipping crawl");
            let pairs = slots.into_iter().filter_map(Result::err).collect();
            return Ok(BatchReport {
                seed: Some(seed.to_string()),
                pages_crawled: None,
                pairs,
            });
        }

        let crawler = Crawler::new(
            self.settings.crawl.clone(),
            Arc::clone(&self.client),
            Arc::clone(&self.pages),
        );
        let pages = crawler.crawl(seed).await?;
        let matches = self.matcher.match_documents(&readable, &pages)?;
        let mut matches = matches.into_iter();

        let mut reports = Vec::with_capacity(slots.len());
        for slot in slots {
            let draft = match slot {
                Ok(draft) => draft,
                Err(failed) => {
                    reports.push(failed);
                    continue;
                }
            };
            let Some(matched) = matches.next() else {
                break;
            };

            let resolution = self.matcher.resolve(&matched, resolver);
            let report = match &resolution {
                Resolution::Skip => finish(PairReport::skipped(draft.name.clone())),
                Resolution::Auto(url) | Resolution::Accept(url) | Resolution::Manual(url) => {
                    let crawled = normalize_url(url).and_then(|key| pages.get(&key));
                    match crawled {
                        Some(page) => {
                            let alignment = self.compare_content(&draft, &page.content);
                            finish(PairReport::ok(
                                draft.name.clone(),
                                page.url.clone(),
                                page.title.clone(),
                                page.meta_description.clone(),
                                alignment,
                            ))
                        }
                        None => self.compare_fetched(&draft, url).await,
                    }
                }
            };
            reports.push(report.with_resolution(resolution));
        }

        let report = BatchReport {
            seed: Some(seed.to_string()),
            pages_crawled: Some(pages.len()),
            pairs: reports,
        };
        info!(
            ok = report.count(PairStatus::Ok),
            skipped = report.count(PairStatus::Skipped),
            total = report.pairs.len(),
            "Auto-match batch finished"
        );
        Ok(report)
    }
}

// * Logs and counts a finished pair
fn finish(report: PairReport) -> PairReport {
    telemetry::record_pair(report.status.as_str());
    match report.status {
        PairStatus::Ok => info!(
            document = %report.document,
            url = report.url.as_deref().unwrap_or_default(),
            similarity = report.similarity.unwrap_or_default(),
            "Pair compared"
        ),
        status => warn!(
            document = %report.document,
            url = report.url.as_deref().unwrap_or_default(),
            status = status.as_str(),
            error = report.error.as_deref().unwrap_or_default(),
            "Pair not compared"
        ),
    }
    report
}
