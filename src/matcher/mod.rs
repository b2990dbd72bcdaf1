// * Document-to-page Matcher
// * Ranks crawled pages for every draft by a blend of URL-path similarity and
// * content similarity, auto-accepts confident matches and routes the rest to
// * a ManualResolver.

pub mod resolver;

pub use resolver::{AcceptBest, ManualResolver, Resolution, ScriptedResolver, SkipUnresolved};

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::constants::{MATCH_PRIMARY_WEIGHT, MATCH_SECONDARY_WEIGHT};
use crate::config::MatchConfig;
use crate::diff::ratio;
use crate::engine::{normalization::url_path, CrawlPage};
use crate::reader::DraftDocument;
use crate::text::normalize_text;

#[derive(Debug, Error)]
pub enum MatchError {
    #[error("No documents to match")]
    NoDocuments,

    #[error("No crawled pages to match against")]
    NoPages,
}

/// One ranked page for a document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchCandidate {
    /// Normalized page URL
    pub url: String,
    pub url_similarity: f64,
    pub content_similarity: f64,
    pub combined_score: f64,
}

/// Ranked candidates for one document, best first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMatch {
    pub document: String,
    pub candidates: Vec<MatchCandidate>,
}

impl DocumentMatch {
    pub fn best(&self) -> Option<&MatchCandidate> {
        self.candidates.first()
    }

    /// Top `n` candidates
    pub fn top(&self, n: usize) -> &[MatchCandidate] {
        &self.candidates[..n.min(self.candidates.len())]
    }
}

/// Lowercased path words: `/`, `-`, `_` and `.` become spaces
pub fn url_tokens(path: &str) -> String {
    path.to_lowercase()
        .replace(['/', '-', '_', '.'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Blends URL and content similarity. A URL similarity above
/// `url_confidence` makes the URL the dominant signal.
/// Both inputs in [0, 1] give a result in [0, 1].
pub fn combined_score(url_similarity: f64, content_similarity: f64, url_confidence: f64) -> f64 {
    let score = if url_similarity > url_confidence {
        url_similarity * MATCH_PRIMARY_WEIGHT + content_similarity * MATCH_SECONDARY_WEIGHT
    } else {
        url_similarity * MATCH_SECONDARY_WEIGHT + content_similarity * MATCH_PRIMARY_WEIGHT
    };
    score.clamp(0.0, 1.0)
}

#[derive(Debug, Clone, Default)]
pub struct Matcher {
    config: MatchConfig,
}

impl Matcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: MatchConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Ranks every page for one document. Ties keep page-key order.
    pub fn rank(&self, document: &DraftDocument, pages: &BTreeMap<String, CrawlPage>) -> DocumentMatch {
        let doc_tokens = url_tokens(document.stem());
        let doc_text = normalize_text(&document.to_text());

        let mut candidates: Vec<MatchCandidate> = pages
            .values()
            .map(|page| {
                let path = url_path(&page.normalized_url).unwrap_or_default();
                let url_similarity = ratio(&url_tokens(&path), &doc_tokens);
                let content_similarity = ratio(&doc_text, &normalize_text(&page.content));
                MatchCandidate {
                    url: page.normalized_url.clone(),
                    url_similarity,
                    content_similarity,
                    combined_score: combined_score(
                        url_similarity,
                        content_similarity,
                        self.config.url_confidence,
                    ),
                }
            })
            .collect();

        // * Stable: equal scores stay in first-seen order
        candidates.sort_by(|a, b| {
            b.combined_score
                .partial_cmp(&a.combined_score)
                .unwrap_or(Ordering::Equal)
        });

        DocumentMatch {
            document: document.name.clone(),
            candidates,
        }
    }

    /// Ranks pages for every document
    pub fn match_documents(
        &self,
        documents: &[DraftDocument],
        pages: &BTreeMap<String, CrawlPage>,
    ) -> Result<Vec<DocumentMatch>, MatchError> {
        if documents.is_empty() {
            return Err(MatchError::NoDocuments);
        }
        if pages.is_empty() {
            return Err(MatchError::NoPages);
        }
        Ok(documents.iter().map(|d| self.rank(d, pages)).collect())
    }

    /// Auto-accepts the top candidate above the auto-accept score,
    /// otherwise asks the resolver with the top candidates.
    pub fn resolve(&self, matched: &DocumentMatch, resolver: &dyn ManualResolver) -> Resolution {
        if let Some(best) = matched.best() {
            if best.combined_score > self.config.auto_accept {
                info!(
                    document = %matched.document,
                    url = %best.url,
                    score = best.combined_score,
                    "Auto-accepted match"
                );
                return Resolution::Auto(best.url.clone());
            }
        }

        let offered = matched.top(self.config.manual_candidates);
        let resolution = resolver.resolve(&matched.document, offered);
        debug!(
            document = %matched.document,
            offered = offered.len(),
            resolution = ?resolution,
            "Manual resolution"
        );
        resolution
    }
}
