// * Manual resolution
// * Documents whose best candidate is not confident enough are handed to a
// * resolver together with the top candidates.

use serde::{Deserialize, Serialize};

use super::MatchCandidate;

/// Outcome of matching one document to a page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "url", rename_all = "snake_case")]
pub enum Resolution {
    /// Top candidate cleared the auto-accept score
    Auto(String),
    /// Resolver picked one of the offered candidates
    Accept(String),
    /// Resolver supplied a URL that was not among the candidates
    Manual(String),
    Skip,
}

impl Resolution {
    pub fn url(&self) -> Option<&str> {
        match self {
            Resolution::Auto(url) | Resolution::Accept(url) | Resolution::Manual(url) => {
                Some(url)
            }
            Resolution::Skip => None,
        }
    }
}

/// Operator-side collaborator deciding low-confidence matches
pub trait ManualResolver: Send + Sync {
    /// `candidates` holds at most the configured number of top candidates,
    /// best first. May be empty.
    fn resolve(&self, document: &str, candidates: &[MatchCandidate]) -> Resolution;
}

/// Skips every low-confidence document (non-interactive default)
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipUnresolved;

impl ManualResolver for SkipUnresolved {
    fn resolve(&self, _document: &str, _candidates: &[MatchCandidate]) -> Resolution {
        Resolution::Skip
    }
}

/// Accepts the best candidate when there is one
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptBest;

impl ManualResolver for AcceptBest {
    fn resolve(&self, _document: &str, candidates: &[MatchCandidate]) -> Resolution {
        candidates
            .first()
            .map(|c| Resolution::Accept(c.url.clone()))
            .unwrap_or(Resolution::Skip)
    }
}

/// Fixed answers per document name, for scripted runs
#[derive(Debug, Clone, Default)]
pub struct ScriptedResolver {
    answers: std::collections::HashMap<String, String>,
}

impl ScriptedResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_answer(mut self, document: impl Into<String>, url: impl Into<String>) -> Self {
        self.answers.insert(document.into(), url.into());
        self
    }
}

impl ManualResolver for ScriptedResolver {
    fn resolve(&self, document: &str, candidates: &[MatchCandidate]) -> Resolution {
        match self.answers.get(document) {
            Some(url) if candidates.iter().any(|c| &c.url == url) => Resolution::Accept(url.clone()),
            Some(url) => Resolution::Manual(url.clone()),
            None => Resolution::Skip,
        }
    }
}
