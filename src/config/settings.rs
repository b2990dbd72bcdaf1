// * Runtime Settings
// * Groups the policy constants into serde-loadable sections. Every field has a
// * default, so a settings file only needs the values it overrides.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use super::constants::*;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read settings file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed settings file: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid setting: {0}")]
    Invalid(String),
}

/// Alignment and scoring policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    /// Minimum block similarity for a primary match
    pub threshold: f64,
    /// Sentence similarity a partial match must exceed
    pub sentence_threshold: f64,
    /// Weight of matched length in the aggregate score
    pub content_weight: f64,
    /// Weight of matched block count in the aggregate score
    pub block_weight: f64,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            threshold: ALIGN_THRESHOLD,
            sentence_threshold: SENTENCE_THRESHOLD,
            content_weight: CONTENT_WEIGHT,
            block_weight: BLOCK_WEIGHT,
        }
    }
}

/// Crawl and fetch policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrawlConfig {
    pub max_pages: usize,
    pub batch_size: usize,
    pub workers: usize,
    pub request_delay_ms: u64,
    pub timeout_secs: u64,
    pub max_redirects: usize,
    pub user_agent: String,
    pub robots_agent: String,
    /// Honor a robots Crawl-delay larger than `request_delay_ms`
    pub respect_crawl_delay: bool,
    /// Retry an HTTPS connect failure once without certificate verification
    pub accept_invalid_certs_fallback: bool,
}

impl CrawlConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_pages: MAX_PAGES,
            batch_size: CRAWL_BATCH_SIZE,
            workers: CRAWL_WORKERS,
            request_delay_ms: REQUEST_DELAY_MS,
            timeout_secs: REQUEST_TIMEOUT_SECS,
            max_redirects: MAX_REDIRECTS,
            user_agent: USER_AGENT.to_string(),
            robots_agent: ROBOTS_AGENT.to_string(),
            respect_crawl_delay: true,
            accept_invalid_certs_fallback: false,
        }
    }
}

/// Document-to-page matching policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub url_confidence: f64,
    pub auto_accept: f64,
    pub manual_candidates: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            url_confidence: URL_CONFIDENCE,
            auto_accept: AUTO_ACCEPT_SCORE,
            manual_candidates: MANUAL_CANDIDATES,
        }
    }
}

/// Top-level settings file layout
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub compare: CompareConfig,
    pub crawl: CrawlConfig,
    pub matching: MatchConfig,
}

impl Settings {
    /// Loads and validates a JSON settings file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(raw)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let unit = |name: &str, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{} must lie in [0, 1], got {}", name, value)))
            }
        };

        unit("compare.threshold", self.compare.threshold)?;
        unit("compare.sentence_threshold", self.compare.sentence_threshold)?;
        unit("compare.content_weight", self.compare.content_weight)?;
        unit("compare.block_weight", self.compare.block_weight)?;
        unit("matching.url_confidence", self.matching.url_confidence)?;
        unit("matching.auto_accept", self.matching.auto_accept)?;

        let weight_sum = self.compare.content_weight + self.compare.block_weight;
        if (weight_sum - 1.0).abs() > 1e-9 {
            return Err(ConfigError::Invalid(format!(
                "compare weights must sum to 1, got {}",
                weight_sum
            )));
        }

        if self.crawl.batch_size == 0 || self.crawl.workers == 0 {
            return Err(ConfigError::Invalid(
                "crawl.batch_size and crawl.workers must be positive".to_string(),
            ));
        }

        Ok(())
    }
}
