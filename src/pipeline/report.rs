// * Batch report
// * Structured result of a batch run: one PairReport per document, in input
// * order, with a per-pair status. Rendered as JSON or Markdown.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

use crate::diff::{Alignment, AlignmentRecord, AlignmentTag};
use crate::matcher::Resolution;

/// Per-pair processing status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PairStatus {
    Ok,
    FetchError,
    ParseError,
    Skipped,
}

impl PairStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PairStatus::Ok => "ok",
            PairStatus::FetchError => "fetchError",
            PairStatus::ParseError => "parseError",
            PairStatus::Skipped => "skipped",
        }
    }
}

/// Similarity verdict bands used in rendered reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    MostlyIdentical,
    MinorDifferences,
    SignificantlyDifferent,
}

impl Verdict {
    pub fn from_similarity(similarity: f64) -> Self {
        if similarity > 0.95 {
            Verdict::MostlyIdentical
        } else if similarity > 0.75 {
            Verdict::MinorDifferences
        } else {
            Verdict::SignificantlyDifferent
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            Verdict::MostlyIdentical => "✅ Content is mostly identical.",
            Verdict::MinorDifferences => "⚠️ Content has minor differences.",
            Verdict::SignificantlyDifferent => "❌ Content is significantly different.",
        }
    }
}

/// Result for one document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PairReport {
    pub document: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    pub status: PairStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub similarity: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verdict: Option<Verdict>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<AlignmentRecord>,
    /// How the URL was chosen (auto-match runs only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PairReport {
    pub fn ok(
        document: impl Into<String>,
        url: impl Into<String>,
        title: impl Into<String>,
        meta_description: impl Into<String>,
        alignment: Alignment,
    ) -> Self {
        Self {
            document: document.into(),
            url: Some(url.into()),
            status: PairStatus::Ok,
            title: Some(title.into()),
            meta_description: Some(meta_description.into()),
            similarity: Some(alignment.similarity),
            verdict: Some(Verdict::from_similarity(alignment.similarity)),
            records: alignment.records,
            resolution: None,
            error: None,
        }
    }

    pub fn failed(
        document: impl Into<String>,
        url: Option<String>,
        status: PairStatus,
        error: impl ToString,
    ) -> Self {
        Self {
            document: document.into(),
            url,
            status,
            title: None,
            meta_description: None,
            similarity: None,
            verdict: None,
            records: Vec::new(),
            resolution: None,
            error: Some(error.to_string()),
        }
    }

    pub fn skipped(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            url: None,
            status: PairStatus::Skipped,
            title: None,
            meta_description: None,
            similarity: None,
            verdict: None,
            records: Vec::new(),
            resolution: Some(Resolution::Skip),
            error: None,
        }
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = Some(resolution);
        self
    }

    fn heading(&self) -> String {
        match &self.url {
            Some(url) => format!("## {} vs {}", self.document, url),
            None => format!("## {}", self.document),
        }
    }

    /// Markdown section for this pair
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self.heading());

        match self.status {
            PairStatus::Ok => {
                let similarity = self.similarity.unwrap_or_default();
                let _ = writeln!(out, "**Page Title**: {}\n", self.title.as_deref().unwrap_or_default());
                let _ = writeln!(
                    out,
                    "**Meta Description**: {}\n",
                    self.meta_description.as_deref().unwrap_or_default()
                );
                let _ = writeln!(out, "**Similarity Score**: `{:.2}%`\n", similarity * 100.0);
                let _ = writeln!(out, "{}\n", Verdict::from_similarity(similarity).message());
                let _ = writeln!(out, "### Differences");
                for record in &self.records {
                    match record {
                        AlignmentRecord::Matched { draft_text, .. } => {
                            let _ = writeln!(out, "✅ MATCHED: {draft_text}");
                        }
                        AlignmentRecord::Missing { draft_text } => {
                            let _ = writeln!(out, "🟥 MISSING: {draft_text}");
                        }
                        AlignmentRecord::Current { live_text } => {
                            let _ = writeln!(out, "🟩 CURRENT: {live_text}");
                        }
                    }
                }
            }
            PairStatus::Skipped => {
                let _ = writeln!(out, "⏭️ Skipped: no page selected");
            }
            PairStatus::FetchError | PairStatus::ParseError => {
                let _ = writeln!(
                    out,
                    "❌ {}: {}",
                    self.status.as_str(),
                    self.error.as_deref().unwrap_or("unknown error")
                );
            }
        }
        out.push('\n');
        out
    }
}

/// Result of one batch run
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Seed URL for auto-match runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pages_crawled: Option<usize>,
    pub pairs: Vec<PairReport>,
}

impl BatchReport {
    pub fn new(pairs: Vec<PairReport>) -> Self {
        Self {
            seed: None,
            pages_crawled: None,
            pairs,
        }
    }

    pub fn statuses(&self) -> Vec<PairStatus> {
        self.pairs.iter().map(|p| p.status).collect()
    }

    pub fn count(&self, status: PairStatus) -> usize {
        self.pairs.iter().filter(|p| p.status == status).count()
    }

    /// Total alignment rows with `tag` across successful pairs
    pub fn record_count(&self, tag: AlignmentTag) -> usize {
        self.pairs
            .iter()
            .flat_map(|p| &p.records)
            .filter(|r| r.tag() == tag)
            .count()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Full Markdown report: summary list followed by one section per pair
    pub fn to_markdown(&self) -> String {
        let mut out = String::from("# Verbatim Comparison Report\n\n");
        if let Some(seed) = &self.seed {
            let _ = writeln!(out, "**Site**: {seed}\n");
        }
        if let Some(pages) = self.pages_crawled {
            let _ = writeln!(out, "**Pages crawled**: {pages}\n");
        }

        let _ = writeln!(out, "## Summary");
        for pair in &self.pairs {
            let target = pair.url.as_deref().unwrap_or("-");
            match (pair.status, pair.similarity) {
                (PairStatus::Ok, Some(similarity)) => {
                    let _ = writeln!(
                        out,
                        "- {} → {}: {:.2}%",
                        pair.document,
                        target,
                        similarity * 100.0
                    );
                }
                (status, _) => {
                    let _ = writeln!(out, "- {} → {}: {}", pair.document, target, status.as_str());
                }
            }
        }
        out.push('\n');

        for pair in &self.pairs {
            out.push_str(&pair.to_markdown());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alignment() -> Alignment {
        Alignment {
            records: vec![
                AlignmentRecord::Matched {
                    draft_text: "<h1>Home</h1>".into(),
                    live_text: "<h1>Home</h1>".into(),
                    score: 1.0,
                },
                AlignmentRecord::Missing {
                    draft_text: "Old line.".into(),
                },
                AlignmentRecord::Current {
                    live_text: "New line.".into(),
                },
            ],
            similarity: 0.8123,
        }
    }

    #[test]
    fn test_verdict_bands() {
        assert_eq!(Verdict::from_similarity(0.96), Verdict::MostlyIdentical);
        assert_eq!(Verdict::from_similarity(0.95), Verdict::MinorDifferences);
        assert_eq!(Verdict::from_similarity(0.76), Verdict::MinorDifferences);
        assert_eq!(Verdict::from_similarity(0.75), Verdict::SignificantlyDifferent);
    }

    #[test]
    fn test_status_serialization() {
        let statuses = [
            PairStatus::Ok,
            PairStatus::FetchError,
            PairStatus::ParseError,
            PairStatus::Skipped,
        ];
        let json = serde_json::to_string(&statuses).unwrap();
        assert_eq!(json, r#"["ok","fetchError","parseError","skipped"]"#);
        for s in statuses {
            assert_eq!(serde_json::to_string(&s).unwrap(), format!("\"{}\"", s.as_str()));
        }
    }

    #[test]
    fn test_pair_markdown() {
        let pair = PairReport::ok("home.txt", "https://example.com", "Home", "Desc", alignment());
        let md = pair.to_markdown();
        assert!(md.starts_with("## home.txt vs https://example.com\n"));
        assert!(md.contains("**Similarity Score**: `81.23%`"));
        assert!(md.contains("⚠️ Content has minor differences."));
        assert!(md.contains("✅ MATCHED: <h1>Home</h1>\n🟥 MISSING: Old line.\n🟩 CURRENT: New line.\n"));
    }

    #[test]
    fn test_failed_pair_markdown() {
        let pair = PairReport::failed("bad.txt", None, PairStatus::ParseError, "bad.txt contains no paragraphs");
        assert_eq!(
            pair.to_markdown(),
            "## bad.txt\n❌ parseError: bad.txt contains no paragraphs\n\n"
        );
    }

    #[test]
    fn test_batch_report_json_and_counts() {
        let report = BatchReport::new(vec![
            PairReport::ok("a.txt", "https://example.com/a", "A", "", alignment()),
            PairReport::failed("b.txt", Some("https://example.com/b".into()), PairStatus::FetchError, "HTTP 500"),
            PairReport::skipped("c.txt"),
        ]);
        assert_eq!(
            report.statuses(),
            vec![PairStatus::Ok, PairStatus::FetchError, PairStatus::Skipped]
        );
        assert_eq!(report.count(PairStatus::Ok), 1);
        assert_eq!(report.record_count(AlignmentTag::Missing), 1);

        let value: serde_json::Value = serde_json::from_str(&report.to_json_pretty()).unwrap();
        assert_eq!(value["pairs"][1]["status"], "fetchError");
        assert_eq!(value["pairs"][0]["records"][2]["tag"], "current");
        assert!(value["pairs"][1].get("records").is_none());

        let md = report.to_markdown();
        assert!(md.contains("- a.txt → https://example.com/a: 81.23%"));
        assert!(md.contains("- b.txt → https://example.com/b: fetchError"));
        assert!(md.contains("- c.txt → -: skipped"));
    }
}
