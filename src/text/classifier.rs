// * Content Classifier
// * Assigns every block exactly one semantic type from its leading token or markup.
// * Priority: metadata prefixes, then heading wrappers, then generic content.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

static HEADING_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^<h([1-6])(?:\s[^>]*)?>").unwrap());
static MARKUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Semantic category of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Heading(u8),
    PageName,
    InternalReference,
    PageLink,
    MetaTitle,
    MetaDescription,
    Content,
}

// * Metadata prefixes in match order
const METADATA_PREFIXES: &[(&str, ContentType)] = &[
    ("Page Name:", ContentType::PageName),
    ("Internal Reference:", ContentType::InternalReference),
    ("Page Link:", ContentType::PageLink),
    ("Meta Title:", ContentType::MetaTitle),
    ("Meta Description:", ContentType::MetaDescription),
];

impl ContentType {
    /// Headings and metadata only ever match verbatim
    pub fn requires_exact_match(self) -> bool {
        !matches!(self, ContentType::Content)
    }

    pub fn is_heading(self) -> bool {
        matches!(self, ContentType::Heading(_))
    }

    pub fn prefix(self) -> Option<&'static str> {
        METADATA_PREFIXES
            .iter()
            .find(|(_, kind)| *kind == self)
            .map(|(prefix, _)| *prefix)
    }
}

/// Classifies a block of text. Pure and total.
pub fn classify(text: &str) -> ContentType {
    for (prefix, kind) in METADATA_PREFIXES {
        if text.starts_with(prefix) {
            return *kind;
        }
    }

    if let Some(level) = HEADING_OPEN
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<u8>().ok())
    {
        return ContentType::Heading(level);
    }

    ContentType::Content
}

/// Removes markup and the type prefix, leaving the text compared for exact matches
pub fn clean_text(text: &str, kind: ContentType) -> String {
    let stripped = MARKUP.replace_all(text, "");
    let stripped = stripped.trim();
    match kind.prefix() {
        Some(prefix) => stripped.strip_prefix(prefix).unwrap_or(stripped).trim().to_string(),
        None => stripped.to_string(),
    }
}
