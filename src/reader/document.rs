// * Plain-text / Markdown draft reader
// * Paragraphs are separated by blank lines. `#`..`######` prefixes and literal
// * `<hN>…</hN>` wrappers mark headings.

use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use super::{DocumentReader, DraftDocument, Paragraph, ReadError};
use crate::text::normalize_text;

static MARKDOWN_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+?)\s*#*$").unwrap());
static TAGGED_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)^<h([1-6])>(.*)</h[1-6]>$").unwrap());
static PARAGRAPH_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\n+").unwrap());

// * Formats that need a binary converter this reader does not provide
const BINARY_EXTENSIONS: &[&str] = &["docx", "doc", "odt", "pdf", "rtf", "pages"];

/// Reads UTF-8 `.txt` and `.md` drafts
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextDocumentReader;

impl PlainTextDocumentReader {
    pub fn new() -> Self {
        Self
    }

    /// Parses draft text that is already in memory
    pub fn parse(name: &str, raw: &str) -> Result<DraftDocument, ReadError> {
        let normalized = normalize_text(raw);
        let paragraphs: Vec<Paragraph> = PARAGRAPH_BREAK
            .split(&normalized)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(parse_paragraph)
            .collect();

        if paragraphs.is_empty() {
            return Err(ReadError::Empty(name.to_string()));
        }

        Ok(DraftDocument {
            name: name.to_string(),
            paragraphs,
        })
    }
}

fn parse_paragraph(text: &str) -> Paragraph {
    if let Some(caps) = MARKDOWN_HEADING.captures(text) {
        let level = caps[1].len() as u8;
        return Paragraph::heading(level, caps[2].trim());
    }

    if let Some(caps) = TAGGED_HEADING.captures(text) {
        if let Ok(level) = caps[1].parse::<u8>() {
            return Paragraph::heading(level, caps[2].trim());
        }
    }

    Paragraph::body(text)
}

impl DocumentReader for PlainTextDocumentReader {
    fn read(&self, path: &Path) -> Result<DraftDocument, ReadError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();
        if BINARY_EXTENSIONS.contains(&extension.as_str()) {
            return Err(ReadError::Unsupported(name));
        }

        let bytes = std::fs::read(path).map_err(|source| ReadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let raw = String::from_utf8(bytes).map_err(|_| ReadError::Encoding(name.clone()))?;

        Self::parse(&name, &raw)
    }
}
