// * Reader Collaborators
// * Turn source material into ordered paragraph text:
// * - DocumentReader: draft file -> paragraphs tagged with an optional heading level
// * - PageReader: HTML markup -> title, meta description, content paragraphs

pub mod document;
pub mod page;

pub use document::PlainTextDocumentReader;
pub use page::{default_rules, ExclusionRule, HtmlPageReader, RuleScope};

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Draft document failures (reported per document as a parse error)
#[derive(Debug, Error)]
pub enum ReadError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} is not valid UTF-8 text")]
    Encoding(String),

    #[error("{0} contains no paragraphs")]
    Empty(String),

    #[error("Unsupported document format: {0}")]
    Unsupported(String),
}

/// One paragraph of a draft
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paragraph {
    pub text: String,
    pub heading_level: Option<u8>,
}

impl Paragraph {
    pub fn body(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            heading_level: None,
        }
    }

    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            heading_level: Some(level),
        }
    }

    /// Paragraph as block text: headings wrapped in `<hN>` tags
    pub fn render(&self) -> String {
        match self.heading_level {
            Some(level) => format!("<h{level}>{}</h{level}>", self.text),
            None => self.text.clone(),
        }
    }
}

/// A draft document as delivered by a [`DocumentReader`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftDocument {
    /// File name used as the document identifier
    pub name: String,
    pub paragraphs: Vec<Paragraph>,
}

impl DraftDocument {
    /// File name without extension
    pub fn stem(&self) -> &str {
        Path::new(&self.name)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or(&self.name)
    }

    /// Full text, paragraphs separated by blank lines
    pub fn to_text(&self) -> String {
        self.paragraphs
            .iter()
            .map(Paragraph::render)
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

/// Content extracted from one HTML page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    pub title: String,
    pub meta_description: String,
    /// Paragraphs in reading order; headings as `<hN>…</hN>`, FAQ rows as `Q:`/`A:`
    pub paragraphs: Vec<String>,
}

impl PageContent {
    pub fn has_content(&self) -> bool {
        !self.paragraphs.is_empty()
    }

    /// Full text, paragraphs separated by blank lines
    pub fn to_text(&self) -> String {
        self.paragraphs.join("\n\n")
    }
}

/// Converts a draft file into paragraphs
pub trait DocumentReader: Send + Sync {
    fn read(&self, path: &Path) -> Result<DraftDocument, ReadError>;
}

/// Converts page markup into structured text
pub trait PageReader: Send + Sync {
    fn read(&self, html: &str) -> PageContent;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paragraph_render() {
        assert_eq!(Paragraph::heading(2, "About").render(), "<h2>About</h2>");
        assert_eq!(Paragraph::body("Hello.").render(), "Hello.");
    }

    #[test]
    fn test_document_text_and_stem() {
        let doc = DraftDocument {
            name: "about-us.txt".to_string(),
            paragraphs: vec![Paragraph::heading(1, "About"), Paragraph::body("We exist.")],
        };
        assert_eq!(doc.to_text(), "<h1>About</h1>\n\nWe exist.");
        assert_eq!(doc.stem(), "about-us");
    }
}
