// * Whitespace and line-ending canonicalization
// * Keeps paragraph breaks, collapses everything else.

use regex::Regex;
use std::sync::LazyLock;

static INLINE_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[ \t]+").unwrap());
static LINE_EDGE_SPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r" ?\n ?").unwrap());
static EXTRA_BREAKS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{3,}").unwrap());

/// Canonicalizes raw text: drops carriage returns, collapses runs of spaces and
/// tabs, strips spaces around line breaks and caps blank runs at one blank line.
///
/// Idempotent: `normalize_text(&normalize_text(s)) == normalize_text(s)`.
pub fn normalize_text(text: &str) -> String {
    let text = text.replace('\r', "");
    let text = INLINE_SPACE.replace_all(&text, " ");
    let text = LINE_EDGE_SPACE.replace_all(&text, "\n");
    let text = EXTRA_BREAKS.replace_all(&text, "\n\n");
    text.trim().to_string()
}
