// * Block Segmenter
// * Splits normalized text into ordered, typed, non-empty blocks on blank lines.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

use super::classifier::{classify, ContentType};

static BLANK_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n[ \t]*\n").unwrap());

/// A contiguous unit of text produced by segmentation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub text: String,
    pub content_type: ContentType,
    /// Position in the segmented sequence
    pub source_index: usize,
}

impl Block {
    pub fn new(text: impl Into<String>, source_index: usize) -> Self {
        let text = text.into();
        let content_type = classify(&text);
        Self {
            text,
            content_type,
            source_index,
        }
    }

    /// Length in characters, the unit used by score aggregation
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Splits on blank-line boundaries, trims each piece and drops empties
pub fn split_into_blocks(text: &str) -> Vec<Block> {
    BLANK_LINE
        .split(text)
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .enumerate()
        .map(|(index, piece)| Block::new(piece, index))
        .collect()
}

/// Builds blocks from an already separated list of strings
pub fn blocks_from_strings<S: AsRef<str>>(pieces: &[S]) -> Vec<Block> {
    pieces
        .iter()
        .map(|p| p.as_ref().trim())
        .filter(|piece| !piece.is_empty())
        .enumerate()
        .map(|(index, piece)| Block::new(piece, index))
        .collect()
}
