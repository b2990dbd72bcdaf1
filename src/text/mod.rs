// * Text preparation shared by the aligner and the matcher:
// * normalize -> segment -> classify.

pub mod classifier;
pub mod normalizer;
pub mod segmenter;

pub use classifier::{classify, clean_text, ContentType};
pub use normalizer::normalize_text;
pub use segmenter::{blocks_from_strings, split_into_blocks, Block};

/// Normalizes raw text and segments it into typed blocks
pub fn prepare_blocks(raw: &str) -> Vec<Block> {
    split_into_blocks(&normalize_text(raw))
}
