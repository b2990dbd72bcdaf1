// * Block alignment and similarity scoring

pub mod aligner;
pub mod similarity;

pub use aligner::{align, Aligner, Alignment, AlignmentRecord, AlignmentTag};
pub use similarity::{block_similarity, ratio, Scorer, TypedScorer};
