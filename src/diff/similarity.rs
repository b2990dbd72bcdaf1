// * Similarity Scorer
// * Ratcliff/Obershelp ("gestalt pattern matching") ratio plus the typed block
// * policy layered on top of it.

use std::collections::HashMap;

use crate::text::{clean_text, Block};

/// Ratcliff/Obershelp ratio: `2*M / (len(a) + len(b))`, where `M` is the total
/// size of the longest common substrings found by recursive decomposition.
///
/// Lengths are counted in chars. Two empty strings are identical (1.0).
pub fn ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 1.0;
    }
    2.0 * matching_chars(&a, &b) as f64 / total as f64
}

/// Sum of all matching block sizes
fn matching_chars(a: &[char], b: &[char]) -> usize {
    let mut b2j: HashMap<char, Vec<usize>> = HashMap::new();
    for (j, c) in b.iter().enumerate() {
        b2j.entry(*c).or_default().push(j);
    }

    let mut matched = 0;
    let mut pending = vec![(0, a.len(), 0, b.len())];
    while let Some((alo, ahi, blo, bhi)) = pending.pop() {
        let (i, j, k) = longest_match(a, &b2j, alo, ahi, blo, bhi);
        if k == 0 {
            continue;
        }
        matched += k;
        if alo < i && blo < j {
            pending.push((alo, i, blo, j));
        }
        if i + k < ahi && j + k < bhi {
            pending.push((i + k, ahi, j + k, bhi));
        }
    }
    matched
}

/// Longest common substring of `a[alo..ahi]` and `b[blo..bhi]`.
/// Ties resolve to the earliest start in `a`, then in `b`.
fn longest_match(
    a: &[char],
    b2j: &HashMap<char, Vec<usize>>,
    alo: usize,
    ahi: usize,
    blo: usize,
    bhi: usize,
) -> (usize, usize, usize) {
    let (mut best_i, mut best_j, mut best_k) = (alo, blo, 0);
    // * j -> length of the match ending at (i - 1, j)
    let mut run_lengths: HashMap<usize, usize> = HashMap::new();

    for (i, c) in a.iter().enumerate().take(ahi).skip(alo) {
        let mut next_runs = HashMap::new();
        if let Some(positions) = b2j.get(c) {
            for &j in positions {
                if j < blo {
                    continue;
                }
                if j >= bhi {
                    break;
                }
                let k = j
                    .checked_sub(1)
                    .and_then(|prev| run_lengths.get(&prev))
                    .copied()
                    .unwrap_or(0)
                    + 1;
                next_runs.insert(j, k);
                if k > best_k {
                    best_i = i + 1 - k;
                    best_j = j + 1 - k;
                    best_k = k;
                }
            }
        }
        run_lengths = next_runs;
    }

    (best_i, best_j, best_k)
}

/// Scores a draft block against a live block in [0, 1]
pub trait Scorer {
    fn score(&self, draft: &Block, live: &Block) -> f64;

    /// Scores raw strings, classifying them first
    fn score_text(&self, draft: &str, live: &str) -> f64 {
        self.score(&Block::new(draft, 0), &Block::new(live, 0))
    }
}

/// Type-aware scorer:
/// - different types never match (0.0)
/// - headings and metadata match only verbatim after cleaning (1.0 or 0.0)
/// - generic content gets the Ratcliff/Obershelp ratio
#[derive(Debug, Clone, Copy, Default)]
pub struct TypedScorer;

impl Scorer for TypedScorer {
    fn score(&self, draft: &Block, live: &Block) -> f64 {
        if draft.content_type != live.content_type {
            return 0.0;
        }

        let kind = draft.content_type;
        if kind.requires_exact_match() {
            return if clean_text(&draft.text, kind) == clean_text(&live.text, kind) {
                1.0
            } else {
                0.0
            };
        }

        ratio(&draft.text, &live.text)
    }
}

/// Convenience wrapper over [`TypedScorer`] for plain strings
pub fn block_similarity(a: &str, b: &str) -> f64 {
    TypedScorer.score_text(a, b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_ratio_identical_and_empty() {
        assert_eq!(ratio("hello world", "hello world"), 1.0);
        assert_eq!(ratio("", ""), 1.0);
        assert_eq!(ratio("abc", ""), 0.0);
    }

    #[test]
    fn test_ratio_disjoint() {
        assert_eq!(ratio("abc", "xyz"), 0.0);
    }

    #[test]
    fn test_ratio_known_values() {
        // * Classic gestalt examples
        assert!(close(ratio("abcd", "bcde"), 0.75));
        // * "WIKIMEDIA" vs "WIKIMANIA": WIKIM + IA = 7 chars, 2*7/18
        assert!(close(ratio("WIKIMEDIA", "WIKIMANIA"), 14.0 / 18.0));
        // * "GESTALT PATTERN MATCHING" vs "GESTALT PRACTICE": 2*12/40
        assert!(close(ratio("GESTALT PATTERN MATCHING", "GESTALT PRACTICE"), 24.0 / 40.0));
    }

    #[test]
    fn test_ratio_counts_chars_not_bytes() {
        assert_eq!(ratio("café", "café"), 1.0);
        assert!(close(ratio("é", "e"), 0.0));
    }

    #[test]
    fn test_ratio_symmetric_on_simple_inputs() {
        let a = "Welcome to our site.";
        let b = "Welcome to the site!";
        assert!(close(ratio(a, b), ratio(b, a)));
    }

    #[test]
    fn test_cross_type_is_zero() {
        assert_eq!(block_similarity("<h1>Home</h1>", "Home"), 0.0);
        assert_eq!(block_similarity("<h1>Home</h1>", "<h2>Home</h2>"), 0.0);
        assert_eq!(block_similarity("Meta Title: Home", "Page Name: Home"), 0.0);
    }

    #[test]
    fn test_exact_types_are_binary() {
        assert_eq!(block_similarity("<h1>Home</h1>", "<h1>Home</h1>"), 1.0);
        assert_eq!(block_similarity("<h1>Home</h1>", "<h1>Homes</h1>"), 0.0);
        assert_eq!(block_similarity("<h1>Home</h1>", "<h1>About</h1>"), 0.0);
        assert_eq!(block_similarity("Page Name: Home", "Page Name:  Home "), 1.0);
    }

    #[test]
    fn test_content_uses_ratio() {
        let a = "Contact us today for a free quote.";
        let b = "Contact us today for a quote.";
        let s = block_similarity(a, b);
        assert!(s > 0.8 && s < 1.0);
        assert!(close(s, ratio(a, b)));
    }
}
