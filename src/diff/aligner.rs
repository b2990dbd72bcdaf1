// * Block Aligner
// * Two-pass greedy alignment of draft blocks against live blocks with positional
// * backfill, followed by score aggregation.
// *
// * Pass order per draft block:
// * 1. Primary: best unconsumed live block by the scorer, accepted at >= threshold.
// * 2. Partial: sentence-level matches against same-typed unconsumed live blocks.
// * 3. Otherwise the draft block is Missing.
// * Leftover live blocks are then backfilled next to their most similar neighbors.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::similarity::{ratio, Scorer, TypedScorer};
use crate::config::CompareConfig;
use crate::text::{Block, ContentType};

/// Row tag of an alignment record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentTag {
    Matched,
    Missing,
    Current,
}

/// One row of the diff. A record always carries at least one side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "tag", rename_all = "lowercase")]
pub enum AlignmentRecord {
    /// Draft block found on the live page (`score` is 1.0 for verbatim matches)
    Matched {
        draft_text: String,
        live_text: String,
        score: f64,
    },
    /// Draft block absent from the live page
    Missing { draft_text: String },
    /// Live content with no draft counterpart
    Current { live_text: String },
}

impl AlignmentRecord {
    pub fn tag(&self) -> AlignmentTag {
        match self {
            AlignmentRecord::Matched { .. } => AlignmentTag::Matched,
            AlignmentRecord::Missing { .. } => AlignmentTag::Missing,
            AlignmentRecord::Current { .. } => AlignmentTag::Current,
        }
    }

    pub fn draft_text(&self) -> Option<&str> {
        match self {
            AlignmentRecord::Matched { draft_text, .. }
            | AlignmentRecord::Missing { draft_text } => Some(draft_text),
            AlignmentRecord::Current { .. } => None,
        }
    }

    pub fn live_text(&self) -> Option<&str> {
        match self {
            AlignmentRecord::Matched { live_text, .. }
            | AlignmentRecord::Current { live_text } => Some(live_text),
            AlignmentRecord::Missing { .. } => None,
        }
    }

    /// Text used as positional context during backfill (draft side preferred)
    fn context_text(&self) -> &str {
        self.draft_text().or_else(|| self.live_text()).unwrap_or_default()
    }

    pub fn is_matched(&self) -> bool {
        self.tag() == AlignmentTag::Matched
    }
}

/// Result of aligning one draft against one live page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Alignment {
    pub records: Vec<AlignmentRecord>,
    /// Aggregate similarity in [0, 1]
    pub similarity: f64,
}

impl Alignment {
    pub fn count(&self, tag: AlignmentTag) -> usize {
        self.records.iter().filter(|r| r.tag() == tag).count()
    }
}

/// Aligns draft blocks against live blocks under a configurable policy
#[derive(Debug, Clone)]
pub struct Aligner<S = TypedScorer> {
    config: CompareConfig,
    scorer: S,
}

impl Aligner<TypedScorer> {
    pub fn new() -> Self {
        Self::with_config(CompareConfig::default())
    }

    pub fn with_config(config: CompareConfig) -> Self {
        Self {
            config,
            scorer: TypedScorer,
        }
    }
}

impl Default for Aligner<TypedScorer> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: Scorer> Aligner<S> {
    pub fn with_scorer(config: CompareConfig, scorer: S) -> Self {
        Self { config, scorer }
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Aligns two block sequences. Never fails: empty input yields trivial output.
    pub fn align(&self, draft: &[Block], live: &[Block]) -> Alignment {
        let threshold = self.config.threshold;
        let mut consumed = vec![false; live.len()];
        let mut records: Vec<AlignmentRecord> = Vec::with_capacity(draft.len() + live.len());
        let mut matched_len = 0.0;

        for (i, draft_block) in draft.iter().enumerate() {
            // * Pass 1: primary match
            if let Some((j, score)) = self.best_live_match(draft_block, live, &consumed) {
                if score >= threshold {
                    consumed[j] = true;
                    self.release_stranded(&draft[i + 1..], live, j, &mut consumed, &mut records);
                    records.push(AlignmentRecord::Matched {
                        draft_text: draft_block.text.clone(),
                        live_text: live[j].text.clone(),
                        score,
                    });
                    matched_len += draft_block.char_len() as f64 * score;
                    continue;
                }
            }

            // * Pass 2: sentence-level partial match
            if !draft_block.content_type.requires_exact_match() {
                if let Some(partial) = self.partial_match(draft_block, live, &consumed) {
                    for (k, taken) in consumed.iter_mut().enumerate().take(partial.first_index) {
                        if !*taken {
                            *taken = true;
                            records.push(AlignmentRecord::Current {
                                live_text: live[k].text.clone(),
                            });
                        }
                    }
                    // * Rescued live blocks stay open for later primary matches and backfill
                    let draft_len = draft_block.char_len() as f64;
                    let score = if draft_len > 0.0 {
                        (partial.matched_len / draft_len).min(1.0)
                    } else {
                        0.0
                    };
                    records.push(AlignmentRecord::Matched {
                        draft_text: draft_block.text.clone(),
                        live_text: partial.live_sentences.join(" "),
                        score,
                    });
                    matched_len += partial.matched_len;
                    continue;
                }
            }

            // * Pass 3: nothing found
            records.push(AlignmentRecord::Missing {
                draft_text: draft_block.text.clone(),
            });
        }

        // * Backfill leftover live blocks in live order
        for (j, live_block) in live.iter().enumerate() {
            if consumed[j] {
                continue;
            }
            let position = self.backfill_position(&records, &live_block.text);
            records.insert(
                position,
                AlignmentRecord::Current {
                    live_text: live_block.text.clone(),
                },
            );
        }

        let similarity = self.aggregate(draft, live, &records, matched_len);
        debug!(
            draft_blocks = draft.len(),
            live_blocks = live.len(),
            records = records.len(),
            similarity,
            "Alignment complete"
        );

        Alignment {
            records,
            similarity,
        }
    }

    // * Highest-scoring unconsumed live block; the first one seen wins ties
    fn best_live_match(&self, draft_block: &Block, live: &[Block], consumed: &[bool]) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (j, live_block) in live.iter().enumerate() {
            if consumed[j] {
                continue;
            }
            let score = self.scorer.score(draft_block, live_block);
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((j, score));
            }
        }
        best
    }

    // * Emits unconsumed live blocks before `matched_index` as Current unless a
    // * later draft block would claim them.
    fn release_stranded(
        &self,
        later_drafts: &[Block],
        live: &[Block],
        matched_index: usize,
        consumed: &mut [bool],
        records: &mut Vec<AlignmentRecord>,
    ) {
        for k in 0..matched_index {
            if consumed[k] {
                continue;
            }
            let claimed_later = later_drafts
                .iter()
                .any(|future| self.scorer.score(future, &live[k]) >= self.config.threshold);
            if !claimed_later {
                consumed[k] = true;
                records.push(AlignmentRecord::Current {
                    live_text: live[k].text.clone(),
                });
            }
        }
    }

    fn partial_match(&self, draft_block: &Block, live: &[Block], consumed: &[bool]) -> Option<PartialMatch> {
        let draft_sentences = sentences(&draft_block.text);
        if draft_sentences.is_empty() {
            return None;
        }

        let mut partial = PartialMatch::default();
        for (j, live_block) in live.iter().enumerate() {
            if consumed[j] || live_block.content_type != draft_block.content_type {
                continue;
            }

            let live_sentences = sentences(&live_block.text);
            let mut hit = false;
            for draft_sentence in &draft_sentences {
                for live_sentence in &live_sentences {
                    let score = ratio(draft_sentence, live_sentence);
                    if score > self.config.sentence_threshold {
                        partial.live_sentences.push((*live_sentence).to_string());
                        partial.matched_len += draft_sentence.chars().count() as f64 * score;
                        hit = true;
                    }
                }
            }

            if hit {
                if partial.live_indices.is_empty() {
                    partial.first_index = j;
                }
                partial.live_indices.push(j);
            }
        }

        if partial.live_indices.is_empty() {
            None
        } else {
            Some(partial)
        }
    }

    // * Position maximizing similarity to the left and right neighbors.
    // * Later positions win ties, so zero context appends.
    fn backfill_position(&self, records: &[AlignmentRecord], live_text: &str) -> usize {
        let mut best_position = records.len();
        let mut best_score = f64::NEG_INFINITY;

        for position in 0..=records.len() {
            let mut context = 0.0;
            if position > 0 {
                let previous = records[position - 1].context_text();
                if !previous.is_empty() {
                    context += self.scorer.score_text(previous, live_text);
                }
            }
            if position < records.len() {
                let next = records[position].context_text();
                if !next.is_empty() {
                    context += self.scorer.score_text(next, live_text);
                }
            }
            if context >= best_score {
                best_score = context;
                best_position = position;
            }
        }

        best_position
    }

    fn aggregate(&self, draft: &[Block], live: &[Block], records: &[AlignmentRecord], matched_len: f64) -> f64 {
        let total_draft = scored_length(draft);
        let total_live = scored_length(live);
        if total_draft == 0 || total_live == 0 || records.is_empty() {
            return 0.0;
        }

        let length_ratio = (matched_len / total_draft as f64).max(matched_len / total_live as f64);
        let matched_count = records.iter().filter(|r| r.is_matched()).count();
        let block_ratio = matched_count as f64 / records.len() as f64;

        (length_ratio * self.config.content_weight + block_ratio * self.config.block_weight).clamp(0.0, 1.0)
    }
}

#[derive(Debug, Default)]
struct PartialMatch {
    first_index: usize,
    live_indices: Vec<usize>,
    live_sentences: Vec<String>,
    matched_len: f64,
}

// * Sentences split on '.', trimmed, empties dropped
fn sentences(text: &str) -> Vec<&str> {
    text.split('.').map(str::trim).filter(|s| !s.is_empty()).collect()
}

// * Total block length from the first level-1 heading, or of the whole sequence
fn scored_length(blocks: &[Block]) -> usize {
    let start = blocks
        .iter()
        .position(|b| b.content_type == ContentType::Heading(1))
        .unwrap_or(0);
    blocks[start..].iter().map(Block::char_len).sum()
}

/// Aligns with the default policy
pub fn align(draft: &[Block], live: &[Block]) -> Alignment {
    Aligner::new().align(draft, live)
}
