//! Post-hoc citation extraction.
//!
//! After the model has answered, the same retrieval ranking the context
//! was built from is re-derived and each candidate passage is tested for
//! word overlap against the answer. Accepted candidates become bounded,
//! confidence-scored citations pointing back at source pages. Because
//! scoring is deterministic, the citation set is always explainable from
//! the ranking that produced the prompt.

use std::collections::HashSet;

use crate::models::{Citation, SearchResult};
use crate::search::search_pages;

/// Hard cap on citations per response.
pub const MAX_CITATIONS: usize = 3;

/// A candidate is accepted when it shares more than this many long words
/// with the answer.
const MIN_WORD_OVERLAP: usize = 2;

/// A candidate is accepted regardless of overlap above this relevance.
const HIGH_RELEVANCE: f64 = 0.7;

/// Confidence boost per overlapping word.
const OVERLAP_WEIGHT: f64 = 0.1;

/// Ceiling on boosted confidence.
const CONFIDENCE_CAP: f64 = 0.95;

/// Words at or below this length are ignored when counting overlap.
const OVERLAP_MIN_WORD_CHARS: usize = 3;

/// Characters of the source sentence kept in an excerpt.
const EXCERPT_CHARS: usize = 100;

/// Derive at most [`MAX_CITATIONS`] citations linking `answer` back to
/// the pages it was generated from.
///
/// Re-runs retrieval with the same `pages` and `query` so the citation
/// set is explainable from the ranking the context was built from, then
/// delegates to [`rank_citations`]. No candidates at all yields an empty
/// vector.
pub fn extract_citations(answer: &str, pages: &[String], query: &str) -> Vec<Citation> {
    rank_citations(answer, &search_pages(pages, query))
}

/// Turn ranked retrieval candidates into citations for `answer`.
///
/// A candidate is accepted when it shares more than [`MIN_WORD_OVERLAP`]
/// long words with the answer or its relevance exceeds
/// [`HIGH_RELEVANCE`]. When nothing is accepted but candidates exist,
/// exactly one fallback citation is built from the top-ranked candidate,
/// with its raw relevance as confidence (not boosted).
pub fn rank_citations(answer: &str, candidates: &[SearchResult]) -> Vec<Citation> {
    if candidates.is_empty() {
        return Vec::new();
    }

    let answer_lower = answer.to_lowercase();
    let answer_words: HashSet<&str> = answer_lower.split_whitespace().collect();

    let mut citations: Vec<Citation> = Vec::new();
    for candidate in candidates {
        let overlap = word_overlap(&candidate.text, &answer_words);
        if overlap > MIN_WORD_OVERLAP || candidate.relevance > HIGH_RELEVANCE {
            citations.push(Citation {
                id: citations.len() + 1,
                page_number: candidate.page,
                excerpt: excerpt(&candidate.text),
                confidence: (candidate.relevance + overlap as f64 * OVERLAP_WEIGHT)
                    .min(CONFIDENCE_CAP),
            });
        }
    }

    if citations.is_empty() {
        let top = &candidates[0];
        citations.push(Citation {
            id: 1,
            page_number: top.page,
            excerpt: excerpt(&top.text),
            confidence: top.relevance,
        });
    }

    citations.truncate(MAX_CITATIONS);
    citations
}

/// Count tokens of `text` (with repetition) longer than
/// [`OVERLAP_MIN_WORD_CHARS`] that appear in the answer's word set.
fn word_overlap(text: &str, answer_words: &HashSet<&str>) -> usize {
    let text_lower = text.to_lowercase();
    text_lower
        .split_whitespace()
        .filter(|w| w.chars().count() > OVERLAP_MIN_WORD_CHARS && answer_words.contains(*w))
        .count()
}

/// First [`EXCERPT_CHARS`] characters of `text`, `...`-suffixed when the
/// sentence is longer.
fn excerpt(text: &str) -> String {
    let mut out: String = text.chars().take(EXCERPT_CHARS).collect();
    if text.chars().count() > EXCERPT_CHARS {
        out.push_str("...");
    }
    out
}
