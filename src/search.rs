//! Passage retrieval: score every sentence of a document against a query
//! and return the top-ranked results.
//!
//! # Scoring Algorithm
//!
//! 1. Split the query into whitespace tokens.
//! 2. `base = matched tokens / total tokens` (substring match, lowercase).
//! 3. `+0.3` bonus when the whole query appears verbatim in the sentence.
//! 4. Clamp to `[0, 1]`.
//!
//! Scoring is a pure function: identical inputs always produce identical
//! output. Citation extraction relies on this to re-derive the same
//! ranking the context was built from.

use std::cmp::Ordering;

use crate::models::SearchResult;
use crate::segment::split_sentences;

/// Sentences at or below this length never become retrieval candidates.
pub const RETRIEVAL_MIN_SENTENCE_CHARS: usize = 20;

/// Candidates scoring at or below this are dropped.
pub const MIN_RELEVANCE: f64 = 0.3;

/// Maximum results returned per retrieval call.
pub const MAX_RESULTS: usize = 5;

/// Bonus applied when the full query phrase appears in the sentence.
const EXACT_PHRASE_BONUS: f64 = 0.3;

/// Score a sentence against a query. Both arguments must already be
/// lowercased. Returns a value in `[0.0, 1.0]`; an empty or
/// whitespace-only query scores 0.
pub fn relevance_score(sentence_lower: &str, query_lower: &str) -> f64 {
    let tokens: Vec<&str> = query_lower.split_whitespace().collect();
    if tokens.is_empty() {
        return 0.0;
    }

    let matched = tokens
        .iter()
        .filter(|t| sentence_lower.contains(**t))
        .count();
    let base = matched as f64 / tokens.len() as f64;

    let bonus = if sentence_lower.contains(query_lower) {
        EXACT_PHRASE_BONUS
    } else {
        0.0
    };

    (base + bonus).min(1.0)
}

/// Rank all sentences of `pages` against `query` and return the top
/// [`MAX_RESULTS`].
///
/// Blank pages are skipped. Only sentences containing the query as a
/// case-insensitive substring are scored, and only scores strictly above
/// [`MIN_RELEVANCE`] qualify. Results are sorted descending by score;
/// equal scores appear in ascending (page, sentence ordinal) order.
/// An empty query or a document with no qualifying sentence returns an
/// empty vector, never an error.
pub fn search_pages(pages: &[String], query: &str) -> Vec<SearchResult> {
    if query.trim().is_empty() {
        return Vec::new();
    }
    let query_lower = query.to_lowercase();

    struct Candidate {
        page: usize,
        ordinal: usize,
        text: String,
        relevance: f64,
    }

    let mut candidates: Vec<Candidate> = Vec::new();

    for (page_idx, page_text) in pages.iter().enumerate() {
        if page_text.trim().is_empty() {
            continue;
        }

        let sentences = split_sentences(page_text, RETRIEVAL_MIN_SENTENCE_CHARS);
        for (ordinal, sentence) in sentences.into_iter().enumerate() {
            let sentence_lower = sentence.to_lowercase();
            if !sentence_lower.contains(&query_lower) {
                continue;
            }
            let relevance = relevance_score(&sentence_lower, &query_lower);
            if relevance > MIN_RELEVANCE {
                candidates.push(Candidate {
                    page: page_idx + 1,
                    ordinal,
                    text: sentence,
                    relevance,
                });
            }
        }
    }

    // Sort: relevance desc, page asc, ordinal asc (deterministic)
    candidates.sort_by(|a, b| {
        b.relevance
            .partial_cmp(&a.relevance)
            .unwrap_or(Ordering::Equal)
            .then(a.page.cmp(&b.page))
            .then(a.ordinal.cmp(&b.ordinal))
    });
    candidates.truncate(MAX_RESULTS);

    candidates
        .into_iter()
        .map(|c| SearchResult {
            page: c.page,
            text: c.text,
            relevance: c.relevance,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pages(texts: &[&str]) -> Vec<String> {
        texts.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_score_in_unit_interval() {
        let cases = [
            ("the quick brown fox jumps over", "quick fox"),
            ("nothing in common at all", "zebra quantum"),
            ("exact phrase match right here", "exact phrase match right here"),
            ("", "query words"),
            ("some sentence", ""),
        ];
        for (sentence, query) in cases {
            let score = relevance_score(sentence, query);
            assert!(
                (0.0..=1.0).contains(&score),
                "score out of range for ({sentence:?}, {query:?}): {score}"
            );
        }
    }

    #[test]
    fn test_score_deterministic() {
        let s = "the quick brown fox jumps over the lazy dog";
        let q = "quick lazy fox";
        let first = relevance_score(s, q);
        for _ in 0..10 {
            assert_eq!(relevance_score(s, q), first);
        }
    }

    #[test]
    fn test_score_empty_query_is_zero() {
        assert_eq!(relevance_score("any sentence at all", ""), 0.0);
        assert_eq!(relevance_score("any sentence at all", "   "), 0.0);
    }

    #[test]
    fn test_score_partial_token_match() {
        // 1 of 2 tokens matches, no exact phrase: 0.5
        let score = relevance_score("the quick brown fox", "quick zebra");
        assert!((score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_score_exact_phrase_bonus() {
        // Both tokens match (base 1.0) and the phrase is verbatim: capped at 1.0
        let score = relevance_score("a quick fox ran by", "quick fox");
        assert!((score - 1.0).abs() < 1e-9);

        // Both tokens match but not adjacent: no bonus, base 1.0
        let score = relevance_score("a quick red fox ran by", "quick fox");
        assert!((score - 1.0).abs() < 1e-9);

        // 1 of 2 tokens plus no phrase: stays at 0.5
        let score = relevance_score("only the fox is here", "quick fox");
        assert!((score - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_search_single_word_full_score() {
        // Single-token query present as substring: base 1/1 plus the
        // phrase bonus, capped at 1.0.
        let docs = pages(&[
            "The mitochondria is the powerhouse of the cell. It generates ATP.",
        ]);
        let results = search_pages(&docs, "powerhouse");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].page, 1);
        assert!((results[0].relevance - 1.0).abs() < 1e-9);
        assert!(results[0].text.contains("powerhouse"));
    }

    #[test]
    fn test_search_empty_query_returns_empty() {
        let docs = pages(&["A perfectly reasonable sentence about nothing much."]);
        assert!(search_pages(&docs, "").is_empty());
        assert!(search_pages(&docs, "   ").is_empty());
    }

    #[test]
    fn test_search_no_match_returns_empty() {
        let docs = pages(&["A perfectly reasonable sentence about nothing much."]);
        assert!(search_pages(&docs, "quantum chromodynamics").is_empty());
    }

    #[test]
    fn test_search_skips_blank_pages() {
        let docs = pages(&["", "   ", "The relevant keyword appears on this page only."]);
        let results = search_pages(&docs, "keyword");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].page, 3);
    }

    #[test]
    fn test_search_short_sentences_not_candidates() {
        // "Short keyword." trims to 13 chars, below the 20-char floor.
        let docs = pages(&["Short keyword. This longer sentence also contains the keyword."]);
        let results = search_pages(&docs, "keyword");
        assert_eq!(results.len(), 1);
        assert!(results[0].text.starts_with("This longer"));
    }

    #[test]
    fn test_search_sorted_desc_with_page_tiebreak() {
        // Same sentence on pages 3 and 1: equal scores, page 1 first.
        let sentence = "The keyword is mentioned in this sentence.";
        let docs = pages(&[sentence, "Unrelated filler text on the middle page.", sentence]);
        let results = search_pages(&docs, "keyword");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].page, 1);
        assert_eq!(results[1].page, 3);
        for pair in results.windows(2) {
            assert!(pair[0].relevance >= pair[1].relevance);
        }
    }

    #[test]
    fn test_search_ordinal_tiebreak_within_page() {
        let docs = pages(&[
            "First sentence with the keyword inside. Second sentence with the keyword inside.",
        ]);
        let results = search_pages(&docs, "keyword");
        assert_eq!(results.len(), 2);
        assert!(results[0].text.starts_with("First"));
        assert!(results[1].text.starts_with("Second"));
    }

    #[test]
    fn test_search_truncates_to_max_results() {
        let page: String = (0..10)
            .map(|i| format!("Sentence number {i} containing the keyword. "))
            .collect();
        let results = search_pages(&[page], "keyword");
        assert_eq!(results.len(), MAX_RESULTS);
    }

    #[test]
    fn test_search_case_insensitive() {
        let docs = pages(&["The KeyWord appears with odd capitalization here."]);
        let results = search_pages(&docs, "KEYWORD");
        assert_eq!(results.len(), 1);
    }
}
