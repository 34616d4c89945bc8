//! Sentence segmentation over page text.
//!
//! Pages are split on runs of sentence-terminal punctuation (`.`, `!`, `?`)
//! and fragments below a caller-supplied minimum length are discarded.
//! Retrieval and context assembly call this with different thresholds
//! ([`crate::search::RETRIEVAL_MIN_SENTENCE_CHARS`] and
//! [`crate::context::CONTEXT_MIN_SENTENCE_CHARS`]).

/// Split `text` into trimmed sentences, keeping only fragments strictly
/// longer than `min_chars` characters. Empty input yields an empty vector.
///
/// Consecutive terminators (`"Wait...?!"`) produce empty fragments between
/// them; those are dropped by the length filter like any other short
/// fragment, so the result is the same as splitting on terminator runs.
pub fn split_sentences(text: &str, min_chars: usize) -> Vec<String> {
    text.split(['.', '!', '?'])
        .map(str::trim)
        .filter(|s| s.chars().count() > min_chars)
        .map(str::to_string)
        .collect()
}
