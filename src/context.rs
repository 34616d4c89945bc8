//! Context window assembly.
//!
//! Expands the top retrieval hits into windows of surrounding sentences
//! and packs them into a single labeled string that stays strictly under
//! a character budget. The budget is measured in characters even though
//! it bounds what a model prompt calls "tokens" — no real tokenization
//! happens here.

use crate::search::search_pages;
use crate::segment::split_sentences;

/// Sentences at or below this length are excluded from context windows.
/// Looser than the retrieval floor of 20: windows admit short neighboring
/// sentences that retrieval itself would never rank.
pub const CONTEXT_MIN_SENTENCE_CHARS: usize = 10;

/// Default character budget for an assembled context.
pub const DEFAULT_CONTEXT_CHARS: usize = 4000;

/// Sentences of surrounding context kept on each side of a hit.
const WINDOW_RADIUS: usize = 2;

/// Pages used by the fallback path when retrieval finds nothing.
const FALLBACK_PAGES: usize = 3;

/// Per-page character cap on the fallback path.
const FALLBACK_PAGE_CHARS: usize = 1000;

/// Assemble a context string for `query` from `pages`, at most `max_chars`
/// characters long.
///
/// Primary path: for each retrieval hit, re-segment the owning page,
/// locate the first sentence containing the query, and emit a
/// `[Page N]`-labeled block of that sentence plus up to [`WINDOW_RADIUS`]
/// sentences on either side. A block is appended only while the running
/// total stays strictly under the budget; the first block that would
/// reach it stops accumulation entirely — blocks are never truncated
/// mid-content.
///
/// Fallback path: when no hit produced a block, the first
/// `min(3, page_count)` pages are emitted instead, each capped at 1000
/// characters, under the same budget rule.
///
/// The result may be empty; its character count never exceeds `max_chars`.
pub fn build_context(pages: &[String], query: &str, max_chars: usize) -> String {
    let query_lower = query.to_lowercase();
    let mut context = String::new();
    let mut used_chars = 0usize;

    for result in search_pages(pages, query) {
        let page_text = &pages[result.page - 1];
        let sentences = split_sentences(page_text, CONTEXT_MIN_SENTENCE_CHARS);

        // The hit may vanish at this looser threshold's segmentation; if
        // so the result contributes no block.
        let hit = match sentences
            .iter()
            .position(|s| s.to_lowercase().contains(&query_lower))
        {
            Some(i) => i,
            None => continue,
        };

        let start = hit.saturating_sub(WINDOW_RADIUS);
        let end = (hit + WINDOW_RADIUS + 1).min(sentences.len());
        let block = format!(
            "\n[Page {}]\n{}\n",
            result.page,
            sentences[start..end].join(". ")
        );

        let block_chars = block.chars().count();
        if used_chars + block_chars < max_chars {
            context.push_str(&block);
            used_chars += block_chars;
        } else {
            break;
        }
    }

    if context.trim().is_empty() {
        for (i, page_text) in pages.iter().take(FALLBACK_PAGES).enumerate() {
            let preview: String = page_text.chars().take(FALLBACK_PAGE_CHARS).collect();
            let block = format!("\n[Page {}]\n{}...\n", i + 1, preview);

            let block_chars = block.chars().count();
            if used_chars + block_chars < max_chars {
                context.push_str(&block);
                used_chars += block_chars;
            } else {
                break;
            }
        }
    }

    context
}
