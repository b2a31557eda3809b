//! C1 — shared keyword-scoring helpers over the capability taxonomy.
//!
//! Grounded on `tool_capability_mapper.py`'s substring-matching approach:
//! normalize text to lowercase, count keyword occurrences per category, and
//! keep every category whose count clears a minimum bar.

use std::collections::BTreeSet;

use crate::domain::models::capability::CapabilityCategory;

/// Fixed function-word list stripped by [`normalize`] when doing so still
/// leaves at least two tokens. Ported from `task_analyzer_cached.py` /
/// `task_analyzer_optimized.py`'s stop-word filter.
const FUNCTION_WORDS: &[&str] = &[
    "a", "an", "the", "of", "to", "in", "on", "at", "for", "and", "or", "but", "is", "are", "was",
    "were", "be", "been", "being", "please", "could", "would", "should", "can", "you", "your",
    "me", "my", "it", "this", "that", "with", "as", "by", "from",
];

/// Lowercases, collapses whitespace, strips trailing sentence punctuation,
/// and (only when at least two tokens would remain) drops a fixed list of
/// function words, so semantically identical inputs produce identical
/// cache keys and identical classification results (spec.md section 8,
/// property #2 "analyzer normalization").
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let without_trailing_punctuation = lowered.trim_end_matches(|c: char| matches!(c, '.' | '!' | '?'));
    let tokens: Vec<&str> = without_trailing_punctuation.split_whitespace().collect();

    let without_function_words: Vec<&str> = tokens
        .iter()
        .copied()
        .filter(|tok| !FUNCTION_WORDS.contains(tok))
        .collect();

    if without_function_words.len() >= 2 {
        without_function_words.join(" ")
    } else {
        tokens.join(" ")
    }
}

/// Count keyword occurrences for a single category within already-normalized
/// text.
pub fn score_category(normalized: &str, category: CapabilityCategory) -> usize {
    category
        .keywords()
        .iter()
        .filter(|kw| normalized.contains(*kw))
        .count()
}

/// Score every category against normalized text, returning the ones with a
/// nonzero hit count, sorted for determinism.
pub fn infer_capabilities(normalized: &str) -> BTreeSet<CapabilityCategory> {
    CapabilityCategory::ALL
        .iter()
        .copied()
        .filter(|cat| score_category(normalized, *cat) > 0)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_collapses_case_and_whitespace() {
        // "the" is a function word and dropping it still leaves 2 tokens.
        assert_eq!(normalize("  Read   THE file  "), "read file");
    }

    #[test]
    fn normalize_strips_trailing_sentence_punctuation() {
        assert_eq!(normalize("read the file!!"), "read file");
        assert_eq!(normalize("is this urgent?"), "urgent");
    }

    #[test]
    fn normalize_keeps_function_words_when_too_few_tokens_remain() {
        // Removing "the" would leave a single token, below the 2-token floor.
        assert_eq!(normalize("the file"), "the file");
    }

    #[test]
    fn normalize_is_identical_for_equivalent_phrasing() {
        assert_eq!(normalize("Please read the file."), normalize("read file"));
    }

    #[test]
    fn infer_capabilities_finds_file_keyword() {
        let caps = infer_capabilities(&normalize("please read the file notes.txt"));
        assert!(caps.contains(&CapabilityCategory::File));
    }

    #[test]
    fn infer_capabilities_empty_for_unrelated_text() {
        let caps = infer_capabilities(&normalize("xyzzy plugh"));
        assert!(caps.is_empty());
    }
}
