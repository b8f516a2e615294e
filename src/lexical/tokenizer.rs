//! Tokenization for the lexical index.
//!
//! Documents and queries go through the identical pipeline: lowercase, regex
//! word extraction, stop-word removal, minimum token length.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

/// Word extraction pattern. Underscores are kept so identifiers like
/// `user_id` survive as single terms.
static WORD_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[a-z0-9_]+").expect("word pattern is valid"));

/// Common English stop words that do not contribute to search relevance.
static STOP_WORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "a", "an", "and", "are", "as", "at", "be", "but", "by", "for", "if", "in", "into", "is",
        "it", "no", "not", "of", "on", "or", "such", "that", "the", "their", "then", "there",
        "these", "they", "this", "to", "was", "will", "with", "how", "what", "when", "where",
        "which", "who", "why", "can", "could", "should", "would", "does", "do", "did",
    ]
    .into_iter()
    .collect()
});

/// Tokenize text into index terms.
///
/// Terms shorter than `min_len` and stop words are dropped. An empty or
/// all-stop-word input yields an empty vector, not an error.
pub fn tokenize(text: &str, min_len: usize) -> Vec<String> {
    let lowered = text.to_lowercase();
    WORD_PATTERN
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| token.len() >= min_len && !STOP_WORDS.contains(token))
        .map(str::to_string)
        .collect()
}
