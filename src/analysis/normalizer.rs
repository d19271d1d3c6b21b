//! Title normalization for grouping and similarity matching.

use std::collections::HashSet;

/// Condition and filler words stripped before comparison.
const STOP_WORDS: [&str; 5] = ["new", "used", "excellent", "good", "fair"];

/// Number of leading significant tokens kept in a fingerprint.
const MAX_FINGERPRINT_TOKENS: usize = 4;

/// Keyword overlap ratio at or above which two titles are similar.
pub const SIMILARITY_THRESHOLD: f64 = 0.5;

/// Returns the comparison fingerprint for a listing title.
///
/// Lowercases, replaces `-`/`_` with spaces, drops stop words, and keeps the
/// first four remaining tokens in their original order. Deliberately
/// order-sensitive and truncating: titles sharing their first four
/// significant words group together even when the tails differ.
///
/// An empty or stop-word-only title yields an empty fingerprint, which
/// callers must treat as ungroupable.
pub fn fingerprint(title: &str) -> String {
    let cleaned = title.to_lowercase().replace(['-', '_'], " ");
    cleaned
        .split_whitespace()
        .filter(|token| !STOP_WORDS.contains(token))
        .take(MAX_FINGERPRINT_TOKENS)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Returns the full keyword set for a listing title.
///
/// Same stop-word filtering as `fingerprint` but without truncation; used
/// for pairwise similarity rather than grouping.
pub fn keywords(title: &str) -> HashSet<String> {
    let cleaned = title.to_lowercase().replace(['-', '_'], " ");
    cleaned
        .split_whitespace()
        .filter(|token| !STOP_WORDS.contains(token))
        .map(str::to_string)
        .collect()
}

/// Keyword overlap ratio between two titles:
/// |intersection| / max(|keywords1|, |keywords2|).
pub fn similarity(title_a: &str, title_b: &str) -> f64 {
    let keywords_a = keywords(title_a);
    let keywords_b = keywords(title_b);

    let largest = keywords_a.len().max(keywords_b.len());
    if largest == 0 {
        return 0.0;
    }

    let shared = keywords_a.intersection(&keywords_b).count();
    shared as f64 / largest as f64
}

/// Returns true if two titles describe a similar product.
pub fn is_similar(title_a: &str, title_b: &str) -> bool {
    similarity(title_a, title_b) >= SIMILARITY_THRESHOLD
}
