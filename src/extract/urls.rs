//! URL extraction from free text.

use std::sync::LazyLock;

use regex::Regex;

static URL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s<>"')\]]+"#).expect("URL pattern compiles")
});

/// Punctuation that belongs to the sentence, not the URL.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?'];

/// Scan plain text for embedded URLs, in document order.
///
/// Duplicates are preserved; deduplication is the caller's concern. The
/// iterator is finite, restartable, and does no network access.
pub fn url_matches(text: &str) -> impl Iterator<Item = &str> {
    URL_PATTERN
        .find_iter(text)
        .map(|m| m.as_str().trim_end_matches(TRAILING_PUNCTUATION))
        .filter(|s| !s.is_empty())
}

/// Collect all embedded URLs from plain text.
pub fn extract_urls(text: &str) -> Vec<String> {
    url_matches(text).map(str::to_string).collect()
}
