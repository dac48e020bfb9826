//! Salary-mention detection.

use std::sync::LazyLock;

use regex::Regex;

/// Compensation vocabulary, matched case-insensitively as substrings.
const SALARY_KEYWORDS: &[&str] = &[
    "salary",
    "compensation",
    "stipend",
    "remuneration",
    "wage",
    "per annum",
    "pay range",
    "pay rate",
    "hourly rate",
];

/// A currency symbol followed by a digit, e.g. "$85,000".
static CURRENCY_AMOUNT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[$€£]\s?\d").expect("currency pattern compiles"));

/// A thousands-separated figure leading into a range, e.g. "85,000-95,000".
static AMOUNT_RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{1,3}(?:,\d{3})+\s*(?:-|–|—|to)\s*[$€£]?\d").expect("range pattern compiles")
});

/// Heuristically classify text as salary-bearing.
///
/// Keyword and pattern based; neither precision nor recall is guaranteed.
pub fn detect_salary(text: &str) -> bool {
    let lower = text.to_lowercase();
    if SALARY_KEYWORDS.iter().any(|k| lower.contains(k)) {
        return true;
    }
    CURRENCY_AMOUNT.is_match(text) || AMOUNT_RANGE.is_match(text)
}
