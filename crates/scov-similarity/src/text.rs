//! Title and step normalization helpers

use std::collections::BTreeSet;

/// Tokens shorter than this (in chars) carry no signal
pub const MIN_TOKEN_CHARS: usize = 3;

/// Gherkin keywords stripped from the front of a step before tokenizing
const STEP_KEYWORDS: &[&str] = &["given", "when", "then", "and", "but"];

/// Lower-case, trim and collapse internal whitespace
#[must_use]
pub fn normalize_title(title: &str) -> String {
    title
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whitespace-split, lower-cased tokens longer than two characters
///
/// Punctuation at either end of a token is dropped so `PDF,` and `pdf`
/// compare equal.
#[must_use]
pub fn tokens(text: &str) -> BTreeSet<String> {
    text.split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| word.chars().count() >= MIN_TOKEN_CHARS)
        .map(str::to_lowercase)
        .collect()
}

/// Step tokens without the leading Given/When/Then/And/But
#[must_use]
pub fn step_tokens(step: &str) -> BTreeSet<String> {
    tokens(strip_step_keyword(step))
}

/// Step text without its leading Gherkin keyword
#[must_use]
pub fn strip_step_keyword(step: &str) -> &str {
    let step = step.trim();
    let first_end = step.find(char::is_whitespace).unwrap_or(step.len());
    let first = &step[..first_end];
    if STEP_KEYWORDS.iter().any(|kw| first.eq_ignore_ascii_case(kw)) {
        step[first_end..].trim_start()
    } else {
        step
    }
}
