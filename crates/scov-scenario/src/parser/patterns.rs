//! Line patterns for section headers, scenario headers, steps, tags and tables
//!
//! All functions take a single trimmed, decoration-stripped line.

use once_cell::sync::Lazy;
use regex::Regex;
use std::borrow::Cow;

fn re(pattern: &str) -> Regex {
    Regex::new(pattern).expect("built-in pattern must compile")
}

static SECTION_HEADER: Lazy<Regex> = Lazy::new(|| {
    re(r"(?i)^(feature|ability|business need|background|rule|examples|scenarios)\s*:\s*(.*)$")
});

static KEYWORD_HEADER: Lazy<Regex> = Lazy::new(|| {
    re(r"(?i)^(?:scenario|example|test\s*case|test|tc|use\s*case|case)(?:\s*#?\s*\d+)?\s*:\s*(.*)$")
});

static OUTLINE_HEADER: Lazy<Regex> = Lazy::new(|| {
    re(r"(?i)^(?:scenario|example|test\s*case)\s+(?:outline|template)(?:\s*#?\s*\d+)?\s*:\s*(.*)$")
});

static NUMBERED_HEADER: Lazy<Regex> = Lazy::new(|| re(r"^\d{1,4}[.)]\s+(\p{Lu}.*)$"));

static CODED_HEADER: Lazy<Regex> =
    Lazy::new(|| re(r"^\p{Lu}{1,6}[-_]?\d{1,6}\s*[-–—:|]\s*(\S.*)$"));

static STEP_LINE: Lazy<Regex> = Lazy::new(|| re(r"(?i)^(?:given|when|then|and|but)\b"));

static NUMBERED_STEP: Lazy<Regex> =
    Lazy::new(|| re(r"(?i)^\d{1,4}[.)]\s+((?:given|when|then|and|but)\b.*)$"));

static LOOSE_DIGIT_LEADING: Lazy<Regex> =
    Lazy::new(|| re(r"^\d+\s*[-.:)]?\s*(\p{L}.*)$"));

static LOOSE_CODE_LEADING: Lazy<Regex> =
    Lazy::new(|| re(r"^[A-Za-z]{1,6}[-_]?\d+\b[\s:\-–—|.]*(.*)$"));

/// Leading words that mark a line as Gherkin rather than a free-form title
const GHERKIN_KEYWORDS: &[&str] = &[
    "given", "when", "then", "and", "but", "feature", "background", "rule", "examples",
    "scenarios", "scenario", "example",
];

/// Lower-case words allowed inside a Title-Case phrase
const CONNECTORS: &[&str] = &[
    "a", "an", "the", "of", "to", "in", "on", "for", "and", "or", "with", "as", "by", "at",
    "from", "via", "into", "per", "vs", "is", "be",
];

/// Section header kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Section {
    Feature(String),
    Background,
    Rule(String),
    Examples,
}

/// Which header pattern fired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeaderKind {
    Keyword,
    Outline,
    Numbered,
    Coded,
    TitleCase,
    Heuristic,
}

/// A recognized scenario header
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct HeaderMatch {
    pub(crate) kind: HeaderKind,
    /// `None` when the pattern captured an empty title
    pub(crate) title: Option<String>,
}

impl HeaderMatch {
    fn captured(kind: HeaderKind, capture: &str) -> Self {
        let capture = capture.trim();
        Self {
            kind,
            title: (!capture.is_empty()).then(|| capture.to_string()),
        }
    }

    fn whole_line(kind: HeaderKind, line: &str) -> Self {
        Self {
            kind,
            title: Some(line.trim().to_string()),
        }
    }
}

/// Line after markdown decorations were removed
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Cleaned<'a> {
    pub(crate) text: Cow<'a, str>,
    /// Line started with `#` (markdown heading or Gherkin comment)
    pub(crate) hashed: bool,
    /// Line started with `* `, the Gherkin bullet step keyword
    pub(crate) starred: bool,
}

/// Strip heading marks, quotes, bullets, step numbering and bold markers
pub(crate) fn strip_decorations(line: &str) -> Cleaned<'_> {
    let mut text = line.trim();
    let hashed = text.starts_with('#');
    if hashed {
        text = text.trim_start_matches('#').trim_start();
    }
    if let Some(rest) = text.strip_prefix('>') {
        text = rest.trim_start();
    }
    let starred = text.starts_with("* ");
    for bullet in ["- ", "* ", "+ "] {
        if let Some(rest) = text.strip_prefix(bullet) {
            text = rest.trim_start();
            break;
        }
    }
    if let Some(step) = NUMBERED_STEP.captures(text).and_then(|caps| caps.get(1)) {
        text = step.as_str();
    }
    let text = if text.contains("**") {
        Cow::Owned(text.replace("**", "").trim().to_string())
    } else {
        Cow::Borrowed(text)
    };
    Cleaned {
        text,
        hashed,
        starred,
    }
}

/// Section header (`Feature:`, `Background:`, `Rule:`, `Examples:`)
pub(crate) fn match_section(line: &str) -> Option<Section> {
    let first = line.as_bytes().first()?.to_ascii_lowercase();
    if !matches!(first, b'f' | b'a' | b'b' | b'r' | b'e' | b's') {
        return None;
    }
    let caps = SECTION_HEADER.captures(line)?;
    let keyword = caps.get(1)?.as_str().to_ascii_lowercase();
    let rest = caps.get(2).map_or("", |m| m.as_str()).trim().to_string();
    Some(match keyword.as_str() {
        "background" => Section::Background,
        "rule" => Section::Rule(rest),
        "examples" | "scenarios" => Section::Examples,
        _ => Section::Feature(rest),
    })
}

/// Explicit keyword headers only (`Scenario:` and outline forms)
pub(crate) fn match_keyword_header(line: &str) -> Option<HeaderMatch> {
    if let Some(caps) = OUTLINE_HEADER.captures(line) {
        return Some(HeaderMatch::captured(
            HeaderKind::Outline,
            caps.get(1).map_or("", |m| m.as_str()),
        ));
    }
    KEYWORD_HEADER.captures(line).map(|caps| {
        HeaderMatch::captured(HeaderKind::Keyword, caps.get(1).map_or("", |m| m.as_str()))
    })
}

/// Primary header patterns in priority order
pub(crate) fn match_header(line: &str) -> Option<HeaderMatch> {
    if let Some(m) = match_keyword_header(line) {
        return Some(m);
    }
    for (kind, pattern) in [
        (HeaderKind::Numbered, &NUMBERED_HEADER),
        (HeaderKind::Coded, &CODED_HEADER),
    ] {
        let Some(capture) = pattern.captures(line).and_then(|caps| caps.get(1)) else {
            continue;
        };
        // a numbered step list is not a run of headers
        if !is_step(capture.as_str()) {
            return Some(HeaderMatch::captured(kind, capture.as_str()));
        }
    }
    is_title_case_phrase(line).then(|| HeaderMatch::whole_line(HeaderKind::TitleCase, line))
}

/// Looser recall-oriented header heuristics, tried only after
/// [`match_header`] and step recognition failed
pub(crate) fn match_heuristic_header(line: &str) -> Option<HeaderMatch> {
    if starts_with_gherkin_keyword(line) {
        return None;
    }
    let first = line.chars().next()?;
    if first.is_ascii_digit() {
        return LOOSE_DIGIT_LEADING.captures(line).map(|caps| {
            HeaderMatch::captured(HeaderKind::Heuristic, caps.get(1).map_or("", |m| m.as_str()))
        });
    }
    if let Some(caps) = LOOSE_CODE_LEADING.captures(line) {
        let rest = caps.get(1).map_or("", |m| m.as_str()).trim();
        if !rest.is_empty() && line.chars().any(|c| c.is_ascii_digit()) {
            return Some(HeaderMatch::captured(HeaderKind::Heuristic, rest));
        }
    }
    is_loose_title_case(line).then(|| HeaderMatch::whole_line(HeaderKind::Heuristic, line))
}

/// Given/When/Then/And/But line, with a first-character pre-check
pub(crate) fn is_step(line: &str) -> bool {
    let Some(first) = line.as_bytes().first() else {
        return false;
    };
    matches!(first.to_ascii_lowercase(), b'g' | b'w' | b't' | b'a' | b'b') && STEP_LINE.is_match(line)
}

/// Tags on a `@tag @other` line
pub(crate) fn tags(line: &str) -> Vec<&str> {
    line.split_whitespace()
        .filter_map(|word| word.strip_prefix('@'))
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Table row `| a | b |`
pub(crate) fn is_table_row(line: &str) -> bool {
    line.starts_with('|')
}

fn starts_with_gherkin_keyword(line: &str) -> bool {
    let first_word = line
        .split(|c: char| !c.is_alphanumeric())
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    GHERKIN_KEYWORDS.contains(&first_word.as_str())
}

fn word_chars_ok(word: &str) -> bool {
    word.chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '-' | '\'' | '&' | '/' | '(' | ')' | ','))
}

fn is_capitalized(word: &str) -> bool {
    word.trim_start_matches('(')
        .chars()
        .next()
        .is_some_and(|c| c.is_uppercase() || c.is_ascii_digit())
}

/// Strict Title-Case phrase: every word capitalized except connectors
fn is_title_case_phrase(line: &str) -> bool {
    if line.len() > 120 || line.ends_with(['.', ':', ';', '?', '!', ',']) {
        return false;
    }
    if !line.chars().next().is_some_and(char::is_uppercase) || starts_with_gherkin_keyword(line) {
        return false;
    }
    let words: Vec<&str> = line.split_whitespace().collect();
    if !(2..=12).contains(&words.len()) || !words.iter().all(|w| word_chars_ok(w)) {
        return false;
    }
    let mut capitalized = 0;
    for word in &words {
        if is_capitalized(word) {
            capitalized += 1;
        } else if !CONNECTORS.contains(&word.to_lowercase().as_str()) {
            return false;
        }
    }
    capitalized >= 2
}

/// Loose Title-Case: most words capitalized
fn is_loose_title_case(line: &str) -> bool {
    if line.len() > 150 || line.ends_with(['.', ':', ';']) {
        return false;
    }
    if !line.chars().next().is_some_and(char::is_uppercase) {
        return false;
    }
    let words: Vec<&str> = line
        .split_whitespace()
        .filter(|w| w.chars().next().is_some_and(char::is_alphabetic))
        .collect();
    if words.len() < 2 {
        return false;
    }
    let capitalized = words.iter().filter(|w| is_capitalized(w)).count();
    capitalized * 5 >= words.len() * 3
}
