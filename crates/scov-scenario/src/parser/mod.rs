//! Scenario parser
//!
//! Single forward pass over document lines with no backtracking. Recognizes,
//! in order: blank lines, section headers, tag lines, table rows, primary
//! scenario header patterns, step lines and finally the looser recall
//! heuristics. Anything else is counted as unclassified and dropped.
//!
//! Malformed input never fails; the worst case is zero scenarios plus
//! diagnostics explaining why.

use crate::scenario::Scenario;
use serde::Serialize;
use std::path::Path;

mod diagnostics;
mod patterns;
mod state;

pub use diagnostics::ParseDiagnostics;
pub use state::ParserState;

/// Title used when a header pattern matched but captured no text
pub const PLACEHOLDER_TITLE: &str = "Untitled Scenario";

/// Output of parsing one document
#[derive(Debug, Clone, Serialize)]
pub struct ParsedDocument {
    /// Document identifier
    pub document: String,
    /// `Feature:` names in document order
    pub features: Vec<String>,
    /// Scenarios in document order, titles unique
    pub scenarios: Vec<Scenario>,
    /// Line accounting
    pub diagnostics: ParseDiagnostics,
}

impl ParsedDocument {
    /// Number of scenarios
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// No scenarios were found
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Scenarios per non-blank line
    #[must_use]
    pub fn scenario_density(&self) -> f64 {
        self.diagnostics.scenario_density(self.scenarios.len())
    }
}

/// Parser trait for turning document text into scenarios
///
/// Implement this trait to add support for new document formats.
pub trait DocumentParser: Send + Sync {
    /// Parse document text; never fails
    fn parse_document(&self, document: &str, text: &str) -> ParsedDocument;

    /// Supported file extensions (without dot)
    fn extensions(&self) -> &[&str];

    /// Check if this parser is meant for the given path
    fn can_parse(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| {
                self.extensions()
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
    }
}

/// Gherkin-style scenario parser
#[derive(Debug, Clone, Copy, Default)]
pub struct ScenarioParser;

impl ScenarioParser {
    /// Create new scenario parser
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Parse text, discarding diagnostics
    #[must_use]
    pub fn parse(&self, text: &str) -> Vec<Scenario> {
        self.parse_document("", text).scenarios
    }
}

impl DocumentParser for ScenarioParser {
    fn parse_document(&self, document: &str, text: &str) -> ParsedDocument {
        text.lines()
            .enumerate()
            .fold(ParserState::new(document), |mut state, (index, line)| {
                state.feed(index + 1, line);
                state
            })
            .finish()
    }

    fn extensions(&self) -> &[&str] {
        &["feature", "gherkin", "md", "markdown", "txt"]
    }
}

/// Parse text with the default parser
#[must_use]
pub fn parse_scenarios(text: &str) -> Vec<Scenario> {
    ScenarioParser::new().parse(text)
}
