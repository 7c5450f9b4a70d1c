//! Parser state machine
//!
//! [`ParserState`] is folded over the document lines. It can be fed partial
//! line sequences and inspected between lines.

use super::diagnostics::ParseDiagnostics;
use super::patterns::{self, HeaderKind, HeaderMatch, Section};
use super::{ParsedDocument, PLACEHOLDER_TITLE};
use crate::scenario::{Scenario, SourceLocation};
use std::collections::HashSet;

/// Scenario being accumulated
#[derive(Debug, Clone)]
struct OpenScenario {
    title: String,
    line: usize,
    outline: bool,
    steps: Vec<String>,
    tags: Vec<String>,
    /// Header row of the current Examples table already consumed
    examples_header_seen: bool,
    /// Line numbers of example data rows
    example_rows: Vec<usize>,
}

/// Mutable parse state for one document
#[derive(Debug, Clone)]
pub struct ParserState {
    document: String,
    current_feature_name: Option<String>,
    feature_tags: Vec<String>,
    features: Vec<String>,
    in_background: bool,
    in_rule: bool,
    in_examples: bool,
    current: Option<OpenScenario>,
    pending_tags: Vec<String>,
    emitted_titles: HashSet<String>,
    scenarios: Vec<Scenario>,
    diagnostics: ParseDiagnostics,
}

impl ParserState {
    /// Fresh state for `document`
    #[must_use]
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            current_feature_name: None,
            feature_tags: Vec::new(),
            features: Vec::new(),
            in_background: false,
            in_rule: false,
            in_examples: false,
            current: None,
            pending_tags: Vec::new(),
            emitted_titles: HashSet::new(),
            scenarios: Vec::new(),
            diagnostics: ParseDiagnostics::default(),
        }
    }

    /// Consume one line (`line_no` is 1-based)
    pub fn feed(&mut self, line_no: usize, raw: &str) {
        self.diagnostics.total_lines += 1;

        if raw.trim().is_empty() {
            self.diagnostics.blank_lines += 1;
            return;
        }

        let cleaned = patterns::strip_decorations(raw);
        let line = cleaned.text.as_ref();
        if line.is_empty() {
            self.diagnostics.comment_lines += 1;
            return;
        }

        if let Some(section) = patterns::match_section(line) {
            self.diagnostics.section_headers += 1;
            self.enter_section(section);
            return;
        }

        if cleaned.hashed {
            match patterns::match_keyword_header(line) {
                Some(header) => self.open_scenario(line_no, header),
                None => self.diagnostics.comment_lines += 1,
            }
            return;
        }

        if line.starts_with('@') {
            self.diagnostics.tag_lines += 1;
            self.add_tags(&patterns::tags(line));
            return;
        }

        if patterns::is_table_row(line) {
            self.diagnostics.table_rows += 1;
            self.add_table_row(line_no);
            return;
        }

        if cleaned.starred
            && (self.current.is_some() || self.in_background)
            && patterns::match_keyword_header(line).is_none()
        {
            self.add_step(line);
            return;
        }

        if let Some(header) = patterns::match_header(line) {
            self.open_scenario(line_no, header);
            return;
        }

        if patterns::is_step(line) {
            self.add_step(line);
            return;
        }

        if !(self.in_background || self.in_rule || self.in_examples) {
            if let Some(header) = patterns::match_heuristic_header(line) {
                self.open_scenario(line_no, header);
                return;
            }
        }

        self.diagnostics.unclassified_lines += 1;
        tracing::trace!(line = line_no, text = line, "unclassified line");
    }

    /// Finalize the open scenario and return everything parsed
    #[must_use]
    pub fn finish(mut self) -> ParsedDocument {
        self.finalize_open();
        tracing::debug!(
            document = %self.document,
            scenarios = self.scenarios.len(),
            unclassified = self.diagnostics.unclassified_lines,
            "document parsed"
        );
        ParsedDocument {
            document: self.document,
            features: self.features,
            scenarios: self.scenarios,
            diagnostics: self.diagnostics,
        }
    }

    /// Name of the most recent `Feature:`
    #[inline]
    #[must_use]
    pub fn current_feature_name(&self) -> Option<&str> {
        self.current_feature_name.as_deref()
    }

    /// Inside a `Background:` block
    #[inline]
    #[must_use]
    pub fn in_background(&self) -> bool {
        self.in_background
    }

    /// Inside a `Rule:` preamble (before its first scenario)
    #[inline]
    #[must_use]
    pub fn in_rule(&self) -> bool {
        self.in_rule
    }

    /// Inside an `Examples:` block
    #[inline]
    #[must_use]
    pub fn in_examples(&self) -> bool {
        self.in_examples
    }

    /// Title of the scenario being accumulated
    #[inline]
    #[must_use]
    pub fn open_title(&self) -> Option<&str> {
        self.current.as_ref().map(|s| s.title.as_str())
    }

    /// Steps accumulated for the open scenario
    #[must_use]
    pub fn open_steps(&self) -> &[String] {
        self.current.as_ref().map_or(&[], |s| s.steps.as_slice())
    }

    /// Scenarios finalized so far
    #[inline]
    #[must_use]
    pub fn scenarios(&self) -> &[Scenario] {
        &self.scenarios
    }

    /// Diagnostics so far
    #[inline]
    #[must_use]
    pub fn diagnostics(&self) -> &ParseDiagnostics {
        &self.diagnostics
    }

    fn enter_section(&mut self, section: Section) {
        match section {
            Section::Feature(name) => {
                self.finalize_open();
                self.feature_tags = std::mem::take(&mut self.pending_tags);
                if !name.is_empty() {
                    self.features.push(name.clone());
                }
                self.current_feature_name = (!name.is_empty()).then_some(name);
                self.in_background = false;
                self.in_rule = false;
                self.in_examples = false;
            }
            Section::Background => {
                self.finalize_open();
                self.in_background = true;
                self.in_examples = false;
            }
            Section::Rule(_) => {
                self.finalize_open();
                self.pending_tags.clear();
                self.in_rule = true;
                self.in_background = false;
                self.in_examples = false;
            }
            Section::Examples => {
                self.in_examples = true;
                if let Some(open) = self.current.as_mut() {
                    open.examples_header_seen = false;
                }
            }
        }
    }

    fn open_scenario(&mut self, line_no: usize, header: HeaderMatch) {
        self.finalize_open();

        if header.kind == HeaderKind::Heuristic {
            self.diagnostics.heuristic_headers += 1;
        } else {
            self.diagnostics.scenario_headers += 1;
        }

        let title = header.title.unwrap_or_else(|| {
            self.diagnostics.placeholder_titles += 1;
            tracing::warn!(
                document = %self.document,
                line = line_no,
                "scenario header without title, using placeholder"
            );
            PLACEHOLDER_TITLE.to_string()
        });
        let outline = header.kind == HeaderKind::Outline || title.to_lowercase().contains("outline");

        self.in_background = false;
        self.in_rule = false;
        self.in_examples = false;
        self.current = Some(OpenScenario {
            title,
            line: line_no,
            outline,
            steps: Vec::new(),
            tags: std::mem::take(&mut self.pending_tags),
            examples_header_seen: false,
            example_rows: Vec::new(),
        });
    }

    fn add_step(&mut self, line: &str) {
        match self.current.as_mut() {
            Some(open) if !self.in_background && !self.in_rule => {
                open.steps.push(line.to_string());
                self.diagnostics.step_lines += 1;
            }
            _ => self.diagnostics.ignored_step_lines += 1,
        }
    }

    fn add_tags(&mut self, tags: &[&str]) {
        let target = match self.current.as_mut() {
            Some(open) => &mut open.tags,
            None => &mut self.pending_tags,
        };
        target.extend(tags.iter().map(|t| (*t).to_string()));
    }

    fn add_table_row(&mut self, line_no: usize) {
        if !self.in_examples {
            return;
        }
        if let Some(open) = self.current.as_mut().filter(|open| open.outline) {
            if open.examples_header_seen {
                open.example_rows.push(line_no);
            } else {
                open.examples_header_seen = true;
            }
        }
    }

    fn finalize_open(&mut self) {
        let Some(open) = self.current.take() else {
            return;
        };

        if open.outline && !open.example_rows.is_empty() {
            self.diagnostics.expanded_examples += open.example_rows.len();
            for (index, row_line) in open.example_rows.iter().enumerate() {
                let title = format!("{} - Example {}", open.title, index + 1);
                self.emit(title, open.steps.clone(), &open.tags, *row_line);
            }
        } else {
            self.emit(open.title, open.steps, &open.tags, open.line);
        }
    }

    fn emit(&mut self, authored: String, steps: Vec<String>, tags: &[String], line: usize) {
        let display = self.unique_title(&authored);
        match Scenario::new(authored, steps) {
            Ok(scenario) => {
                let mut scenario = scenario
                    .with_display_title(display)
                    .with_tags(&self.feature_tags)
                    .with_tags(tags)
                    .with_location(SourceLocation::new(self.document.clone(), line));
                if let Some(feature) = &self.current_feature_name {
                    scenario = scenario.with_feature(feature.clone());
                }
                self.scenarios.push(scenario.with_reporting_labels());
            }
            Err(err) => {
                tracing::warn!(document = %self.document, line, error = %err, "scenario rejected");
            }
        }
    }

    /// Smallest ` (N)` suffix that keeps titles unique within this run
    fn unique_title(&mut self, candidate: &str) -> String {
        let candidate = candidate.trim();
        if self.emitted_titles.insert(candidate.to_string()) {
            return candidate.to_string();
        }
        self.diagnostics.disambiguated_titles += 1;
        let mut n = 1usize;
        loop {
            let title = format!("{candidate} ({n})");
            if self.emitted_titles.insert(title.clone()) {
                return title;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(state: &mut ParserState, lines: &[&str]) {
        for (i, line) in lines.iter().enumerate() {
            state.feed(i + 1, line);
        }
    }

    #[test]
    fn feature_header_sets_name() {
        let mut state = ParserState::new("doc");
        feed_all(&mut state, &["Feature: Accounts"]);
        assert_eq!(state.current_feature_name(), Some("Accounts"));
        assert!(state.open_title().is_none());
        assert_eq!(state.diagnostics().section_headers, 1);
    }

    #[test]
    fn steps_accumulate_on_open_scenario() {
        let mut state = ParserState::new("doc");
        feed_all(
            &mut state,
            &["Scenario: Login", "  Given a user", "  When they sign in"],
        );
        assert_eq!(state.open_title(), Some("Login"));
        assert_eq!(state.open_steps(), ["Given a user", "When they sign in"]);
        assert!(state.scenarios().is_empty());
    }

    #[test]
    fn star_bullets_are_steps_inside_a_scenario() {
        let mut state = ParserState::new("doc");
        feed_all(
            &mut state,
            &["* Add New User", "Scenario: Save", "  * User Clicks Save", "  * the form closes"],
        );
        assert_eq!(state.open_title(), Some("Save"));
        assert_eq!(state.open_steps(), ["User Clicks Save", "the form closes"]);
        // no scenario open yet, so the first bullet is still a header
        assert_eq!(state.scenarios().len(), 1);
        assert_eq!(state.scenarios()[0].title(), "Add New User");
    }

    #[test]
    fn background_steps_are_ignored() {
        let mut state = ParserState::new("doc");
        feed_all(&mut state, &["Background:", "  Given a clean database"]);
        assert!(state.in_background());
        assert_eq!(state.diagnostics().ignored_step_lines, 1);

        feed_all(&mut state, &["Scenario: First"]);
        assert!(!state.in_background());
    }

    #[test]
    fn rule_preamble_then_scenario() {
        let mut state = ParserState::new("doc");
        feed_all(&mut state, &["Rule: Only admins", "Scenario: Admin edits", "Given an admin"]);
        assert!(!state.in_rule());
        assert_eq!(state.open_steps().len(), 1);
    }

    #[test]
    fn new_header_finalizes_previous() {
        let mut state = ParserState::new("doc");
        feed_all(&mut state, &["Scenario: One", "Given a", "Scenario: Two"]);
        assert_eq!(state.scenarios().len(), 1);
        assert_eq!(state.scenarios()[0].steps(), ["Given a"]);
        assert_eq!(state.open_title(), Some("Two"));
    }

    #[test]
    fn tags_attach_to_open_or_pending() {
        let mut state = ParserState::new("doc");
        feed_all(
            &mut state,
            &["@smoke", "Scenario: One", "@extra", "Given a"],
        );
        let parsed = state.finish();
        let tags = parsed.scenarios[0].tags();
        assert!(tags.contains("smoke"));
        assert!(tags.contains("extra"));
    }

    #[test]
    fn examples_expand_outline() {
        let mut state = ParserState::new("doc");
        feed_all(
            &mut state,
            &[
                "Scenario Outline: Eat cucumbers",
                "  Given there are <start> cucumbers",
                "  When I eat <eat> cucumbers",
                "  Examples:",
                "    | start | eat |",
                "    | 12    | 5   |",
                "    | 20    | 5   |",
            ],
        );
        assert!(state.in_examples());
        let parsed = state.finish();
        let titles: Vec<&str> = parsed.scenarios.iter().map(Scenario::title).collect();
        assert_eq!(titles, ["Eat cucumbers - Example 1", "Eat cucumbers - Example 2"]);
        assert_eq!(parsed.scenarios[1].steps().len(), 2);
        assert_eq!(parsed.scenarios[1].source_location().line, 7);
        assert_eq!(parsed.diagnostics.expanded_examples, 2);
    }

    #[test]
    fn unique_title_picks_smallest_free_suffix() {
        let mut state = ParserState::new("doc");
        assert_eq!(state.unique_title("A"), "A");
        assert_eq!(state.unique_title("A (2)"), "A (2)");
        assert_eq!(state.unique_title("A"), "A (1)");
        assert_eq!(state.unique_title("A"), "A (3)");
        assert_eq!(state.diagnostics().disambiguated_titles, 2);
    }
}
