//! Parse diagnostics
//!
//! The parser never fails; these counters are the quality signal callers
//! use instead.

use serde::Serialize;

/// Per-document line accounting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ParseDiagnostics {
    /// Lines fed to the parser
    pub total_lines: usize,
    /// Blank lines (skipped before any pattern runs)
    pub blank_lines: usize,
    /// `#` lines that matched no explicit keyword header
    pub comment_lines: usize,
    /// `Feature:` / `Background:` / `Rule:` / `Examples:` lines
    pub section_headers: usize,
    /// Lines accepted by the primary header patterns
    pub scenario_headers: usize,
    /// Lines accepted by the secondary recall heuristics
    pub heuristic_headers: usize,
    /// Step lines attached to a scenario
    pub step_lines: usize,
    /// Step lines outside a scenario or inside Background/Rule preambles
    pub ignored_step_lines: usize,
    /// `@tag` lines
    pub tag_lines: usize,
    /// `| a | b |` lines, including example headers
    pub table_rows: usize,
    /// Scenarios derived from outline example rows
    pub expanded_examples: usize,
    /// Non-blank lines no pattern recognized
    pub unclassified_lines: usize,
    /// Headers with no captured title (parser defect signal)
    pub placeholder_titles: usize,
    /// Titles that received a ` (N)` suffix
    pub disambiguated_titles: usize,
}

impl ParseDiagnostics {
    /// Non-blank lines
    #[inline]
    #[must_use]
    pub fn non_blank_lines(&self) -> usize {
        self.total_lines - self.blank_lines
    }

    /// Scenarios per non-blank line; a weak quality heuristic where a very
    /// low value on a long document suggests an unrecognized format
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn scenario_density(&self, scenario_count: usize) -> f64 {
        match self.non_blank_lines() {
            0 => 0.0,
            lines => scenario_count as f64 / lines as f64,
        }
    }

    /// Share of non-blank lines that nothing recognized
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn unclassified_ratio(&self) -> f64 {
        match self.non_blank_lines() {
            0 => 0.0,
            lines => self.unclassified_lines as f64 / lines as f64,
        }
    }

    /// Whether the parser had to synthesize any title
    #[inline]
    #[must_use]
    pub fn has_defects(&self) -> bool {
        self.placeholder_titles > 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn density_of_empty_document() {
        let d = ParseDiagnostics::default();
        assert_eq!(d.scenario_density(0), 0.0);
        assert_eq!(d.unclassified_ratio(), 0.0);
        assert!(!d.has_defects());
    }

    #[test]
    fn density_counts_non_blank_only() {
        let d = ParseDiagnostics {
            total_lines: 12,
            blank_lines: 2,
            unclassified_lines: 5,
            ..Default::default()
        };
        assert_eq!(d.non_blank_lines(), 10);
        assert!((d.scenario_density(2) - 0.2).abs() < f64::EPSILON);
        assert!((d.unclassified_ratio() - 0.5).abs() < f64::EPSILON);
    }
}
