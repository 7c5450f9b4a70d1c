//! Text and JSON rendering for command output

use anyhow::{Context, Result};
use scov_analysis::{AnalysisResult, DuplicateGroup};
use scov_scenario::ParsedDocument;
use serde::Serialize;
use std::fmt::Write as _;

/// Pretty JSON for any report payload
pub(crate) fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value).context("failed to encode JSON report")
}

/// Duplicate groups with a summary header, for `--json`
#[derive(Serialize)]
pub(crate) struct DuplicateReport<'r, 'a> {
    pub(crate) document: &'r str,
    pub(crate) scenarios: usize,
    pub(crate) groups: &'r [DuplicateGroup<'a>],
}

pub(crate) fn render_parse(parsed: &ParsedDocument) -> String {
    let mut out = String::new();
    let d = &parsed.diagnostics;
    let _ = writeln!(
        out,
        "{}: {} scenarios in {} feature(s)",
        parsed.document,
        parsed.len(),
        parsed.features.len()
    );
    for scenario in &parsed.scenarios {
        let _ = writeln!(
            out,
            "  [{}] {} ({} steps, {})",
            scenario.workflow().label(),
            scenario.title(),
            scenario.steps().len(),
            scenario.source_location()
        );
    }
    let _ = writeln!(
        out,
        "lines: {} non-blank, {} unclassified ({:.1}%), density {:.3}",
        d.non_blank_lines(),
        d.unclassified_lines,
        d.unclassified_ratio() * 100.0,
        parsed.scenario_density()
    );
    if d.has_defects() {
        let _ = writeln!(out, "warning: {} header(s) had no title", d.placeholder_titles);
    }
    out
}

pub(crate) fn render_coverage(result: &AnalysisResult<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Coverage: {}% ({}/{} covered)",
        result.coverage_percent,
        result.covered_count(),
        result.source.len()
    );

    if !result.covered.is_empty() {
        let _ = writeln!(out, "\nCovered:");
        for m in &result.covered {
            let _ = writeln!(
                out,
                "  ✓ {} -> {} ({:.2}, {}, threshold {:.2})",
                m.source.title(),
                m.qa.title(),
                m.score,
                m.basis,
                m.threshold
            );
        }
    }

    if !result.missing.is_empty() {
        let _ = writeln!(out, "\nMissing:");
        for m in &result.missing {
            match m.best_candidate {
                Some(best) => {
                    let _ = writeln!(
                        out,
                        "  ✗ {} (closest: {} at {:.2}, threshold {:.2})",
                        m.source.title(),
                        best.title(),
                        m.best_score,
                        m.threshold
                    );
                }
                None => {
                    let _ = writeln!(out, "  ✗ {} (no candidate)", m.source.title());
                }
            }
        }
    }

    if !result.unmatched_qa.is_empty() {
        let _ = writeln!(out, "\nUnmatched QA ({}):", result.unmatched_qa.len());
        for s in &result.unmatched_qa {
            let _ = writeln!(out, "  - {}", s.title());
        }
    }
    out
}

pub(crate) fn render_duplicates(report: &DuplicateReport<'_, '_>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{}: {} duplicate group(s) across {} scenarios",
        report.document,
        report.groups.len(),
        report.scenarios
    );
    for group in report.groups {
        let _ = writeln!(
            out,
            "  [{} {}%] {}",
            group.tier,
            group.similarity_percent(),
            group.titles().join(" | ")
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use scov_analysis::{CoverageMatcher, DuplicateClusterer};
    use scov_test_utils::{parse, QA_DOCUMENT, SOURCE_DOCUMENT};

    #[test]
    fn parse_summary_lists_scenarios() {
        let parsed = parse("source.feature", SOURCE_DOCUMENT);
        let text = render_parse(&parsed);
        assert!(text.starts_with("source.feature: 3 scenarios in 1 feature(s)"));
        assert!(text.contains("User Login Success (3 steps, source.feature:"));
        assert!(!text.contains("warning:"));
    }

    #[test]
    fn coverage_summary() {
        let source = parse("source", SOURCE_DOCUMENT).scenarios;
        let qa = parse("qa", QA_DOCUMENT).scenarios;
        let result = CoverageMatcher::default().analyze(&source, &qa);
        let text = render_coverage(&result);

        assert!(text.starts_with("Coverage: 67% (2/3 covered)"));
        assert!(text.contains("✓ User Login Success -> User Login Success (1.00, exact title"));
        assert!(text.contains("✗ Export Report as PDF (no candidate)"));
        assert!(text.contains("Unmatched QA (2):"));
    }

    #[test]
    fn duplicate_summary_and_json() {
        let qa = parse("qa", QA_DOCUMENT).scenarios;
        let groups = DuplicateClusterer::default().cluster(&qa);
        let report = DuplicateReport {
            document: "qa",
            scenarios: qa.len(),
            groups: &groups,
        };

        let text = render_duplicates(&report);
        assert!(text.contains("[exact 100%] Add New User | Add New User (1)"));

        let json = to_json(&report).unwrap();
        assert!(json.contains("\"tier\": \"exact\""));
    }
}
