use pretty_assertions::assert_eq;
use proptest::prelude::*;
use scov_analysis::{AnalysisConfig, CoverageMatcher, ParallelConfig};
use scov_scenario::Scenario;
use scov_similarity::MatchBasis;
use scov_test_utils::{gherkin_document, parse, scenario, LOGIN_SUCCESS_STEPS, QA_DOCUMENT, SOURCE_DOCUMENT};

#[test]
fn identical_login_scenario_is_fully_covered() {
    let doc = gherkin_document(&[("User Login Success", &LOGIN_SUCCESS_STEPS)]);
    let source = parse("source", &doc).scenarios;
    let qa = parse("qa", &doc).scenarios;

    let result = CoverageMatcher::default().analyze(&source, &qa);

    assert_eq!(result.coverage_percent, 100);
    assert!(result.missing.is_empty());
    assert_eq!(result.covered[0].basis, MatchBasis::ExactTitle);
    assert!(result.unmatched_qa.is_empty());
}

#[test]
fn unrelated_export_scenario_is_missing() {
    let source = parse(
        "source",
        &gherkin_document(&[(
            "Export Report as PDF",
            &["Given a monthly report", "When the manager exports it", "Then a file is saved"],
        )]),
    )
    .scenarios;
    let qa = parse(
        "qa",
        &gherkin_document(&[
            ("User Login Success", &LOGIN_SUCCESS_STEPS),
            ("Delete account", &["Given a member", "When they close the account"]),
        ]),
    )
    .scenarios;

    let result = CoverageMatcher::default().analyze(&source, &qa);

    assert_eq!(result.coverage_percent, 0);
    assert_eq!(result.missing.len(), 1);
    assert_eq!(result.missing[0].source.title(), "Export Report as PDF");
    assert!(result.missing[0].best_candidate.is_none());
    assert_eq!(result.unmatched_qa.len(), 2);
}

#[test]
fn fixture_documents() {
    let source = parse("source.feature", SOURCE_DOCUMENT).scenarios;
    let qa = parse("qa.feature", QA_DOCUMENT).scenarios;

    let result = CoverageMatcher::default().analyze(&source, &qa);

    let covered: Vec<_> = result.covered.iter().map(|m| m.source.title()).collect();
    assert_eq!(covered, vec!["User Login Success", "Toggle beta dashboard flag"]);
    let missing: Vec<_> = result.missing.iter().map(|m| m.source.title()).collect();
    assert_eq!(missing, vec!["Export Report as PDF"]);
    assert_eq!(result.coverage_percent, 67);

    // toggle scenarios get the relaxed threshold
    let toggle = result.match_for("Toggle beta dashboard flag").unwrap();
    assert!((toggle.threshold - 0.60).abs() < 1e-9);
    assert!(toggle.score < 0.70);

    let unmatched: Vec<_> = result.unmatched_qa.iter().map(|s| s.title()).collect();
    assert_eq!(unmatched, vec!["Add New User", "Add New User (1)"]);
}

#[test]
fn result_serializes_without_input_sets() {
    let source = parse("source", SOURCE_DOCUMENT).scenarios;
    let qa = parse("qa", QA_DOCUMENT).scenarios;
    let result = CoverageMatcher::default().analyze(&source, &qa);

    let json = serde_json::to_value(&result).unwrap();
    assert!(json.get("source").is_none());
    assert!(json.get("qa").is_none());
    assert_eq!(json["coverage_percent"], 67);
    assert_eq!(json["covered"][0]["basis"], "exact_title");
    assert_eq!(json["missing"][0]["best_candidate"], serde_json::Value::Null);
}

fn title() -> impl Strategy<Value = String> {
    prop::collection::vec(
        prop::sample::select(vec![
            "add", "user", "login", "export", "report", "pdf", "toggle", "flag", "beta", "search",
            "reset", "password", "account",
        ]),
        1..5,
    )
    .prop_map(|w| w.join(" "))
}

fn scenario_set(max: usize) -> impl Strategy<Value = Vec<Scenario>> {
    prop::collection::vec(title(), 0..max)
        .prop_map(|titles| titles.iter().map(|t| scenario(t, &[])).collect())
}

proptest! {
    #[test]
    fn prop_duplicate_qa_title_never_lowers_coverage(
        source in scenario_set(8),
        qa in scenario_set(8).prop_filter("non-empty", |q| !q.is_empty()),
        pick in any::<prop::sample::Index>(),
    ) {
        let matcher = CoverageMatcher::default();
        let before = matcher.analyze(&source, &qa).coverage_percent;

        let mut extended = qa.clone();
        extended.push(qa[pick.index(qa.len())].clone());
        let after = matcher.analyze(&source, &extended).coverage_percent;

        prop_assert!(after >= before, "{} -> {}", before, after);
    }

    #[test]
    fn prop_partition_of_source(source in scenario_set(10), qa in scenario_set(10)) {
        let result = CoverageMatcher::default().analyze(&source, &qa);
        prop_assert_eq!(result.covered.len() + result.missing.len(), source.len());
        for m in &result.covered {
            prop_assert!(m.score > m.threshold);
        }
        for m in &result.missing {
            prop_assert!(m.best_score <= m.threshold);
        }
    }

    #[test]
    fn prop_parallel_is_order_stable(source in scenario_set(10), qa in scenario_set(10)) {
        let seq = CoverageMatcher::new(AnalysisConfig::default().with_parallel(ParallelConfig::sequential()))
            .unwrap()
            .analyze(&source, &qa);
        let par = CoverageMatcher::new(AnalysisConfig::default().with_parallel(ParallelConfig::default().with_min_pairs(0)))
            .unwrap()
            .analyze(&source, &qa);
        prop_assert_eq!(seq.covered, par.covered);
        prop_assert_eq!(seq.missing, par.missing);
        prop_assert_eq!(seq.coverage_percent, par.coverage_percent);
    }
}
