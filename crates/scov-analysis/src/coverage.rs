//! Coverage Matcher
//!
//! Independent greedy best match per source scenario. QA scenarios are never
//! consumed: one QA test may cover several source scenarios. This is not a
//! stable assignment and must not become one, since that changes coverage
//! numbers.
//!
//! # Algorithm
//!
//! ```text
//! features(qa)                       (once per run)
//! for each source scenario s:        (rayon, order-preserving)
//!     best = first qa with the strictly highest score(s, qa)
//!     threshold = clamp(base + density(ratio) + toggle(s))
//!     covered iff best.score > threshold
//! unmatched_qa = qa whose title is no accepted best match
//! ```

use crate::cancel::CancellationToken;
use crate::config::{AnalysisConfig, MatchConfig};
use crate::error::{AnalysisOutcome, ConfigResult};
use rayon::prelude::*;
use scov_scenario::Scenario;
use scov_similarity::{MatchBasis, ScenarioFeatures, SimilarityScorer};
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use std::convert::Infallible;
use tracing::{debug, info};

/// A source scenario with an accepted QA match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoverageMatch<'a> {
    /// Source scenario
    pub source: &'a Scenario,
    /// Best-scoring QA scenario
    pub qa: &'a Scenario,
    /// Best score
    pub score: f64,
    /// Cascade tier behind the score
    pub basis: MatchBasis,
    /// Threshold the score exceeded
    pub threshold: f64,
}

/// A source scenario with no accepted match
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MissingScenario<'a> {
    /// Source scenario
    pub source: &'a Scenario,
    /// Closest QA scenario, if any scored above zero
    pub best_candidate: Option<&'a Scenario>,
    /// Score of `best_candidate` (0 when none)
    pub best_score: f64,
    /// Threshold the score failed to exceed
    pub threshold: f64,
}

/// Coverage report over two scenario sets
///
/// Borrows both inputs; nothing is copied.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult<'a> {
    /// Source set
    #[serde(skip)]
    pub source: &'a [Scenario],
    /// QA set
    #[serde(skip)]
    pub qa: &'a [Scenario],
    /// Source scenarios with an accepted match, in source order
    pub covered: Vec<CoverageMatch<'a>>,
    /// Source scenarios without one, in source order
    pub missing: Vec<MissingScenario<'a>>,
    /// QA scenarios that are no source scenario's accepted match, in QA order
    pub unmatched_qa: Vec<&'a Scenario>,
    /// `round(covered / source * 100)`, 0 for an empty source set
    pub coverage_percent: u32,
}

impl<'a> AnalysisResult<'a> {
    fn build(
        source: &'a [Scenario],
        qa: &'a [Scenario],
        covered: Vec<CoverageMatch<'a>>,
        missing: Vec<MissingScenario<'a>>,
    ) -> Self {
        let accepted: HashSet<&str> = covered.iter().map(|m| m.qa.title()).collect();
        let unmatched_qa = qa
            .iter()
            .filter(|q| !accepted.contains(q.title()))
            .collect();
        let coverage_percent = coverage_percent(covered.len(), source.len());
        Self {
            source,
            qa,
            covered,
            missing,
            unmatched_qa,
            coverage_percent,
        }
    }

    /// Covered source scenarios
    #[inline]
    #[must_use]
    pub fn covered_count(&self) -> usize {
        self.covered.len()
    }

    /// Missing source scenarios
    #[inline]
    #[must_use]
    pub fn missing_count(&self) -> usize {
        self.missing.len()
    }

    /// Check whether every source scenario is covered
    #[inline]
    #[must_use]
    pub fn is_fully_covered(&self) -> bool {
        self.missing.is_empty()
    }

    /// Look up the accepted match for a source title
    #[must_use]
    pub fn match_for(&self, source_title: &str) -> Option<&CoverageMatch<'a>> {
        self.covered.iter().find(|m| m.source.title() == source_title)
    }
}

/// `round(covered / total * 100)`, or 0 when `total` is 0
#[must_use]
pub fn coverage_percent(covered: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    #[allow(
        clippy::cast_precision_loss,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss
    )]
    let percent = (covered as f64 / total as f64 * 100.0).round() as u32;
    percent
}

/// Per-source outcome before the result is assembled
enum Decision<'a> {
    Covered(CoverageMatch<'a>),
    Missing(MissingScenario<'a>),
}

/// Matches a source set against a QA set
#[derive(Debug, Clone)]
pub struct CoverageMatcher {
    config: AnalysisConfig,
    scorer: SimilarityScorer,
}

impl Default for CoverageMatcher {
    fn default() -> Self {
        Self {
            config: AnalysisConfig::default(),
            scorer: SimilarityScorer::new(),
        }
    }
}

impl CoverageMatcher {
    /// Create a matcher after validating its thresholds
    ///
    /// # Errors
    /// Any `ConfigError` from [`AnalysisConfig::validate`].
    pub fn new(config: AnalysisConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            scorer: SimilarityScorer::new(),
        })
    }

    /// Active configuration
    #[inline]
    #[must_use]
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Classify every source scenario as covered or missing
    #[must_use]
    pub fn analyze<'a>(&self, source: &'a [Scenario], qa: &'a [Scenario]) -> AnalysisResult<'a> {
        match self.run(source, qa, || Ok::<(), Infallible>(())) {
            Ok(result) => result,
            Err(never) => match never {},
        }
    }

    /// As [`analyze`](Self::analyze), checking `cancel` before each source scenario
    ///
    /// # Errors
    /// `AnalysisError::Cancelled` if the token fires; no partial result is returned.
    pub fn analyze_with_cancel<'a>(
        &self,
        source: &'a [Scenario],
        qa: &'a [Scenario],
        cancel: &CancellationToken,
    ) -> AnalysisOutcome<AnalysisResult<'a>> {
        self.run(source, qa, || cancel.check())
    }

    /// Density ratio used for threshold adjustment
    ///
    /// Counts distinct normalized QA titles so that repeating an existing QA
    /// title never shifts the threshold.
    #[must_use]
    pub fn density_ratio(source: &[Scenario], qa_features: &[ScenarioFeatures]) -> f64 {
        if source.is_empty() {
            return 0.0;
        }
        let distinct: BTreeSet<&str> = qa_features
            .iter()
            .map(|f| f.normalized_title.as_str())
            .collect();
        #[allow(clippy::cast_precision_loss)]
        let ratio = distinct.len() as f64 / source.len() as f64;
        ratio
    }

    fn run<'a, E, C>(
        &self,
        source: &'a [Scenario],
        qa: &'a [Scenario],
        check: C,
    ) -> Result<AnalysisResult<'a>, E>
    where
        E: Send,
        C: Fn() -> Result<(), E> + Sync,
    {
        let parallel = self
            .config
            .parallel
            .should_parallelize(source.len().saturating_mul(qa.len()));

        let qa_features: Vec<ScenarioFeatures> = if parallel {
            qa.par_iter().map(ScenarioFeatures::from).collect()
        } else {
            qa.iter().map(ScenarioFeatures::from).collect()
        };
        let ratio = Self::density_ratio(source, &qa_features);
        let matching = &self.config.matching;

        debug!(
            source = source.len(),
            qa = qa.len(),
            ratio,
            parallel,
            "Starting coverage analysis"
        );

        let decide = |s: &'a Scenario| -> Result<Decision<'a>, E> {
            check()?;
            Ok(self.decide(s, qa, &qa_features, ratio, matching))
        };
        let decisions: Vec<Decision<'a>> = if parallel {
            source.par_iter().map(decide).collect::<Result<_, E>>()?
        } else {
            source.iter().map(decide).collect::<Result<_, E>>()?
        };

        let mut covered = Vec::new();
        let mut missing = Vec::new();
        for decision in decisions {
            match decision {
                Decision::Covered(m) => covered.push(m),
                Decision::Missing(m) => missing.push(m),
            }
        }

        let result = AnalysisResult::build(source, qa, covered, missing);
        info!(
            source = source.len(),
            qa = qa.len(),
            covered = result.covered.len(),
            missing = result.missing.len(),
            unmatched_qa = result.unmatched_qa.len(),
            coverage_percent = result.coverage_percent,
            "Coverage analysis complete"
        );
        Ok(result)
    }

    fn decide<'a>(
        &self,
        source: &'a Scenario,
        qa: &'a [Scenario],
        qa_features: &[ScenarioFeatures],
        ratio: f64,
        matching: &MatchConfig,
    ) -> Decision<'a> {
        let features = ScenarioFeatures::from(source);
        let threshold = matching.threshold_for(ratio, source.workflow().is_feature_toggle());

        // Strictly greater: ties keep the first-encountered candidate
        let mut best: Option<(usize, f64, MatchBasis)> = None;
        for (idx, candidate) in qa_features.iter().enumerate() {
            let m = self.scorer.explain_features(&features, candidate);
            if best.map_or(true, |(_, score, _)| m.score > score) {
                best = Some((idx, m.score, m.basis));
            }
        }

        match best {
            Some((idx, score, basis)) if score > threshold => {
                debug!(source = source.title(), qa = qa[idx].title(), score, threshold, %basis, "Covered");
                Decision::Covered(CoverageMatch {
                    source,
                    qa: &qa[idx],
                    score,
                    basis,
                    threshold,
                })
            }
            _ => {
                let (best_candidate, best_score) = match best {
                    Some((idx, score, _)) if score > 0.0 => (Some(&qa[idx]), score),
                    _ => (None, 0.0),
                };
                debug!(source = source.title(), best_score, threshold, "Missing");
                Decision::Missing(MissingScenario {
                    source,
                    best_candidate,
                    best_score,
                    threshold,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParallelConfig;
    use crate::error::AnalysisError;

    fn s(title: &str, steps: &[&str]) -> Scenario {
        Scenario::new(title, steps.iter().copied()).unwrap()
    }

    #[test]
    fn percent_rounding() {
        assert_eq!(coverage_percent(0, 0), 0);
        assert_eq!(coverage_percent(1, 3), 33);
        assert_eq!(coverage_percent(2, 3), 67);
        assert_eq!(coverage_percent(3, 3), 100);
    }

    #[test]
    fn empty_sets() {
        let matcher = CoverageMatcher::default();
        let qa = vec![s("Add New User", &[])];

        let result = matcher.analyze(&[], &qa);
        assert_eq!(result.coverage_percent, 0);
        assert_eq!(result.unmatched_qa.len(), 1);

        let source = vec![s("Add New User", &[])];
        let result = matcher.analyze(&source, &[]);
        assert_eq!(result.coverage_percent, 0);
        assert_eq!(result.missing.len(), 1);
        assert!(result.missing[0].best_candidate.is_none());
    }

    #[test]
    fn ties_keep_first_candidate() {
        let source = vec![s("Add New User", &[])];
        let qa = vec![
            s("Remove Old Report", &[]),
            s("Add New User", &["Given one"]),
            s("Add New User", &["Given two"]),
        ];
        let result = CoverageMatcher::default().analyze(&source, &qa);
        assert_eq!(result.covered.len(), 1);
        assert_eq!(result.covered[0].qa.steps(), ["Given one".to_string()]);
        assert_eq!(result.unmatched_qa.len(), 1);
    }

    #[test]
    fn qa_scenarios_are_reusable() {
        let source = vec![s("Add New User", &[]), s("add new user", &[])];
        let qa = vec![s("Add New User", &[])];
        let result = CoverageMatcher::default().analyze(&source, &qa);
        assert_eq!(result.coverage_percent, 100);
        assert!(result.covered.iter().all(|m| m.qa.title() == "Add New User"));
        assert!(result.unmatched_qa.is_empty());
    }

    #[test]
    fn score_equal_to_threshold_is_missing() {
        // clamp pins the threshold at exactly 0.95
        let config = AnalysisConfig::default()
            .with_matching(MatchConfig::default().with_base_threshold(0.95).with_clamp(0.95, 0.95));
        let matcher = CoverageMatcher::new(config).unwrap();
        let source = vec![s("Add New User", &[])];
        let qa = vec![s("add new user", &[])];
        let result = matcher.analyze(&source, &qa);
        assert_eq!(result.missing.len(), 1);
        assert!((result.missing[0].best_score - 0.95).abs() < f64::EPSILON);
    }

    #[test]
    fn parallel_matches_sequential() {
        let source: Vec<_> = ["Add New User", "Export Report", "Search catalogue", "Reset password"]
            .iter()
            .map(|t| s(t, &[]))
            .collect();
        let qa: Vec<_> = ["add new user", "Export Report as CSV", "Reset password", "Password reset"]
            .iter()
            .map(|t| s(t, &[]))
            .collect();

        let seq = CoverageMatcher::new(
            AnalysisConfig::default().with_parallel(ParallelConfig::sequential()),
        )
        .unwrap()
        .analyze(&source, &qa);
        let par = CoverageMatcher::new(
            AnalysisConfig::default().with_parallel(ParallelConfig::default().with_min_pairs(1)),
        )
        .unwrap()
        .analyze(&source, &qa);

        assert_eq!(seq.covered, par.covered);
        assert_eq!(seq.missing, par.missing);
        assert_eq!(seq.unmatched_qa, par.unmatched_qa);
    }

    #[test]
    fn cancelled_run_returns_no_result() {
        let token = CancellationToken::new();
        token.cancel();
        let source = vec![s("Add New User", &[])];
        let err = CoverageMatcher::default()
            .analyze_with_cancel(&source, &source, &token)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Cancelled));
    }

    #[test]
    fn invalid_config_rejected() {
        let config = AnalysisConfig::default()
            .with_matching(MatchConfig::default().with_base_threshold(1.5));
        assert!(CoverageMatcher::new(config).is_err());
    }
}
