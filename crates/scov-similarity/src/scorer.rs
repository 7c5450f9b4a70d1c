//! Scenario-level scorers
//!
//! [`SimilarityScorer::score`] is the title cascade used for coverage.
//! [`SimilarityScorer::duplicate_score`] blends title and step similarity
//! at equal weight for duplicate detection.

use crate::features::ScenarioFeatures;
use crate::steps::step_similarity;
use crate::title::{title_match, TitleMatch};
use scov_scenario::Scenario;
use serde::Serialize;

/// Weight of title similarity in the duplicate blend (steps get the rest)
pub const DUPLICATE_TITLE_WEIGHT: f64 = 0.5;

/// Title and step similarity for a duplicate candidate pair
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DuplicateScore {
    /// Title cascade score
    pub title: f64,
    /// Step-sequence score, `None` when neither side has steps
    pub steps: Option<f64>,
    /// Equal-weight blend, or the title score when `steps` is `None`
    pub combined: f64,
}

impl DuplicateScore {
    /// Blend title and step scores
    #[must_use]
    pub fn new(title: f64, steps: Option<f64>) -> Self {
        let combined = match steps {
            Some(s) => DUPLICATE_TITLE_WEIGHT * title + (1.0 - DUPLICATE_TITLE_WEIGHT) * s,
            None => title,
        };
        Self {
            title,
            steps,
            combined,
        }
    }

    /// Step score, or zero when absent
    #[inline]
    #[must_use]
    pub fn steps_or_zero(&self) -> f64 {
        self.steps.unwrap_or(0.0)
    }
}

/// Stateless scorer over scenarios or their precomputed features
#[derive(Debug, Clone, Copy, Default)]
pub struct SimilarityScorer;

impl SimilarityScorer {
    /// Create a scorer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Coverage similarity of two scenarios
    #[must_use]
    pub fn score(&self, a: &Scenario, b: &Scenario) -> f64 {
        self.explain(a, b).score
    }

    /// Coverage similarity with the tier that produced it
    #[must_use]
    pub fn explain(&self, a: &Scenario, b: &Scenario) -> TitleMatch {
        self.explain_features(&ScenarioFeatures::from(a), &ScenarioFeatures::from(b))
    }

    /// Coverage similarity over precomputed features
    #[inline]
    #[must_use]
    pub fn explain_features(&self, a: &ScenarioFeatures, b: &ScenarioFeatures) -> TitleMatch {
        title_match(a, b)
    }

    /// Duplicate similarity of two scenarios
    #[must_use]
    pub fn duplicate_score(&self, a: &Scenario, b: &Scenario) -> DuplicateScore {
        self.duplicate_score_features(&ScenarioFeatures::from(a), &ScenarioFeatures::from(b))
    }

    /// Duplicate similarity over precomputed features
    #[must_use]
    pub fn duplicate_score_features(
        &self,
        a: &ScenarioFeatures,
        b: &ScenarioFeatures,
    ) -> DuplicateScore {
        DuplicateScore::new(title_match(a, b).score, step_similarity(a, b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::title::MatchBasis;

    fn s(title: &str, steps: &[&str]) -> Scenario {
        Scenario::new(title, steps.iter().copied()).unwrap()
    }

    #[test]
    fn score_uses_title_cascade() {
        let scorer = SimilarityScorer::new();
        let a = s("User Login Success", &["Given a user"]);
        let b = s("user login success", &["Given someone else entirely"]);
        let m = scorer.explain(&a, &b);
        assert_eq!(m.basis, MatchBasis::NormalizedTitle);
        assert!((scorer.score(&a, &b) - 0.95).abs() < 1e-9);
    }

    #[test]
    fn duplicate_blend() {
        let scorer = SimilarityScorer::new();
        let a = s("Add New User", &["Given an admin", "When they add a user"]);
        let b = s("Add New User", &["Given an admin", "When they remove a user"]);
        let d = scorer.duplicate_score(&a, &b);
        assert!((d.title - 1.0).abs() < f64::EPSILON);
        let steps = d.steps.unwrap();
        assert!(steps > 0.0 && steps < 1.0);
        assert!((d.combined - (0.5 + 0.5 * steps)).abs() < 1e-9);
    }

    #[test]
    fn duplicate_without_steps_is_title_only() {
        let d = DuplicateScore::new(0.8, None);
        assert!((d.combined - 0.8).abs() < f64::EPSILON);
        assert!(d.steps_or_zero().abs() < f64::EPSILON);
    }

    #[test]
    fn reflexive() {
        let scorer = SimilarityScorer::new();
        let a = s("Export Report as PDF", &["Given a report", "When exported"]);
        assert!((scorer.score(&a, &a) - 1.0).abs() < f64::EPSILON);
        assert!((scorer.duplicate_score(&a, &a).combined - 1.0).abs() < f64::EPSILON);
    }
}
