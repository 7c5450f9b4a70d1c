//! Per-scenario comparison features
//!
//! Normalized titles and token sets are computed once per scenario per run
//! so pairwise scoring never re-tokenizes text.

use crate::text::{normalize_title, step_tokens, tokens};
use scov_scenario::classifier::feature_toggle_terms;
use scov_scenario::Scenario;
use std::collections::BTreeSet;

/// Precomputed comparison view of one scenario
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScenarioFeatures {
    /// Authored title, verbatim
    pub title: String,
    /// Lower-cased, whitespace-collapsed title
    pub normalized_title: String,
    /// Title tokens (len > 2)
    pub title_tokens: BTreeSet<String>,
    /// Feature-toggle vocabulary present in the title
    pub toggle_terms: BTreeSet<&'static str>,
    /// Per-step token sets, in step order
    pub step_tokens: Vec<BTreeSet<String>>,
    /// Per-step normalized text, used when a step has no tokens
    pub normalized_steps: Vec<String>,
}

impl ScenarioFeatures {
    /// Extract features from a scenario (authored title, not display title)
    #[must_use]
    pub fn from_scenario(scenario: &Scenario) -> Self {
        Self::from_parts(scenario.authored_title(), scenario.steps())
    }

    /// Extract features from raw title and steps
    #[must_use]
    pub fn from_parts(title: &str, steps: &[String]) -> Self {
        Self {
            title: title.to_string(),
            normalized_title: normalize_title(title),
            title_tokens: tokens(title),
            toggle_terms: feature_toggle_terms(title),
            step_tokens: steps.iter().map(|s| step_tokens(s)).collect(),
            normalized_steps: steps.iter().map(|s| normalize_title(s)).collect(),
        }
    }

    /// Number of steps
    #[inline]
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.step_tokens.len()
    }
}

impl From<&Scenario> for ScenarioFeatures {
    fn from(scenario: &Scenario) -> Self {
        Self::from_scenario(scenario)
    }
}
