//! Duplicate Clusterer
//!
//! Three passes of decreasing confidence over one scenario set, sharing a
//! single "already grouped" mask so groups stay disjoint.
//!
//! | pass | member condition (against the seed) |
//! |---|---|
//! | Exact | identical normalized titles |
//! | High | blended title+step score ≥ `high_threshold` |
//! | Medium | title ≥ `medium_title_threshold` and steps ≥ `medium_steps_threshold` |
//!
//! Each pass is star clustering: the first ungrouped index seeds a group and
//! every later ungrouped index that clears the threshold against the seed
//! joins it. Members are never compared with each other. Singleton groups
//! are dropped.

use crate::cancel::CancellationToken;
use crate::config::{AnalysisConfig, ClusterConfig, ParallelConfig};
use crate::error::{AnalysisOutcome, ConfigResult};
use indexmap::IndexMap;
use rayon::prelude::*;
use scov_scenario::Scenario;
use scov_similarity::{DuplicateScore, ScenarioFeatures, SimilarityScorer};
use serde::Serialize;
use std::convert::Infallible;
use std::fmt;
use tracing::{debug, info};

/// Duplicate confidence band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateTier {
    /// Identical normalized titles
    Exact,
    /// High blended title+step similarity
    High,
    /// Close titles and independently close steps
    Medium,
}

impl DuplicateTier {
    /// Tier label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::High => "high",
            Self::Medium => "medium",
        }
    }
}

impl fmt::Display for DuplicateTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Two or more scenarios judged duplicates of each other
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateGroup<'a> {
    /// Members; the seed comes first, then input order
    pub scenarios: Vec<&'a Scenario>,
    /// Tier that formed the group
    pub tier: DuplicateTier,
    /// Average pairwise score inside the group, in `[0, 1]`
    pub similarity: f64,
}

impl DuplicateGroup<'_> {
    /// Number of members (always ≥ 2)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    /// Always false; groups have at least two members
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    /// Similarity on a 0..=100 scale
    #[must_use]
    pub fn similarity_percent(&self) -> u32 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percent = (self.similarity * 100.0).round() as u32;
        percent
    }

    /// Member titles, in group order
    #[must_use]
    pub fn titles(&self) -> Vec<&str> {
        self.scenarios.iter().map(|s| s.title()).collect()
    }
}

/// Groups near-identical scenarios within one set
#[derive(Debug, Clone, Default)]
pub struct DuplicateClusterer {
    config: ClusterConfig,
    parallel: ParallelConfig,
    scorer: SimilarityScorer,
}

impl DuplicateClusterer {
    /// Create a clusterer after validating its thresholds
    ///
    /// # Errors
    /// Any `ConfigError` from [`AnalysisConfig::validate`].
    pub fn new(config: &AnalysisConfig) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self {
            config: config.clustering,
            parallel: config.parallel,
            scorer: SimilarityScorer::new(),
        })
    }

    /// Active tier thresholds
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ClusterConfig {
        &self.config
    }

    /// Cluster `scenarios` into disjoint duplicate groups
    #[must_use]
    pub fn cluster<'a>(&self, scenarios: &'a [Scenario]) -> Vec<DuplicateGroup<'a>> {
        match self.run(scenarios, || Ok::<(), Infallible>(())) {
            Ok(groups) => groups,
            Err(never) => match never {},
        }
    }

    /// As [`cluster`](Self::cluster), checking `cancel` before each seed
    ///
    /// # Errors
    /// `AnalysisError::Cancelled` if the token fires; no partial groups are returned.
    pub fn cluster_with_cancel<'a>(
        &self,
        scenarios: &'a [Scenario],
        cancel: &CancellationToken,
    ) -> AnalysisOutcome<Vec<DuplicateGroup<'a>>> {
        self.run(scenarios, || cancel.check())
    }

    fn run<'a, E, C>(&self, scenarios: &'a [Scenario], check: C) -> Result<Vec<DuplicateGroup<'a>>, E>
    where
        C: Fn() -> Result<(), E>,
    {
        let n = scenarios.len();
        let parallel = self
            .parallel
            .should_parallelize(n.saturating_mul(n.saturating_sub(1)) / 2);
        let features: Vec<ScenarioFeatures> = if parallel {
            scenarios.par_iter().map(ScenarioFeatures::from).collect()
        } else {
            scenarios.iter().map(ScenarioFeatures::from).collect()
        };

        let mut pass = Pass {
            scenarios,
            features: &features,
            grouped: vec![false; n],
            parallel,
            scorer: self.scorer,
            groups: Vec::new(),
        };

        check()?;
        pass.exact();

        let high = self.config.high_threshold;
        pass.star(DuplicateTier::High, &check, |d| d.combined >= high)?;

        let (title_min, steps_min) = (
            self.config.medium_title_threshold,
            self.config.medium_steps_threshold,
        );
        pass.star(DuplicateTier::Medium, &check, |d| {
            d.title >= title_min && d.steps.is_some_and(|s| s >= steps_min)
        })?;

        info!(
            scenarios = n,
            groups = pass.groups.len(),
            grouped = pass.grouped.iter().filter(|g| **g).count(),
            parallel,
            "Duplicate clustering complete"
        );
        Ok(pass.groups)
    }
}

/// Shared state across the three passes
struct Pass<'a, 'f> {
    scenarios: &'a [Scenario],
    features: &'f [ScenarioFeatures],
    grouped: Vec<bool>,
    parallel: bool,
    scorer: SimilarityScorer,
    groups: Vec<DuplicateGroup<'a>>,
}

impl<'a> Pass<'a, '_> {
    fn exact(&mut self) {
        let mut by_title: IndexMap<&str, Vec<usize>> = IndexMap::new();
        for (idx, f) in self.features.iter().enumerate() {
            by_title.entry(f.normalized_title.as_str()).or_default().push(idx);
        }
        let members: Vec<Vec<usize>> = by_title
            .into_values()
            .filter(|members| members.len() > 1)
            .collect();
        for members in members {
            self.emit(DuplicateTier::Exact, members);
        }
    }

    fn star<E, C, P>(&mut self, tier: DuplicateTier, check: &C, accept: P) -> Result<(), E>
    where
        C: Fn() -> Result<(), E>,
        P: Fn(&DuplicateScore) -> bool + Sync,
    {
        for seed in 0..self.scenarios.len() {
            if self.grouped[seed] {
                continue;
            }
            check()?;

            let seed_features = &self.features[seed];
            let qualifies = |j: &usize| {
                !self.grouped[*j]
                    && accept(
                        &self
                            .scorer
                            .duplicate_score_features(seed_features, &self.features[*j]),
                    )
            };
            let later = seed + 1..self.scenarios.len();
            let partners: Vec<usize> = if self.parallel {
                later.into_par_iter().filter(qualifies).collect()
            } else {
                later.filter(qualifies).collect()
            };

            if !partners.is_empty() {
                let mut members = Vec::with_capacity(partners.len() + 1);
                members.push(seed);
                members.extend(partners);
                self.emit(tier, members);
            }
        }
        Ok(())
    }

    fn emit(&mut self, tier: DuplicateTier, members: Vec<usize>) {
        for &idx in &members {
            self.grouped[idx] = true;
        }
        let similarity = self.average_pairwise(tier, &members);
        debug!(
            %tier,
            seed = self.scenarios[members[0]].title(),
            size = members.len(),
            similarity,
            "Duplicate group"
        );
        let scenarios = self.scenarios;
        self.groups.push(DuplicateGroup {
            scenarios: members.iter().map(|&i| &scenarios[i]).collect(),
            tier,
            similarity,
        });
    }

    /// Title score for Exact, blended score otherwise
    fn average_pairwise(&self, tier: DuplicateTier, members: &[usize]) -> f64 {
        let mut total = 0.0;
        let mut pairs = 0_u32;
        for (pos, &a) in members.iter().enumerate() {
            for &b in &members[pos + 1..] {
                let d = self
                    .scorer
                    .duplicate_score_features(&self.features[a], &self.features[b]);
                total += match tier {
                    DuplicateTier::Exact => d.title,
                    DuplicateTier::High | DuplicateTier::Medium => d.combined,
                };
                pairs += 1;
            }
        }
        if pairs == 0 {
            0.0
        } else {
            total / f64::from(pairs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AnalysisError;

    fn s(title: &str, steps: &[&str]) -> Scenario {
        Scenario::new(title, steps.iter().copied()).unwrap()
    }

    #[test]
    fn exact_tier_groups_normalized_titles() {
        let set = vec![
            s("Add New User", &[]),
            s("Delete account", &[]),
            s("add  new user", &[]),
            s("Add New User", &[]),
        ];
        let groups = DuplicateClusterer::default().cluster(&set);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].tier, DuplicateTier::Exact);
        assert_eq!(groups[0].len(), 3);
        // pairs: 0.95, 1.0, 0.95
        assert!((groups[0].similarity - (0.95 + 1.0 + 0.95) / 3.0).abs() < 1e-9);
        assert_eq!(groups[0].similarity_percent(), 97);
    }

    #[test]
    fn high_tier_uses_blend() {
        let steps = ["Given an admin on the users page", "When they create an account"];
        let set = vec![
            s("Create user account", &steps),
            s("Create new user account", &steps),
        ];
        let groups = DuplicateClusterer::default().cluster(&set);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].tier, DuplicateTier::High);
        // title 3/4 overlap, steps 1.0
        assert!((groups[0].similarity - 0.875).abs() < 1e-9);
    }

    #[test]
    fn medium_tier_requires_both_signals() {
        // title 0.75, steps 0.5: blend 0.625 and steps below 0.6
        let set = vec![
            s("Create user account", &["Given alpha bravo", "When charlie delta"]),
            s("Create new user account", &["Given alpha bravo", "When echo foxtrot"]),
        ];
        assert!(DuplicateClusterer::default().cluster(&set).is_empty());

        // title 0.75, steps 2/3: blend 0.708, medium only
        let set = vec![
            s(
                "Create user account",
                &["Given alpha bravo", "When charlie delta", "Then india juliet"],
            ),
            s(
                "Create new user account",
                &["Given alpha bravo", "When charlie delta", "Then golf hotel"],
            ),
        ];
        let groups = DuplicateClusterer::default().cluster(&set);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].tier, DuplicateTier::Medium);
    }

    #[test]
    fn star_not_full_linkage() {
        // same tokens, different normalized titles; only step length differs
        let (s1, s2, s3, s4) = (
            "Given alpha bravo",
            "When charlie delta",
            "Then echo foxtrot",
            "And golf hotel",
        );
        let set = vec![
            s("Create user account", &[s1, s2]),
            s("Create user account!", &[s1, s2, s3, s4]),
            s("Create user account.", &[s1, s2, s3]),
        ];
        // title 0.94 each; seed 0 vs 1: 0.72 (rejected), 0 vs 2: 0.803, 1 vs 2: 0.845
        let groups = DuplicateClusterer::default().cluster(&set);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].tier, DuplicateTier::High);
        assert_eq!(
            groups[0].titles(),
            vec!["Create user account", "Create user account."]
        );
    }

    #[test]
    fn singletons_dropped() {
        let set = vec![s("Add New User", &[]), s("Export Report as PDF", &[])];
        assert!(DuplicateClusterer::default().cluster(&set).is_empty());
        assert!(DuplicateClusterer::default().cluster(&[]).is_empty());
    }

    #[test]
    fn cancelled_clustering() {
        let token = CancellationToken::new();
        token.cancel();
        let set = vec![s("Add New User", &[])];
        let err = DuplicateClusterer::default()
            .cluster_with_cancel(&set, &token)
            .unwrap_err();
        assert!(matches!(err, AnalysisError::Cancelled));
    }

    #[test]
    fn tier_labels() {
        assert_eq!(DuplicateTier::Exact.to_string(), "exact");
        assert!(DuplicateTier::Exact < DuplicateTier::Medium);
    }
}
