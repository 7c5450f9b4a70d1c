//! Title similarity cascade
//!
//! The first tier that applies decides the score; tiers are never blended.
//!
//! | tier | condition | score |
//! |---|---|---|
//! | exact | authored titles byte-equal | 1.0 |
//! | normalized | equal after case/whitespace normalization | 0.95 |
//! | token overlap | weighted overlap ≥ 0.6 | overlap, at most 0.94 |
//! | shared keywords | shared-token ratio ≥ 0.4 | 0.6 ..= 0.8 |
//! | feature toggle | both titles use the same toggle vocabulary | 0.75 |
//! | none | | 0.0 |

use crate::features::ScenarioFeatures;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Score for byte-equal titles
pub const EXACT_SCORE: f64 = 1.0;
/// Score for titles equal after normalization
pub const NORMALIZED_SCORE: f64 = 0.95;
/// Minimum token overlap used as-is
pub const TOKEN_OVERLAP_MIN: f64 = 0.6;
/// Ceiling of the token-overlap tier, below [`NORMALIZED_SCORE`]
pub const TOKEN_OVERLAP_MAX: f64 = 0.94;
/// Minimum shared-keyword ratio for the rescaled band
pub const SHARED_KEYWORD_MIN: f64 = 0.4;
/// Rescaled shared-keyword band
pub const SHARED_KEYWORD_BAND: (f64, f64) = (0.6, 0.8);
/// Fixed score for a shared feature-toggle term
pub const FEATURE_TOGGLE_SCORE: f64 = 0.75;

/// Weight of a substring-containment token match relative to an exact one
const PARTIAL_WEIGHT: f64 = 0.5;

/// Which cascade tier produced a title score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchBasis {
    /// Titles byte-equal
    ExactTitle,
    /// Titles equal after normalization
    NormalizedTitle,
    /// Token overlap at or above the cut-off
    TokenOverlap,
    /// Shared-keyword ratio rescaled into the band
    SharedKeywords,
    /// Both titles reference the same toggle vocabulary
    FeatureToggle,
    /// Nothing applied
    None,
}

impl MatchBasis {
    /// Short label for reports
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::ExactTitle => "exact title",
            Self::NormalizedTitle => "normalized title",
            Self::TokenOverlap => "token overlap",
            Self::SharedKeywords => "shared keywords",
            Self::FeatureToggle => "feature toggle",
            Self::None => "none",
        }
    }
}

impl fmt::Display for MatchBasis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Title score with the tier that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TitleMatch {
    /// Score in `[0, 1]`
    pub score: f64,
    /// Deciding tier
    pub basis: MatchBasis,
}

impl TitleMatch {
    const NONE: Self = Self {
        score: 0.0,
        basis: MatchBasis::None,
    };

    #[inline]
    fn new(score: f64, basis: MatchBasis) -> Self {
        Self { score, basis }
    }
}

/// Run the cascade over two precomputed feature sets
#[must_use]
pub fn title_match(a: &ScenarioFeatures, b: &ScenarioFeatures) -> TitleMatch {
    if a.title == b.title {
        return TitleMatch::new(EXACT_SCORE, MatchBasis::ExactTitle);
    }
    if a.normalized_title == b.normalized_title {
        return TitleMatch::new(NORMALIZED_SCORE, MatchBasis::NormalizedTitle);
    }

    let overlap = token_overlap(&a.title_tokens, &b.title_tokens);
    if overlap >= TOKEN_OVERLAP_MIN {
        return TitleMatch::new(overlap.min(TOKEN_OVERLAP_MAX), MatchBasis::TokenOverlap);
    }

    let ratio = shared_keyword_ratio(&a.title_tokens, &b.title_tokens);
    if ratio >= SHARED_KEYWORD_MIN {
        let (lo, hi) = SHARED_KEYWORD_BAND;
        let scaled = lo + (hi - lo) * (ratio - SHARED_KEYWORD_MIN) / (1.0 - SHARED_KEYWORD_MIN);
        return TitleMatch::new(scaled, MatchBasis::SharedKeywords);
    }

    if !a.toggle_terms.is_disjoint(&b.toggle_terms) {
        return TitleMatch::new(FEATURE_TOGGLE_SCORE, MatchBasis::FeatureToggle);
    }

    TitleMatch::NONE
}

/// Title score only
#[inline]
#[must_use]
pub fn title_similarity(a: &ScenarioFeatures, b: &ScenarioFeatures) -> f64 {
    title_match(a, b).score
}

/// Jaccard-like overlap where a substring-containment match counts half
///
/// `(exact + 0.5 * partial) / |A ∪ B|`, with `partial` counted from both
/// sides over the tokens that are not shared exactly.
#[must_use]
pub fn token_overlap(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    let exact = a.intersection(b).count();
    let union = a.len() + b.len() - exact;
    if union == 0 {
        return 0.0;
    }
    let partial = partial_matches(a, b) + partial_matches(b, a);
    #[allow(clippy::cast_precision_loss)]
    let score = (exact as f64 + PARTIAL_WEIGHT * partial as f64) / union as f64;
    score
}

/// Mean of the shared-token fraction of each side
#[must_use]
pub fn shared_keyword_ratio(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let (shared, la, lb) = (
        a.intersection(b).count() as f64,
        a.len() as f64,
        b.len() as f64,
    );
    (shared / la + shared / lb) / 2.0
}

/// Tokens of `from` (not in `other`) contained in, or containing, a token of `other` (not in `from`)
fn partial_matches(from: &BTreeSet<String>, other: &BTreeSet<String>) -> usize {
    from.difference(other)
        .filter(|tok| {
            other
                .difference(from)
                .any(|cand| cand.contains(tok.as_str()) || tok.contains(cand.as_str()))
        })
        .count()
}
