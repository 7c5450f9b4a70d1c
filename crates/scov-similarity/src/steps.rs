//! Step-sequence similarity

use crate::features::ScenarioFeatures;
use std::collections::BTreeSet;

/// Positional step similarity, penalized by length mismatch
///
/// Steps are compared pairwise by position over the shorter list
/// (Jaccard of their tokens), averaged, then scaled by
/// `shorter / longer`. Returns `None` when neither scenario has steps,
/// so callers can fall back to title similarity alone.
#[must_use]
pub fn step_similarity(a: &ScenarioFeatures, b: &ScenarioFeatures) -> Option<f64> {
    let (la, lb) = (a.step_count(), b.step_count());
    if la == 0 && lb == 0 {
        return None;
    }
    let shorter = la.min(lb);
    if shorter == 0 {
        return Some(0.0);
    }

    let total: f64 = (0..shorter)
        .map(|i| {
            step_pair_similarity(
                &a.step_tokens[i],
                &b.step_tokens[i],
                &a.normalized_steps[i],
                &b.normalized_steps[i],
            )
        })
        .sum();

    #[allow(clippy::cast_precision_loss)]
    let (shorter, longer) = (shorter as f64, la.max(lb) as f64);
    Some(total / shorter * (shorter / longer))
}

/// Jaccard of two step token sets; token-less steps compare by text
fn step_pair_similarity(
    a: &BTreeSet<String>,
    b: &BTreeSet<String>,
    text_a: &str,
    text_b: &str,
) -> f64 {
    if a.is_empty() && b.is_empty() {
        return if text_a == text_b { 1.0 } else { 0.0 };
    }
    let shared = a.intersection(b).count();
    let union = a.len() + b.len() - shared;
    #[allow(clippy::cast_precision_loss)]
    let score = shared as f64 / union as f64;
    score
}
