//! SCOV Similarity
//!
//! Symmetric scenario similarity in `[0, 1]`.
//!
//! # Overview
//!
//! - **Coverage score**: short-circuit title cascade ([`title`])
//! - **Duplicate score**: title cascade blended with positional step overlap ([`steps`])
//! - **Features**: per-scenario normalized text, computed once per run ([`ScenarioFeatures`])
//!
//! # Example
//!
//! ```rust
//! use scov_scenario::Scenario;
//! use scov_similarity::SimilarityScorer;
//!
//! let a = Scenario::new("Add New User", ["Given an admin"]).unwrap();
//! let b = Scenario::new("add new  user", ["Given an admin"]).unwrap();
//!
//! let scorer = SimilarityScorer::new();
//! assert_eq!(scorer.score(&a, &b), 0.95);
//! assert_eq!(scorer.score(&a, &b), scorer.score(&b, &a));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod features;
pub mod scorer;
pub mod steps;
pub mod text;
pub mod title;

// Re-exports
pub use features::ScenarioFeatures;
pub use scorer::{DuplicateScore, SimilarityScorer};
pub use steps::step_similarity;
pub use text::{normalize_title, tokens};
pub use title::{title_match, title_similarity, MatchBasis, TitleMatch};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for scoring
    pub use crate::{DuplicateScore, MatchBasis, ScenarioFeatures, SimilarityScorer, TitleMatch};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
