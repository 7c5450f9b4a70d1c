//! SCOV Analysis
//!
//! Coverage matching between a source and a QA scenario set, and duplicate
//! clustering within one set.
//!
//! # Architecture
//!
//! ```text
//! Scenario[] ──┬─> CoverageMatcher (source × qa) ──> AnalysisResult
//!              └─> DuplicateClusterer (qa × qa)  ──> DuplicateGroup[]
//!                          │
//!                   SimilarityScorer
//! ```
//!
//! Both operations are synchronous and pure over their inputs. Large runs
//! fan the outer comparison loop out over rayon; results are merged in input
//! order so tie-breaking and group seeds never depend on scheduling.
//!
//! # Example
//!
//! ```rust
//! use scov_analysis::{CoverageMatcher, DuplicateClusterer};
//! use scov_scenario::ScenarioParser;
//!
//! let parser = ScenarioParser::new();
//! let source = parser.parse("Scenario: Add New User\n  Given an admin\n");
//! let qa = parser.parse("Scenario: Add New User\n  Given an admin\nScenario: Add New User\n  Given an admin\n");
//!
//! let result = CoverageMatcher::default().analyze(&source, &qa);
//! assert_eq!(result.coverage_percent, 100);
//!
//! let groups = DuplicateClusterer::default().cluster(&qa);
//! assert_eq!(groups.len(), 1);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod cancel;
pub mod config;
pub mod coverage;
pub mod duplicates;
pub mod error;

// Re-exports
pub use cancel::CancellationToken;
pub use config::{AnalysisConfig, ClusterConfig, MatchConfig, ParallelConfig};
pub use coverage::{
    coverage_percent, AnalysisResult, CoverageMatch, CoverageMatcher, MissingScenario,
};
pub use duplicates::{DuplicateClusterer, DuplicateGroup, DuplicateTier};
pub use error::{AnalysisError, AnalysisOutcome, ConfigError, ConfigResult};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for analysis runs
    pub use crate::{
        AnalysisConfig, AnalysisError, AnalysisResult, CancellationToken, CoverageMatcher,
        DuplicateClusterer, DuplicateGroup, DuplicateTier,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
