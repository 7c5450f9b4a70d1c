//! SCOV Scenario Layer
//!
//! Turns loosely formatted, Gherkin-style documents into structured
//! [`Scenario`] records and labels them with keyword heuristics.
//!
//! # Core Operations
//!
//! - **Parse**: single forward pass over document lines ([`ScenarioParser`])
//! - **Classify**: ordered keyword rule tables ([`classifier`])
//!
//! # Architecture
//!
//! ```text
//! Document text → ParserState (fold over lines) → Scenario[] + ParseDiagnostics
//!                        ↓
//!                   Classifier (once per finalized scenario)
//! ```
//!
//! # Example
//!
//! ```rust
//! use scov_scenario::{DocumentParser, ScenarioParser};
//!
//! let text = "Feature: Accounts\n\
//!             Scenario: User Login Success\n\
//!               Given a registered user\n\
//!               When they sign in\n\
//!               Then the dashboard is shown\n";
//!
//! let parsed = ScenarioParser::new().parse_document("accounts.feature", text);
//! assert_eq!(parsed.scenarios.len(), 1);
//! assert_eq!(parsed.scenarios[0].steps().len(), 3);
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod classifier;
pub mod error;
pub mod parser;
pub mod scenario;

// Re-exports for convenience
pub use classifier::{classify, Classification, KeywordRule};
pub use error::{ScenarioError, ScenarioResult};
pub use parser::{
    parse_scenarios, DocumentParser, ParseDiagnostics, ParsedDocument, ParserState,
    ScenarioParser, PLACEHOLDER_TITLE,
};
pub use scenario::{
    BusinessImpact, Scenario, Severity, SourceLocation, TestCategory, Workflow,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with scenarios
    pub use crate::classifier::{classify, Classification};
    pub use crate::parser::{DocumentParser, ParsedDocument, ScenarioParser};
    pub use crate::scenario::{
        BusinessImpact, Scenario, Severity, SourceLocation, TestCategory, Workflow,
    };
}
