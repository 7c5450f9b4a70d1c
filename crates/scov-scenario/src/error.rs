//! Error types for the scenario layer
//!
//! Parsing itself never fails; these errors cover violated preconditions
//! when scenarios are built directly by callers.

/// Errors raised while constructing scenario records
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScenarioError {
    /// Title was empty or whitespace only
    #[error("scenario title must not be empty")]
    EmptyTitle,

    /// A step line was empty or whitespace only
    #[error("step {index} of '{title}' is empty")]
    EmptyStep { title: String, index: usize },
}

impl ScenarioError {
    /// Create empty step error
    pub fn empty_step(title: impl Into<String>, index: usize) -> Self {
        Self::EmptyStep {
            title: title.into(),
            index,
        }
    }
}

/// Result type alias for scenario operations
pub type ScenarioResult<T> = Result<T, ScenarioError>;
