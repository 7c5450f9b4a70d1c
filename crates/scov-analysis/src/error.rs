//! Error types for SCOV analysis
//!
//! Matching and clustering are total over well-formed scenario sets. Errors
//! come only from violated preconditions:
//! - Threshold parameters outside `[0, 1]`
//! - Unreadable or malformed configuration
//! - Caller cancellation

use std::path::PathBuf;

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Threshold or adjustment yields a value outside `[0, 1]`
    #[error("invalid threshold `{name}`: {value} is outside [0, 1]")]
    InvalidThreshold {
        /// Parameter (or derived threshold) name
        name: String,
        /// Offending value
        value: f64,
    },

    /// Density ratio cut-off negative or not finite
    #[error("invalid ratio `{name}`: {value} must be finite and non-negative")]
    InvalidRatio {
        /// Parameter name
        name: String,
        /// Offending value
        value: f64,
    },

    /// Clamp bounds inverted
    #[error("inverted clamp range: min {min} > max {max}")]
    InvertedClamp {
        /// Lower bound
        min: f64,
        /// Upper bound
        max: f64,
    },

    /// TOML decode failure
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML encode failure
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Config file could not be read
    #[error("failed to read config {}: {source}", .path.display())]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying IO error
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Create invalid threshold error
    #[inline]
    pub fn invalid_threshold(name: impl Into<String>, value: f64) -> Self {
        Self::InvalidThreshold {
            name: name.into(),
            value,
        }
    }

    /// Create IO error for a config path
    #[inline]
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Analysis run errors
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Configuration rejected before the run started
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Run cancelled by the caller; no partial result
    #[error("analysis cancelled")]
    Cancelled,
}

impl AnalysisError {
    /// Check if the run was cancelled
    #[inline]
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}

/// Result alias for analysis operations
pub type AnalysisOutcome<T> = Result<T, AnalysisError>;

/// Result alias for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;
