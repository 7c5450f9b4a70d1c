//! Analysis configuration
//!
//! Every threshold the matcher and clusterer apply lives here. The defaults
//! are empirical and tunable; they are not derived from anything.
//!
//! ```toml
//! [matching]
//! base_threshold = 0.70
//! min_threshold = 0.55
//! max_threshold = 0.80
//!
//! [clustering]
//! high_threshold = 0.80
//!
//! [parallel]
//! enabled = true
//! min_pairs = 10000
//! ```

use crate::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Top-level analysis configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Coverage acceptance thresholds
    pub matching: MatchConfig,
    /// Duplicate tier thresholds
    pub clustering: ClusterConfig,
    /// Parallel execution policy
    pub parallel: ParallelConfig,
}

impl AnalysisConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With matching thresholds
    #[inline]
    #[must_use]
    pub fn with_matching(mut self, matching: MatchConfig) -> Self {
        self.matching = matching;
        self
    }

    /// With clustering thresholds
    #[inline]
    #[must_use]
    pub fn with_clustering(mut self, clustering: ClusterConfig) -> Self {
        self.clustering = clustering;
        self
    }

    /// With parallel policy
    #[inline]
    #[must_use]
    pub fn with_parallel(mut self, parallel: ParallelConfig) -> Self {
        self.parallel = parallel;
        self
    }

    /// Parse and validate TOML text; missing keys take their defaults
    ///
    /// # Errors
    /// `ConfigError::Parse` on malformed TOML, or any `validate` error.
    pub fn from_toml_str(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file
    ///
    /// # Errors
    /// `ConfigError::Io` if the file cannot be read, otherwise as
    /// [`from_toml_str`](Self::from_toml_str).
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ConfigError::io(path, e))?;
        Self::from_toml_str(&text)
    }

    /// Render as TOML
    ///
    /// # Errors
    /// `ConfigError::Serialize` if encoding fails.
    pub fn to_toml_string(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every section
    ///
    /// # Errors
    /// The first invalid parameter found.
    pub fn validate(&self) -> ConfigResult<()> {
        self.matching.validate()?;
        self.clustering.validate()
    }
}

/// Dynamic coverage acceptance threshold
///
/// `base`, shifted by the QA/source density ratio and by the source
/// scenario's feature-toggle nature, then clamped.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Starting threshold
    pub base_threshold: f64,
    /// Ratio `|qa| / |source|` below which the QA set counts as sparse
    pub sparse_ratio: f64,
    /// Added when sparse
    pub sparse_adjustment: f64,
    /// Ratio above which the QA set counts as dense
    pub dense_ratio: f64,
    /// Added when dense
    pub dense_adjustment: f64,
    /// Added for feature-toggle source scenarios
    pub feature_toggle_adjustment: f64,
    /// Clamp floor
    pub min_threshold: f64,
    /// Clamp ceiling
    pub max_threshold: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            base_threshold: 0.70,
            sparse_ratio: 0.5,
            sparse_adjustment: -0.10,
            dense_ratio: 2.0,
            dense_adjustment: 0.05,
            feature_toggle_adjustment: -0.10,
            min_threshold: 0.55,
            max_threshold: 0.80,
        }
    }
}

impl MatchConfig {
    /// With base threshold
    #[inline]
    #[must_use]
    pub fn with_base_threshold(mut self, base: f64) -> Self {
        self.base_threshold = base;
        self
    }

    /// With density adjustments
    #[inline]
    #[must_use]
    pub fn with_density_adjustments(mut self, sparse: f64, dense: f64) -> Self {
        self.sparse_adjustment = sparse;
        self.dense_adjustment = dense;
        self
    }

    /// With feature-toggle adjustment
    #[inline]
    #[must_use]
    pub fn with_feature_toggle_adjustment(mut self, adjustment: f64) -> Self {
        self.feature_toggle_adjustment = adjustment;
        self
    }

    /// With clamp bounds
    #[inline]
    #[must_use]
    pub fn with_clamp(mut self, min: f64, max: f64) -> Self {
        self.min_threshold = min;
        self.max_threshold = max;
        self
    }

    /// Unclamped density adjustment for a QA/source ratio
    #[must_use]
    pub fn density_adjustment(&self, ratio: f64) -> f64 {
        if ratio < self.sparse_ratio {
            self.sparse_adjustment
        } else if ratio > self.dense_ratio {
            self.dense_adjustment
        } else {
            0.0
        }
    }

    /// Acceptance threshold for one source scenario
    #[must_use]
    pub fn threshold_for(&self, ratio: f64, is_feature_toggle: bool) -> f64 {
        let mut threshold = self.base_threshold + self.density_adjustment(ratio);
        if is_feature_toggle {
            threshold += self.feature_toggle_adjustment;
        }
        threshold.clamp(self.min_threshold, self.max_threshold)
    }

    /// Fail fast on out-of-range parameters
    ///
    /// Every reachable pre-clamp threshold and both clamp bounds must lie
    /// in `[0, 1]`, and the clamp range must not be inverted.
    ///
    /// # Errors
    /// `InvalidThreshold`, `InvalidRatio` or `InvertedClamp`.
    pub fn validate(&self) -> ConfigResult<()> {
        check_unit("matching.base_threshold", self.base_threshold)?;
        check_unit("matching.min_threshold", self.min_threshold)?;
        check_unit("matching.max_threshold", self.max_threshold)?;
        if self.min_threshold > self.max_threshold {
            return Err(ConfigError::InvertedClamp {
                min: self.min_threshold,
                max: self.max_threshold,
            });
        }
        check_ratio("matching.sparse_ratio", self.sparse_ratio)?;
        check_ratio("matching.dense_ratio", self.dense_ratio)?;

        let density = [
            ("", 0.0),
            (" + sparse_adjustment", self.sparse_adjustment),
            (" + dense_adjustment", self.dense_adjustment),
        ];
        let toggle = [("", 0.0), (" + feature_toggle_adjustment", self.feature_toggle_adjustment)];
        for (d_name, d) in density {
            for (t_name, t) in toggle {
                check_unit(
                    &format!("matching.base_threshold{d_name}{t_name}"),
                    self.base_threshold + d + t,
                )?;
            }
        }
        Ok(())
    }
}

/// Duplicate tier thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterConfig {
    /// High tier: minimum blended title+step score
    pub high_threshold: f64,
    /// Medium tier: minimum title score
    pub medium_title_threshold: f64,
    /// Medium tier: minimum step score (both must hold)
    pub medium_steps_threshold: f64,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            high_threshold: 0.80,
            medium_title_threshold: 0.70,
            medium_steps_threshold: 0.60,
        }
    }
}

impl ClusterConfig {
    /// With high tier threshold
    #[inline]
    #[must_use]
    pub fn with_high_threshold(mut self, threshold: f64) -> Self {
        self.high_threshold = threshold;
        self
    }

    /// With medium tier thresholds
    #[inline]
    #[must_use]
    pub fn with_medium_thresholds(mut self, title: f64, steps: f64) -> Self {
        self.medium_title_threshold = title;
        self.medium_steps_threshold = steps;
        self
    }

    /// Fail fast on out-of-range thresholds
    ///
    /// # Errors
    /// `InvalidThreshold` for the first value outside `[0, 1]`.
    pub fn validate(&self) -> ConfigResult<()> {
        check_unit("clustering.high_threshold", self.high_threshold)?;
        check_unit("clustering.medium_title_threshold", self.medium_title_threshold)?;
        check_unit("clustering.medium_steps_threshold", self.medium_steps_threshold)
    }
}

/// When to fan pairwise comparisons out over rayon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParallelConfig {
    /// Allow parallel execution
    pub enabled: bool,
    /// Minimum pair count before going parallel
    pub min_pairs: usize,
}

impl Default for ParallelConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_pairs: 10_000,
        }
    }
}

impl ParallelConfig {
    /// Sequential only
    #[must_use]
    pub fn sequential() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// With minimum pair count
    #[inline]
    #[must_use]
    pub fn with_min_pairs(mut self, min_pairs: usize) -> Self {
        self.min_pairs = min_pairs;
        self
    }

    /// Whether `pairs` comparisons should run in parallel
    #[inline]
    #[must_use]
    pub fn should_parallelize(&self, pairs: usize) -> bool {
        self.enabled && pairs >= self.min_pairs
    }
}

fn check_unit(name: &str, value: f64) -> ConfigResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::invalid_threshold(name, value))
    }
}

fn check_ratio(name: &str, value: f64) -> ConfigResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidRatio {
            name: name.to_string(),
            value,
        })
    }
}
