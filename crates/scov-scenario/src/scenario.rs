//! Scenario records
//!
//! A [`Scenario`] is one behavioral-test record: a title, an ordered list of
//! Given/When/Then steps, a tag set and classifier labels. Records are built
//! once and never mutated afterwards; the builder methods consume `self`.

use crate::classifier::{self, Classification};
use crate::error::ScenarioError;
use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Where a scenario came from (document identifier + 1-based line)
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
pub struct SourceLocation {
    /// Document identifier (usually a file name)
    pub document: String,
    /// 1-based line number, 0 when unknown
    pub line: usize,
}

impl SourceLocation {
    /// Create location
    #[inline]
    #[must_use]
    pub fn new(document: impl Into<String>, line: usize) -> Self {
        Self {
            document: document.into(),
            line,
        }
    }

    /// Location for records not read from a document
    #[inline]
    #[must_use]
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Whether this location points into a document
    #[inline]
    #[must_use]
    pub fn is_known(&self) -> bool {
        self.line > 0
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.document.is_empty() {
            write!(f, "<unknown>:{}", self.line)
        } else {
            write!(f, "{}:{}", self.document, self.line)
        }
    }
}

/// Workflow category assigned by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Workflow {
    /// Feature flags, toggles and configuration switches
    FeatureToggle,
    /// Sign-in, sign-out, credentials and sessions
    Authentication,
    /// Roles, permissions and access control
    Authorization,
    /// Checkout, billing, invoices and refunds
    Payment,
    /// Import, export, upload, download and sync
    DataExchange,
    /// Reports, dashboards and analytics
    Reporting,
    /// Search, filtering and sorting
    Search,
    /// E-mail, SMS, alerts and reminders
    Notification,
    /// Create/read/update/delete of records
    Crud,
    /// Nothing more specific matched
    General,
}

impl Workflow {
    /// Human-readable label
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::FeatureToggle => "Feature Toggle",
            Self::Authentication => "Authentication",
            Self::Authorization => "Authorization",
            Self::Payment => "Payment",
            Self::DataExchange => "Data Exchange",
            Self::Reporting => "Reporting",
            Self::Search => "Search",
            Self::Notification => "Notification",
            Self::Crud => "CRUD",
            Self::General => "General",
        }
    }

    /// Configuration / feature-toggle related scenarios get looser matching
    #[inline]
    #[must_use]
    pub fn is_feature_toggle(self) -> bool {
        matches!(self, Self::FeatureToggle)
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse business impact assigned by the classifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BusinessImpact {
    /// Money, security or data integrity at stake
    High,
    /// Everyday record keeping and reporting
    Medium,
    /// Cosmetic or informational
    Low,
}

impl fmt::Display for BusinessImpact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        })
    }
}

/// Reporting-only test category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestCategory {
    /// Single feature behavior
    Functional,
    /// Whole user journey
    EndToEnd,
    /// Service / API boundary
    Integration,
}

impl fmt::Display for TestCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Functional => "Functional",
            Self::EndToEnd => "End-to-End",
            Self::Integration => "Integration",
        })
    }
}

/// Reporting-only severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// Blocks release
    Critical,
    /// Major functionality
    High,
    /// Regular functionality
    Medium,
    /// Minor
    Low,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Critical => "Critical",
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        })
    }
}

/// One structured behavioral-test record
///
/// `title` is the display title and is unique within one parse run (the
/// parser appends ` (N)` on collisions). `authored_title` is the text as
/// written in the document and is what similarity scoring compares.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    title: String,
    authored_title: String,
    steps: Vec<String>,
    tags: BTreeSet<String>,
    feature: Option<String>,
    workflow: Workflow,
    business_impact: BusinessImpact,
    test_category: Option<TestCategory>,
    severity: Option<Severity>,
    source_location: SourceLocation,
}

impl Scenario {
    /// Create scenario and run the classifier over title + steps
    ///
    /// # Errors
    /// - `ScenarioError::EmptyTitle` if the title is blank
    /// - `ScenarioError::EmptyStep` if any step is blank
    pub fn new<S: Into<String>>(
        title: impl Into<String>,
        steps: impl IntoIterator<Item = S>,
    ) -> Result<Self, ScenarioError> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(ScenarioError::EmptyTitle);
        }

        let steps: Vec<String> = steps.into_iter().map(Into::into).collect();
        if let Some(index) = steps.iter().position(|s| s.trim().is_empty()) {
            return Err(ScenarioError::empty_step(title, index));
        }

        let Classification {
            workflow,
            business_impact,
        } = classifier::classify_parts(&title, &steps);

        Ok(Self {
            authored_title: title.clone(),
            title,
            steps,
            tags: BTreeSet::new(),
            feature: None,
            workflow,
            business_impact,
            test_category: None,
            severity: None,
            source_location: SourceLocation::unknown(),
        })
    }

    /// Replace the display title, keeping the authored one for matching
    #[must_use]
    pub(crate) fn with_display_title(mut self, title: String) -> Self {
        self.title = title;
        self
    }

    /// Add tags (a leading `@` is stripped)
    #[must_use]
    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for tag in tags {
            let tag = tag.as_ref().trim().trim_start_matches('@');
            if !tag.is_empty() {
                self.tags.insert(tag.to_string());
            }
        }
        self
    }

    /// With enclosing feature name
    #[must_use]
    pub fn with_feature(mut self, feature: impl Into<String>) -> Self {
        let feature = feature.into();
        self.feature = (!feature.trim().is_empty()).then_some(feature);
        self
    }

    /// With source location
    #[must_use]
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.source_location = location;
        self
    }

    /// With explicit test category
    #[must_use]
    pub fn with_test_category(mut self, category: TestCategory) -> Self {
        self.test_category = Some(category);
        self
    }

    /// With explicit severity
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = Some(severity);
        self
    }

    /// Fill test category and severity from tags and keyword rules,
    /// leaving explicitly set values alone
    #[must_use]
    pub fn with_reporting_labels(mut self) -> Self {
        if self.test_category.is_none() {
            self.test_category = Some(classifier::test_category_for(&self));
        }
        if self.severity.is_none() {
            self.severity = Some(classifier::severity_for(&self));
        }
        self
    }

    /// Display title (unique within a parse run)
    #[inline]
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Title as written in the source document
    #[inline]
    #[must_use]
    pub fn authored_title(&self) -> &str {
        &self.authored_title
    }

    /// Whether the parser had to suffix the title
    #[inline]
    #[must_use]
    pub fn is_disambiguated(&self) -> bool {
        self.title != self.authored_title
    }

    /// Ordered steps
    #[inline]
    #[must_use]
    pub fn steps(&self) -> &[String] {
        &self.steps
    }

    /// Tag set
    #[inline]
    #[must_use]
    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    /// Check tag membership (case-insensitive, `@` optional)
    #[must_use]
    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.trim_start_matches('@');
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Enclosing feature name
    #[inline]
    #[must_use]
    pub fn feature(&self) -> Option<&str> {
        self.feature.as_deref()
    }

    /// Workflow label
    #[inline]
    #[must_use]
    pub fn workflow(&self) -> Workflow {
        self.workflow
    }

    /// Business impact label
    #[inline]
    #[must_use]
    pub fn business_impact(&self) -> BusinessImpact {
        self.business_impact
    }

    /// Test category (reporting only)
    #[inline]
    #[must_use]
    pub fn test_category(&self) -> Option<TestCategory> {
        self.test_category
    }

    /// Severity (reporting only)
    #[inline]
    #[must_use]
    pub fn severity(&self) -> Option<Severity> {
        self.severity
    }

    /// Source location
    #[inline]
    #[must_use]
    pub fn source_location(&self) -> &SourceLocation {
        &self.source_location
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} steps)", self.title, self.steps.len())
    }
}
