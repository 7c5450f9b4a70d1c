//! Keyword classifier
//!
//! Every label family is an ordered table of [`KeywordRule`]s. The first
//! rule with at least one keyword present in the scenario text wins, so the
//! table order is the priority order (the feature-toggle rule sits above the
//! CRUD rule, for instance). No match falls back to a fixed default.
//!
//! Keywords are matched on word boundaries against the lower-cased title and
//! steps. A trailing `*` turns a keyword into a word-prefix match
//! (`toggle*` matches `toggles` and `toggled`); multi-word keywords match
//! word sequences (`feature flag`).

use crate::scenario::{BusinessImpact, Scenario, Severity, TestCategory, Workflow};
use serde::Serialize;
use std::collections::BTreeSet;

/// One (keyword set → label) entry of an ordered rule table
#[derive(Debug, Clone, Copy)]
pub struct KeywordRule<L: 'static> {
    /// Label assigned when the rule fires
    pub label: L,
    /// Keywords; any one present fires the rule
    pub keywords: &'static [&'static str],
}

impl<L: Copy> KeywordRule<L> {
    /// Whether any keyword occurs in `text`
    #[must_use]
    pub fn matches(&self, text: &MatchText) -> bool {
        self.keywords.iter().any(|kw| text.contains_keyword(kw))
    }
}

/// Result of [`classify`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Classification {
    /// Workflow category
    pub workflow: Workflow,
    /// Coarse business impact
    pub business_impact: BusinessImpact,
}

/// Vocabulary of configurable feature toggles
pub const FEATURE_TOGGLE_TERMS: &[&str] = &[
    "feature flag*",
    "feature toggle*",
    "feature switch*",
    "kill switch*",
    "toggle*",
    "flag*",
    "config*",
    "setting*",
    "rollout*",
];

/// Workflow rules, highest priority first
pub const WORKFLOW_RULES: &[KeywordRule<Workflow>] = &[
    KeywordRule {
        label: Workflow::FeatureToggle,
        keywords: FEATURE_TOGGLE_TERMS,
    },
    KeywordRule {
        label: Workflow::Authentication,
        keywords: &[
            "login*", "log in", "logout", "log out", "sign in", "sign out", "signin",
            "signout", "password*", "credential*", "authenticat*", "mfa", "2fa",
            "two factor", "otp", "sso", "session*",
        ],
    },
    KeywordRule {
        label: Workflow::Authorization,
        keywords: &[
            "permission*", "role", "roles", "access control", "authoriz*", "privilege*",
            "forbidden", "unauthori*",
        ],
    },
    KeywordRule {
        label: Workflow::Payment,
        keywords: &[
            "payment*", "checkout", "invoice*", "billing", "refund*", "subscription*",
            "credit card*", "pricing",
        ],
    },
    KeywordRule {
        label: Workflow::DataExchange,
        keywords: &[
            "import*", "export*", "upload*", "download*", "sync*", "csv", "pdf", "xlsx",
        ],
    },
    KeywordRule {
        label: Workflow::Reporting,
        keywords: &[
            "report*", "dashboard*", "chart*", "analytics", "metric*", "statistic*",
        ],
    },
    KeywordRule {
        label: Workflow::Search,
        keywords: &["search*", "filter*", "sort*", "query", "queries", "find"],
    },
    KeywordRule {
        label: Workflow::Notification,
        keywords: &[
            "notif*", "email*", "e mail", "alert*", "sms", "reminder*", "message*",
        ],
    },
    KeywordRule {
        label: Workflow::Crud,
        keywords: &[
            "create*", "add", "adds", "added", "new", "edit*", "update*", "modify*",
            "delete*", "remove*", "save*", "list*", "view*",
        ],
    },
];

/// Business impact rules, highest priority first
pub const IMPACT_RULES: &[KeywordRule<BusinessImpact>] = &[
    KeywordRule {
        label: BusinessImpact::High,
        keywords: &[
            "payment*", "checkout", "billing", "invoice*", "refund*", "security",
            "password*", "login*", "log in", "authenticat*", "permission*", "data loss",
            "compliance", "audit*", "privacy", "encrypt*",
        ],
    },
    KeywordRule {
        label: BusinessImpact::Medium,
        keywords: &[
            "create*", "update*", "edit*", "save*", "delete*", "export*", "import*",
            "report*", "notif*", "search*", "upload*", "config*", "setting*", "toggle*",
            "flag*",
        ],
    },
];

/// Severity rules, highest priority first
pub const SEVERITY_RULES: &[KeywordRule<Severity>] = &[
    KeywordRule {
        label: Severity::Critical,
        keywords: &[
            "crash*", "data loss", "corrupt*", "security", "breach*", "outage",
            "payment*", "checkout",
        ],
    },
    KeywordRule {
        label: Severity::High,
        keywords: &[
            "login*", "log in", "authenticat*", "permission*", "password*", "delete*",
            "billing", "error*", "fail*",
        ],
    },
    KeywordRule {
        label: Severity::Medium,
        keywords: &[
            "create*", "update*", "edit*", "save*", "search*", "export*", "import*",
            "report*",
        ],
    },
];

/// Test category rules, highest priority first
pub const TEST_CATEGORY_RULES: &[KeywordRule<TestCategory>] = &[
    KeywordRule {
        label: TestCategory::EndToEnd,
        keywords: &["end to end", "e2e", "journey*", "full flow", "workflow*"],
    },
    KeywordRule {
        label: TestCategory::Integration,
        keywords: &[
            "api", "apis", "integration*", "webhook*", "endpoint*", "service*",
            "database", "third party", "sync*",
        ],
    },
];

/// Tag overrides for severity
const SEVERITY_TAGS: &[(&str, Severity)] = &[
    ("critical", Severity::Critical),
    ("blocker", Severity::Critical),
    ("p0", Severity::Critical),
    ("high", Severity::High),
    ("major", Severity::High),
    ("p1", Severity::High),
    ("medium", Severity::Medium),
    ("minor", Severity::Medium),
    ("p2", Severity::Medium),
    ("low", Severity::Low),
    ("trivial", Severity::Low),
    ("p3", Severity::Low),
];

/// Tag overrides for test category
const CATEGORY_TAGS: &[(&str, TestCategory)] = &[
    ("e2e", TestCategory::EndToEnd),
    ("end-to-end", TestCategory::EndToEnd),
    ("endtoend", TestCategory::EndToEnd),
    ("integration", TestCategory::Integration),
    ("api", TestCategory::Integration),
    ("functional", TestCategory::Functional),
];

/// Lower-cased text split into words, padded for boundary matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchText(String);

impl MatchText {
    /// Normalize text: lower-case, non-alphanumerics become word breaks
    #[must_use]
    pub fn new(text: &str) -> Self {
        let mut out = String::with_capacity(text.len() + 2);
        out.push(' ');
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            out.push_str(&word.to_lowercase());
            out.push(' ');
        }
        if out.len() == 1 {
            out.push(' ');
        }
        Self(out)
    }

    /// Text of a title and its steps
    #[must_use]
    pub fn from_parts(title: &str, steps: &[String]) -> Self {
        let mut joined = String::with_capacity(title.len() + steps.iter().map(String::len).sum::<usize>() + steps.len());
        joined.push_str(title);
        for step in steps {
            joined.push(' ');
            joined.push_str(step);
        }
        Self::new(&joined)
    }

    /// Word-boundary keyword test; trailing `*` means word-prefix
    #[must_use]
    pub fn contains_keyword(&self, keyword: &str) -> bool {
        let (stem, prefix) = match keyword.strip_suffix('*') {
            Some(stem) => (stem, true),
            None => (keyword, false),
        };
        if stem.is_empty() {
            return false;
        }
        let needle = if prefix {
            format!(" {stem}")
        } else {
            format!(" {stem} ")
        };
        self.0.contains(&needle)
    }

    /// Normalized text (space padded)
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Classify a scenario by its title and steps
#[must_use]
pub fn classify(scenario: &Scenario) -> Classification {
    classify_parts(scenario.authored_title(), scenario.steps())
}

/// Classify raw title + steps (used at scenario construction)
#[must_use]
pub fn classify_parts(title: &str, steps: &[String]) -> Classification {
    let text = MatchText::from_parts(title, steps);
    Classification {
        workflow: first_match(WORKFLOW_RULES, &text, Workflow::General),
        business_impact: first_match(IMPACT_RULES, &text, BusinessImpact::Low),
    }
}

/// First rule that fires, or `default`
#[must_use]
pub fn first_match<L: Copy>(rules: &[KeywordRule<L>], text: &MatchText, default: L) -> L {
    rules
        .iter()
        .find(|rule| rule.matches(text))
        .map_or(default, |rule| rule.label)
}

/// Feature-toggle vocabulary terms present in `text`
#[must_use]
pub fn feature_toggle_terms(text: &str) -> BTreeSet<&'static str> {
    let text = MatchText::new(text);
    FEATURE_TOGGLE_TERMS
        .iter()
        .copied()
        .filter(|term| text.contains_keyword(term))
        .collect()
}

/// Test category: tag override first, then keyword rules
#[must_use]
pub fn test_category_for(scenario: &Scenario) -> TestCategory {
    if let Some(category) = tag_override(scenario, CATEGORY_TAGS) {
        return category;
    }
    let text = MatchText::from_parts(scenario.authored_title(), scenario.steps());
    first_match(TEST_CATEGORY_RULES, &text, TestCategory::Functional)
}

/// Severity: tag override first, then keyword rules
#[must_use]
pub fn severity_for(scenario: &Scenario) -> Severity {
    if let Some(severity) = tag_override(scenario, SEVERITY_TAGS) {
        return severity;
    }
    let text = MatchText::from_parts(scenario.authored_title(), scenario.steps());
    first_match(SEVERITY_RULES, &text, Severity::Low)
}

fn tag_override<L: Copy>(scenario: &Scenario, table: &[(&str, L)]) -> Option<L> {
    table
        .iter()
        .find(|(tag, _)| scenario.has_tag(tag))
        .map(|(_, label)| *label)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scenario(title: &str, steps: &[&str]) -> Scenario {
        Scenario::new(title, steps.iter().copied()).unwrap()
    }

    #[test]
    fn match_text_word_boundaries() {
        let text = MatchText::new("Add a new Address, then SAVE!");
        assert_eq!(text.as_str(), " add a new address then save ");
        assert!(text.contains_keyword("add"));
        assert!(text.contains_keyword("save*"));
        assert!(!text.contains_keyword("addr"));
        assert!(text.contains_keyword("addr*"));
        assert!(!text.contains_keyword("dress*"));
    }

    #[test]
    fn match_text_phrases() {
        let text = MatchText::new("Run the end-to-end checkout journey");
        assert!(text.contains_keyword("end to end"));
        assert!(text.contains_keyword("journey*"));
        assert!(!text.contains_keyword("*"));
    }

    #[test]
    fn empty_text_matches_nothing() {
        let text = MatchText::new("");
        assert!(!text.contains_keyword("a"));
        assert!(!text.contains_keyword("a*"));
    }

    #[test]
    fn feature_flag_beats_crud() {
        let s = scenario("Create a new feature flag", &["Given an admin"]);
        assert_eq!(classify(&s).workflow, Workflow::FeatureToggle);
    }

    #[test]
    fn crud_when_no_flag() {
        let s = scenario("Add New User", &["Given an admin", "When they add a user"]);
        assert_eq!(classify(&s).workflow, Workflow::Crud);
    }

    #[test]
    fn steps_participate() {
        let s = scenario("Happy path", &["Given the user is on the login page"]);
        let c = classify(&s);
        assert_eq!(c.workflow, Workflow::Authentication);
        assert_eq!(c.business_impact, BusinessImpact::High);
    }

    #[test]
    fn default_labels() {
        let s = scenario("Greets visitor", &["Then a greeting appears"]);
        let c = classify(&s);
        assert_eq!(c.workflow, Workflow::General);
        assert_eq!(c.business_impact, BusinessImpact::Low);
    }

    #[test]
    fn export_pdf_is_data_exchange() {
        let s = scenario("Export Report as PDF", &[]);
        assert_eq!(classify(&s).workflow, Workflow::DataExchange);
    }

    #[test]
    fn classify_is_pure() {
        let s = scenario("Refund an order", &["When support issues a refund"]);
        assert_eq!(classify(&s), classify(&s));
        assert_eq!(classify(&s).workflow, s.workflow());
    }

    #[test]
    fn toggle_terms_extracted() {
        let terms = feature_toggle_terms("Enable the beta feature flag in Settings");
        assert!(terms.contains("feature flag*"));
        assert!(terms.contains("flag*"));
        assert!(terms.contains("setting*"));
        assert!(feature_toggle_terms("Export Report as PDF").is_empty());
    }

    #[test]
    fn severity_tag_override() {
        let s = scenario("Greets visitor", &[]).with_tags(["@critical"]);
        assert_eq!(severity_for(&s), Severity::Critical);
    }

    #[test]
    fn severity_keywords() {
        assert_eq!(severity_for(&scenario("App crash on launch", &[])), Severity::Critical);
        assert_eq!(severity_for(&scenario("Login fails with bad password", &[])), Severity::High);
        assert_eq!(severity_for(&scenario("Edit profile", &[])), Severity::Medium);
        assert_eq!(severity_for(&scenario("Greets visitor", &[])), Severity::Low);
    }

    #[test]
    fn test_category_rules() {
        assert_eq!(
            test_category_for(&scenario("End-to-end purchase journey", &[])),
            TestCategory::EndToEnd
        );
        assert_eq!(
            test_category_for(&scenario("Orders API returns 404", &[])),
            TestCategory::Integration
        );
        assert_eq!(
            test_category_for(&scenario("Greets visitor", &[]).with_tags(["e2e"])),
            TestCategory::EndToEnd
        );
        assert_eq!(
            test_category_for(&scenario("Greets visitor", &[])),
            TestCategory::Functional
        );
    }

    #[test]
    fn first_match_respects_order() {
        let rules = &[
            KeywordRule { label: 1, keywords: &["alpha"] },
            KeywordRule { label: 2, keywords: &["alpha", "beta"] },
        ];
        let text = MatchText::new("alpha beta");
        assert_eq!(first_match(rules, &text, 0), 1);
        assert_eq!(first_match(rules, &MatchText::new("beta"), 0), 2);
        assert_eq!(first_match(rules, &MatchText::new("gamma"), 0), 0);
    }
}
