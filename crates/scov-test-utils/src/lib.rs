//! Testing utilities for the SCOV workspace
//!
//! Shared fixtures, builders and document renderers.

#![allow(missing_docs)]

use scov_scenario::{DocumentParser, ParsedDocument, Scenario, ScenarioParser};
use std::fmt::Write as _;

pub const LOGIN_SUCCESS_STEPS: [&str; 3] = [
    "Given a registered user on the login page",
    "When they submit valid credentials",
    "Then the dashboard is shown",
];

pub const SOURCE_DOCUMENT: &str = r"Feature: Account access

  Scenario: User Login Success
    Given a registered user on the login page
    When they submit valid credentials
    Then the dashboard is shown

  Scenario: Export Report as PDF
    Given a monthly sales report
    When the manager exports it as PDF
    Then a PDF file is downloaded

  Scenario: Toggle beta dashboard flag
    Given the beta flag is off
    When an admin enables the flag
    Then the beta dashboard is visible
";

pub const QA_DOCUMENT: &str = r"Feature: Regression suite

  @smoke
  Scenario: User Login Success
    Given a registered user on the login page
    When they submit valid credentials
    Then the dashboard is shown

  Scenario: Admin can toggle beta dashboard flag
    Given an admin on the settings page
    When they switch the toggle on
    Then the beta dashboard is visible

  Scenario: Add New User
    Given an admin
    When they add a user named Ann
    Then Ann appears in the user list

  Scenario: Add New User
    Given an admin
    When they add a user named Bob
    Then Bob appears in the user list
";

pub fn scenario(title: &str, steps: &[&str]) -> Scenario {
    Scenario::new(title, steps.iter().copied()).unwrap()
}

pub fn parse(document: &str, text: &str) -> ParsedDocument {
    ScenarioParser::new().parse_document(document, text)
}

/// Render `(title, steps)` pairs as a Gherkin feature
pub fn gherkin_document(entries: &[(&str, &[&str])]) -> String {
    let mut out = String::from("Feature: Generated\n");
    for (title, steps) in entries {
        let _ = writeln!(out, "\n  Scenario: {title}");
        for step in *steps {
            let _ = writeln!(out, "    {step}");
        }
    }
    out
}
