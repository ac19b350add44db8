// Highlightable green loan terms: every fossil fuel, weak language and
// reporting occurrence, not just the first
use lazy_static::lazy_static;
use regex::Regex;
use shared_types::{Issue, IssueType, Severity};

use super::{scan_patterns, ScanPattern};
use crate::flatten::FlatText;
use crate::patterns::is_green_loan;

fn regulatory(re: Regex, severity: Severity, category: &'static str, message: &'static str) -> ScanPattern {
    ScanPattern {
        regex: re,
        severity,
        category,
        message,
        suggestion: None,
        issue_type: IssueType::LmaCompliance,
        favored_party: None,
    }
}

lazy_static! {
    pub static ref GREEN_LOAN_PATTERNS: Vec<ScanPattern> = vec![
        regulatory(
            Regex::new(r"(?i)natural gas|NGCC|combined cycle|gas-fired|gas turbine").unwrap(),
            Severity::Error,
            "Fossil Fuel",
            "Fossil fuel reference incompatible with Green Loan",
        ),
        regulatory(
            Regex::new(r"(?i)\bLNG\b|liquefied natural gas").unwrap(),
            Severity::Error,
            "Fossil Fuel",
            "LNG infrastructure not eligible for Green Loan",
        ),
        regulatory(
            Regex::new(r"(?i)pipeline infrastructure|gas pipeline|compression facilities").unwrap(),
            Severity::Error,
            "Fossil Fuel",
            "Fossil infrastructure violates Green Loan Principles",
        ),
        regulatory(
            Regex::new(r"(?i)general corporate purposes|working capital").unwrap(),
            Severity::Error,
            "Use of Proceeds",
            "Not permitted under Green Loan Principles",
        ),
        regulatory(
            Regex::new(r"(?i)coal generation|coal-fired|coal facility").unwrap(),
            Severity::Error,
            "Fossil Fuel",
            "Coal absolutely incompatible with Green Loan",
        ),
        regulatory(
            Regex::new(r"(?i)reasonable efforts|commercially reasonable").unwrap(),
            Severity::Warning,
            "Weak Language",
            "Weak binding language reduces enforceability",
        ),
        regulatory(
            Regex::new(r"(?i)\bmay obtain\b|\bmay consider\b").unwrap(),
            Severity::Warning,
            "Weak Language",
            "Optional language weakens green commitment",
        ),
        regulatory(
            Regex::new(r"(?i)within 150 days|within 180 days").unwrap(),
            Severity::Warning,
            "Reporting",
            "Extended reporting timeline delays transparency",
        ),
        regulatory(
            Regex::new(r"(?i)believed to be accurate|generally consistent").unwrap(),
            Severity::Info,
            "Vague Language",
            "Vague language lacks quantifiable metrics",
        ),
    ];
}

/// Scan a green loan document; other documents yield nothing
pub fn scan_green_loan(flat: &FlatText, cap: usize) -> Vec<Issue> {
    if !is_green_loan(flat) {
        return Vec::new();
    }
    scan_patterns(&GREEN_LOAN_PATTERNS, flat, cap)
}
