// Party-favoring clause detection (fairness findings)
use lazy_static::lazy_static;
use regex::Regex;
use shared_types::{FavoredParty, Issue, IssueType, Severity};

use super::{scan_patterns, ScanPattern};
use crate::flatten::FlatText;

fn fairness(
    re: Regex,
    severity: Severity,
    category: &'static str,
    message: &'static str,
    suggestion: &'static str,
    favored_party: FavoredParty,
) -> ScanPattern {
    ScanPattern {
        regex: re,
        severity,
        category,
        message,
        suggestion: Some(suggestion),
        issue_type: IssueType::Fairness,
        favored_party: Some(favored_party),
    }
}

lazy_static! {
    pub static ref DISPARITY_PATTERNS: Vec<ScanPattern> = vec![
        fairness(
            Regex::new(r"(?i)as determined by the Lender|at the Lender's discretion|in the Lender's sole discretion").unwrap(),
            Severity::Warning,
            "Unilateral Discretion",
            "Unilateral lender discretion clause",
            "Replace with objective criteria or mutual agreement requirement",
            FavoredParty::Lender,
        ),
        fairness(
            Regex::new(r"(?i)as determined by the Borrower|at the Borrower's discretion|in the Borrower's sole discretion").unwrap(),
            Severity::Warning,
            "Unilateral Discretion",
            "Unilateral borrower discretion clause",
            "Consider whether this discretion is appropriate for green loan obligations",
            FavoredParty::Borrower,
        ),
        fairness(
            Regex::new(r"(?i)subject to review and acceptance by the Lender").unwrap(),
            Severity::Warning,
            "Unilateral Discretion",
            "Margin adjustment subject to lender acceptance",
            "Margin adjustments should be automatic upon meeting objective criteria",
            FavoredParty::Lender,
        ),
        fairness(
            Regex::new(r"(?i)may obtain.*external review|external review.*at its discretion").unwrap(),
            Severity::Warning,
            "Optional Obligation",
            "External review is optional instead of mandatory",
            "Green Loan best practice requires mandatory annual external review",
            FavoredParty::Borrower,
        ),
        fairness(
            Regex::new(r"(?i)consult in good faith regarding remediation").unwrap(),
            Severity::Error,
            "Weak Remedy",
            "Weak remedy for breach - only requires good faith consultation",
            "Misapplication of proceeds should constitute an Event of Default",
            FavoredParty::Borrower,
        ),
        fairness(
            Regex::new(r"(?i)material changes.*as determined by the Lender").unwrap(),
            Severity::Warning,
            "Unilateral Discretion",
            "Mandatory prepayment triggered at lender's sole discretion",
            "Define objective criteria for what constitutes material changes",
            FavoredParty::Lender,
        ),
        fairness(
            Regex::new(r"(?i)more than 15%.*without.*consent").unwrap(),
            Severity::Info,
            "Threshold Disparity",
            "Asset disposal threshold set at 15% (higher than standard 10%)",
            "Consider reducing threshold to 10% with replacement requirement",
            FavoredParty::Borrower,
        ),
        fairness(
            Regex::new(r"(?i)Lender may assign.*without.*maintaining green").unwrap(),
            Severity::Info,
            "Missing Protection",
            "Lender can assign without committing to maintain green terms",
            "Require assignee to maintain green loan terms and commitments",
            FavoredParty::Lender,
        ),
        fairness(
            Regex::new(r"(?i)up to 10%.*may be used for general corporate").unwrap(),
            Severity::Error,
            "Use of Proceeds",
            "Allows portion of proceeds for non-green corporate purposes",
            "Green Loan proceeds must be 100% allocated to Eligible Green Projects",
            FavoredParty::Borrower,
        ),
        fairness(
            Regex::new(r"(?i)endeavou?r to ensure|use reasonable efforts to ensure").unwrap(),
            Severity::Warning,
            "Weak Obligation",
            "Weak obligation language - \"endeavour\" instead of \"shall\"",
            "Replace with mandatory \"shall ensure\" for key green obligations",
            FavoredParty::Borrower,
        ),
        fairness(
            Regex::new(r"(?i)to the extent reasonably available|to the extent practicable").unwrap(),
            Severity::Info,
            "Weak Obligation",
            "Conditional reporting weakens transparency requirements",
            "Require specific metrics with defined reporting standards",
            FavoredParty::Borrower,
        ),
        fairness(
            Regex::new(r"(?i)may be increased by up to.*bps.*subject to Lender").unwrap(),
            Severity::Info,
            "Asymmetric Mechanism",
            "Margin increase mechanism favors lender discretion",
            "Ensure symmetric and automatic margin adjustment in both directions",
            FavoredParty::Lender,
        ),
        fairness(
            Regex::new(r"(?i)no specific green obligations as Events of Default").unwrap(),
            Severity::Warning,
            "Missing Protection",
            "Missing specific green breach Events of Default",
            "Add enumerated green obligation breaches as specific Events of Default",
            FavoredParty::Borrower,
        ),
        fairness(
            Regex::new(r"(?i)consider reallocating|may reallocate").unwrap(),
            Severity::Info,
            "Optional Obligation",
            "Reallocation of proceeds is optional instead of mandatory",
            "Require mandatory reallocation if projects become ineligible",
            FavoredParty::Borrower,
        ),
    ];
}

/// Scan any document for clauses that favor one party
pub fn scan_disparities(flat: &FlatText, cap: usize) -> Vec<Issue> {
    scan_patterns(&DISPARITY_PATTERNS, flat, cap)
}
