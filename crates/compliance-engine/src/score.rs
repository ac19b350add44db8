// Deterministic document score from the issue set
use shared_types::{Issue, Severity};

pub const MAX_SCORE: u8 = 100;

/// Points deducted per issue of the given severity
pub fn penalty(severity: Severity) -> u32 {
    match severity {
        Severity::Error => 15,
        Severity::Warning => 8,
        Severity::Info => 3,
    }
}

/// 100 minus the summed penalties, floored at 0
pub fn score(issues: &[Issue]) -> u8 {
    let deductions: u32 = issues.iter().map(|i| penalty(i.severity)).sum();
    u32::from(MAX_SCORE).saturating_sub(deductions) as u8
}
