//! Exhaustive multi-match scans
//!
//! Unlike rules, a scan reports every occurrence of its patterns (up to a
//! per-pattern cap), each as its own exactly-anchored issue.

pub mod disparity;
pub mod green_loan;

use std::collections::HashSet;

use regex::Regex;
use shared_types::{FavoredParty, Issue, IssueType, Severity};
use tracing::debug;

use crate::flatten::FlatText;
use crate::patterns::find_all_matches;

/// One scanned pattern and the issue it produces per match
#[derive(Debug, Clone)]
pub struct ScanPattern {
    pub regex: Regex,
    pub severity: Severity,
    pub category: &'static str,
    pub message: &'static str,
    pub suggestion: Option<&'static str>,
    pub issue_type: IssueType,
    pub favored_party: Option<FavoredParty>,
}

impl ScanPattern {
    fn to_issue(&self, text: &str, start: usize, end: usize) -> Issue {
        let mut issue = Issue::new(
            self.severity,
            self.category,
            format!("{}: \"{}\"", self.message, text),
        )
        .with_span(text, start, end)
        .with_issue_type(self.issue_type);
        if let Some(suggestion) = self.suggestion {
            issue = issue.with_suggestion(suggestion);
        }
        if let Some(party) = self.favored_party {
            issue = issue.with_favored_party(party);
        }
        issue
    }
}

/// Scan `flat` with every pattern, keeping at most `cap` matches per pattern.
///
/// A match whose lowercased text and start offset were already reported by an
/// earlier pattern in the same scan is skipped.
pub fn scan_patterns(patterns: &[ScanPattern], flat: &FlatText, cap: usize) -> Vec<Issue> {
    let mut seen: HashSet<(String, usize)> = HashSet::new();
    let mut issues = Vec::new();

    for pattern in patterns {
        for m in find_all_matches(flat, &pattern.regex).into_iter().take(cap) {
            if !seen.insert((m.text.to_lowercase(), m.start)) {
                continue;
            }
            issues.push(pattern.to_issue(&m.text, m.start, m.end));
        }
    }

    debug!(matches = issues.len(), "Pattern scan complete");
    issues
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocNode;
    use crate::flatten::flatten;

    fn flat(text: &str) -> FlatText {
        flatten(Some(&DocNode::doc(vec![DocNode::paragraph(vec![
            DocNode::text(text),
        ])])))
    }

    fn pattern(re: &str, category: &'static str) -> ScanPattern {
        ScanPattern {
            regex: Regex::new(re).unwrap(),
            severity: Severity::Warning,
            category,
            message: "Flagged",
            suggestion: Some("Reword"),
            issue_type: IssueType::Fairness,
            favored_party: Some(FavoredParty::Lender),
        }
    }

    #[test]
    fn test_cap_limits_matches_per_pattern() {
        let text = flat("foo foo foo foo");
        let issues = scan_patterns(&[pattern("(?i)foo", "A")], &text, 3);

        assert_eq!(issues.len(), 3);
        assert_eq!(issues[2].start_offset, Some(8));
    }

    #[test]
    fn test_duplicate_match_across_patterns_is_skipped() {
        let text = flat("Foo bar");
        let patterns = [pattern("(?i)foo", "A"), pattern("(?i)FOO", "B")];
        let issues = scan_patterns(&patterns, &text, 5);

        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].category, "A");
    }

    #[test]
    fn test_same_text_at_other_offset_is_kept() {
        let text = flat("foo and foo");
        let patterns = [pattern("(?i)foo", "A"), pattern("(?i)and foo", "B")];
        let issues = scan_patterns(&patterns, &text, 5);

        assert_eq!(issues.len(), 3);
    }

    #[test]
    fn test_issue_shape() {
        let text = flat("Foo");
        let issue = scan_patterns(&[pattern("(?i)foo", "A")], &text, 5).remove(0);

        assert_eq!(issue.message, "Flagged: \"Foo\"");
        assert_eq!(issue.text_match.as_deref(), Some("Foo"));
        assert_eq!((issue.start_offset, issue.end_offset), (Some(0), Some(3)));
        assert_eq!(issue.suggestion.as_deref(), Some("Reword"));
        assert_eq!(issue.favored_party, Some(FavoredParty::Lender));
    }
}
