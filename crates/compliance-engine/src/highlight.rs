//! Span resolution and highlight annotation
//!
//! Issues carry character offsets into the flattened text. Resolution maps
//! them back to document coordinates through the position map, falling back
//! to a case-insensitive search for the matched text when the offsets are
//! missing or stale.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use shared_types::{FavoredParty, Issue, IssueType, Severity};
use tracing::debug;

use crate::document::AnnotatedDocument;
use crate::flatten::FlatText;

/// Characters searched on either side of a stale offset hint
pub const SEARCH_WINDOW: usize = 50;

/// An applied highlight over `[from, to)` in document coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightMark {
    pub from: usize,
    pub to: usize,
    pub issue_id: String,
    pub severity: Severity,
    pub category: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub regulation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jurisdiction: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<IssueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favored_party: Option<FavoredParty>,
}

impl HighlightMark {
    pub fn for_issue(issue: &Issue, from: usize, to: usize) -> Self {
        Self {
            from,
            to,
            issue_id: issue.id.clone(),
            severity: issue.severity,
            category: issue.category.clone(),
            message: issue.message.clone(),
            suggestion: issue.suggestion.clone(),
            regulation: issue.regulation.clone(),
            jurisdiction: issue.jurisdiction.clone(),
            issue_type: issue.issue_type,
            favored_party: issue.favored_party,
        }
    }

    pub fn covers(&self, pos: usize) -> bool {
        self.from <= pos && pos < self.to
    }
}

/// Maps issue spans on one flattened text to document coordinates
pub struct SpanResolver<'a> {
    flat: &'a FlatText,
    folded: Vec<char>,
}

impl<'a> SpanResolver<'a> {
    pub fn new(flat: &'a FlatText) -> Self {
        Self {
            flat,
            folded: flat.text().chars().map(fold).collect(),
        }
    }

    /// Coordinate range for an issue, or `None` when it cannot be placed
    pub fn resolve(&self, issue: &Issue) -> Option<(usize, usize)> {
        let text_match = issue.text_match.as_deref().filter(|t| !t.is_empty())?;

        if let (Some(start), Some(end)) = (issue.start_offset, issue.end_offset) {
            if let Some(range) = self.from_offsets(start, end) {
                return Some(range);
            }
        }
        self.from_search(text_match, issue.start_offset)
    }

    fn from_offsets(&self, start: usize, end: usize) -> Option<(usize, usize)> {
        let from = self.flat.coordinate(start)?;
        let to = self.flat.coordinate(end.checked_sub(1)?)? + 1;
        (from < to).then_some((from, to))
    }

    fn from_search(&self, needle: &str, hint: Option<usize>) -> Option<(usize, usize)> {
        let needle: Vec<char> = needle.chars().map(fold).collect();
        let len = self.folded.len();
        if needle.is_empty() || needle.len() > len {
            return None;
        }

        let near = hint.filter(|&start| start < len).and_then(|start| {
            let lo = start.saturating_sub(SEARCH_WINDOW);
            let hi = (start + needle.len() + SEARCH_WINDOW).min(len);
            find_chars(&self.folded[lo..hi], &needle).map(|i| lo + i)
        });
        let idx = near.or_else(|| find_chars(&self.folded, &needle))?;

        let from = self.flat.coordinate(idx)?;
        let last = (idx + needle.len() - 1).min(len - 1);
        let to = self.flat.coordinate(last)? + 1;
        Some((from, to))
    }
}

/// Build marks for `issues` without touching any document
pub fn plan_highlights(flat: &FlatText, issues: &[Issue], content_size: usize) -> Vec<HighlightMark> {
    let resolver = SpanResolver::new(flat);

    let mut ordered: Vec<&Issue> = issues.iter().filter(|i| i.is_highlightable()).collect();
    ordered.sort_by(|a, b| by_start_descending(a.start_offset, b.start_offset));

    ordered
        .into_iter()
        .filter_map(|issue| {
            let (from, to) = resolver.resolve(issue)?;
            (from < to && to <= content_size).then(|| HighlightMark::for_issue(issue, from, to))
        })
        .collect()
}

/// Replace the document's highlight layer with marks for `issues`.
///
/// `flat` must be the flattening of the document's current content. Returns
/// the number of marks applied.
pub fn apply_highlights<D>(doc: &mut D, flat: &FlatText, issues: &[Issue]) -> usize
where
    D: AnnotatedDocument + ?Sized,
{
    let marks = plan_highlights(flat, issues, doc.content_size());
    let applied = marks.len();
    let previous = doc.replace_marks(marks);
    debug!(applied, replaced = previous.len(), "Applied highlights");
    applied
}

/// First mark covering `pos`
pub fn issue_at_position<D>(doc: &D, pos: usize) -> Option<&HighlightMark>
where
    D: AnnotatedDocument + ?Sized,
{
    doc.marks().iter().find(|mark| mark.covers(pos))
}

/// Descending start offset, issues without one last
fn by_start_descending(a: Option<usize>, b: Option<usize>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn find_chars(haystack: &[char], needle: &[char]) -> Option<usize> {
    if needle.len() > haystack.len() {
        return None;
    }
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{DocNode, StructuredDocument};
    use crate::flatten::flatten;
    use pretty_assertions::assert_eq;

    fn doc(paragraphs: &[&str]) -> StructuredDocument {
        StructuredDocument::new(DocNode::doc(
            paragraphs
                .iter()
                .map(|p| DocNode::paragraph(vec![DocNode::text(*p)]))
                .collect(),
        ))
    }

    fn issue(text: &str, offsets: Option<(usize, usize)>) -> Issue {
        let mut issue = Issue::new(Severity::Warning, "Test", format!("found {}", text));
        issue.text_match = Some(text.to_string());
        if let Some((start, end)) = offsets {
            issue.start_offset = Some(start);
            issue.end_offset = Some(end);
        }
        issue
    }

    #[test]
    fn test_offsets_map_through_position_map() {
        let document = doc(&["Loan terms", "Natural gas turbine"]);
        let flat = flatten(document.root());
        // "Loan terms Natural gas turbine ": "Natural" starts at char 11
        let range = SpanResolver::new(&flat).resolve(&issue("Natural gas", Some((11, 22))));

        // Second paragraph opens at 12, text starts at 13
        assert_eq!(range, Some((13, 24)));
    }

    #[test]
    fn test_stale_offsets_fall_back_to_nearby_search() {
        let filler = format!("gas {}", "x".repeat(70));
        let document = doc(&[filler.as_str(), "more gas"]);
        let flat = flatten(document.root());
        let resolver = SpanResolver::new(&flat);

        // End offset points past the text; the start hint selects the later "gas"
        let range = resolver.resolve(&issue("GAS", Some((80, 200))));
        let first = resolver.resolve(&issue("GAS", None));

        assert_eq!(range, Some((82, 85)));
        assert_eq!(first, Some((1, 4)));
    }

    #[test]
    fn test_missing_text_is_skipped() {
        let mut document = doc(&["Nothing to see"]);
        let flat = flatten(document.root());
        let applied = apply_highlights(&mut document, &flat, &[issue("absent phrase", None)]);

        assert_eq!(applied, 0);
        assert!(document.marks().is_empty());
    }

    #[test]
    fn test_issues_without_text_match_are_ignored() {
        let mut document = doc(&["Nothing to see"]);
        let flat = flatten(document.root());
        let unanchored = Issue::new(Severity::Error, "General", "Missing signature");

        assert_eq!(apply_highlights(&mut document, &flat, &[unanchored]), 0);
    }

    #[test]
    fn test_marks_ordered_by_descending_offset_with_missing_last() {
        let document = doc(&["alpha beta gamma"]);
        let flat = flatten(document.root());
        let issues = vec![
            issue("alpha", Some((0, 5))),
            issue("beta", None),
            issue("gamma", Some((11, 16))),
        ];
        let marks = plan_highlights(&flat, &issues, document.content_size());
        let messages: Vec<_> = marks.iter().map(|m| m.message.as_str()).collect();

        assert_eq!(messages, vec!["found gamma", "found alpha", "found beta"]);
    }

    #[test]
    fn test_reapplying_replaces_marks() {
        let mut document = doc(&["alpha beta"]);
        let flat = flatten(document.root());
        let issues = vec![issue("alpha", Some((0, 5))), issue("beta", Some((6, 10)))];

        apply_highlights(&mut document, &flat, &issues);
        let first = document.marks().to_vec();
        apply_highlights(&mut document, &flat, &issues);

        assert_eq!(document.marks(), first.as_slice());
        apply_highlights(&mut document, &flat, &issues[..1]);
        assert_eq!(document.marks().len(), 1);
    }

    #[test]
    fn test_issue_at_position() {
        let mut document = doc(&["alpha beta"]);
        let flat = flatten(document.root());
        apply_highlights(&mut document, &flat, &[issue("beta", Some((6, 10)))]);

        assert_eq!(issue_at_position(&document, 7).map(|m| m.from), Some(7));
        assert_eq!(
            issue_at_position(&document, 10).map(|m| m.message.as_str()),
            Some("found beta")
        );
        assert!(issue_at_position(&document, 11).is_none());
        assert!(issue_at_position(&document, 2).is_none());
    }

    #[test]
    fn test_bare_text_root_keeps_marks() {
        let mut document = StructuredDocument::new(DocNode::text("natural gas plant"));
        let flat = flatten(document.root());
        let applied = apply_highlights(&mut document, &flat, &[issue("natural gas", Some((0, 11)))]);

        assert_eq!(applied, 1);
        assert_eq!((document.marks()[0].from, document.marks()[0].to), (0, 11));
    }

    #[test]
    fn test_marks_copy_issue_data() {
        let document = doc(&["alpha"]);
        let flat = flatten(document.root());
        let source = issue("alpha", Some((0, 5)))
            .with_suggestion("Reword")
            .with_favored_party(FavoredParty::Borrower);
        let marks = plan_highlights(&flat, &[source.clone()], document.content_size());

        assert_eq!(marks[0].issue_id, source.id);
        assert_eq!(marks[0].suggestion.as_deref(), Some("Reword"));
        assert_eq!(marks[0].favored_party, Some(FavoredParty::Borrower));
        assert_eq!((marks[0].from, marks[0].to), (1, 6));
    }
}
