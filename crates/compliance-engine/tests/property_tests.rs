//! Property-based tests for compliance-engine
//!
//! Exercises flattening, scoring and highlighting over generated documents.

use compliance_engine::{
    flatten, score::score, AnnotatedDocument, ComplianceEngine, DocNode, JurisdictionHints,
    StructuredDocument,
};
use proptest::prelude::*;
use shared_types::{Issue, Severity};

// ============================================================
// Strategies
// ============================================================

fn leaf() -> impl Strategy<Value = DocNode> {
    prop_oneof![
        4 => "[a-zA-Z0-9 €%]{0,12}".prop_map(|t| DocNode::text(t)),
        1 => Just(DocNode::hard_break()),
        1 => Just(DocNode::new("image", Vec::new())),
        1 => Just(DocNode::new("horizontalRule", Vec::new())),
    ]
}

fn node() -> impl Strategy<Value = DocNode> {
    leaf().prop_recursive(4, 32, 4, |inner| {
        (
            prop::sample::select(vec![
                "paragraph",
                "heading",
                "listItem",
                "bulletList",
                "blockquote",
                "tableCell",
                "span",
            ]),
            prop::collection::vec(inner, 0..4),
        )
            .prop_map(|(node_type, content)| DocNode::new(node_type, content))
    })
}

fn document() -> impl Strategy<Value = DocNode> {
    prop::collection::vec(node(), 0..5).prop_map(DocNode::doc)
}

fn severity() -> impl Strategy<Value = Severity> {
    prop_oneof![
        Just(Severity::Error),
        Just(Severity::Warning),
        Just(Severity::Info),
    ]
}

fn issues() -> impl Strategy<Value = Vec<Issue>> {
    prop::collection::vec(
        (severity(), "[a-z ]{0,6}", prop::option::of((0usize..60, 0usize..60))),
        0..12,
    )
    .prop_map(|specs| {
        specs
            .into_iter()
            .map(|(severity, text, offsets)| {
                let mut issue = Issue::new(severity, "Generated", "generated issue");
                issue.text_match = Some(text);
                if let Some((start, end)) = offsets {
                    issue.start_offset = Some(start);
                    issue.end_offset = Some(end);
                }
                issue
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    // ============================================================
    // Flattening
    // ============================================================

    #[test]
    fn position_map_covers_every_char(root in document()) {
        let flat = flatten(Some(&root));
        prop_assert_eq!(flat.position_map().len(), flat.text().chars().count());
    }

    #[test]
    fn position_map_is_non_decreasing(root in document()) {
        let flat = flatten(Some(&root));
        prop_assert!(flat.position_map().windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn coordinates_stay_inside_content(root in document()) {
        let flat = flatten(Some(&root));
        let size = root.content_size();
        prop_assert!(flat.position_map().iter().all(|&pos| pos < size));
    }

    #[test]
    fn bare_text_root_coordinates_stay_inside_content(text in "[a-z €]{1,24}") {
        let doc = StructuredDocument::new(DocNode::text(text));
        let flat = flatten(doc.root());
        let size = doc.content_size();
        prop_assert_eq!(size, flat.len());
        prop_assert!(flat.position_map().iter().all(|&pos| pos < size));
    }

    #[test]
    fn search_text_has_no_whitespace_runs(root in document()) {
        let flat = flatten(Some(&root));
        let search = flat.search_text();
        prop_assert!(!search.contains("  "));
        prop_assert_eq!(search.trim(), search);
    }

    // ============================================================
    // Scoring
    // ============================================================

    #[test]
    fn score_is_bounded(set in issues()) {
        prop_assert!(score(&set) <= 100);
    }

    #[test]
    fn adding_an_issue_never_raises_score(mut set in issues(), extra in severity()) {
        let before = score(&set);
        set.push(Issue::new(extra, "Extra", "extra"));
        prop_assert!(score(&set) <= before);
    }

    // ============================================================
    // Highlighting
    // ============================================================

    #[test]
    fn marks_stay_inside_content(root in document(), set in issues()) {
        let engine = ComplianceEngine::new();
        let mut doc = StructuredDocument::new(root);
        engine.apply_highlights(&mut doc, &set);

        let size = doc.content_size();
        prop_assert!(doc.marks().iter().all(|m| m.from < m.to && m.to <= size));
    }

    #[test]
    fn rehighlighting_is_idempotent(root in document(), set in issues()) {
        let engine = ComplianceEngine::new();
        let mut doc = StructuredDocument::new(root);

        engine.apply_highlights(&mut doc, &set);
        let first = doc.marks().to_vec();
        engine.apply_highlights(&mut doc, &set);

        prop_assert_eq!(doc.marks(), first.as_slice());
    }

    #[test]
    fn local_issue_offsets_index_the_flattened_text(root in document()) {
        let engine = ComplianceEngine::new();
        let flat = flatten(Some(&root));
        let found = engine.collect_local_issues(Some(&root), &flat, &JurisdictionHints::default());

        for issue in found {
            if let (Some(start), Some(end)) = (issue.start_offset, issue.end_offset) {
                prop_assert!(start <= end);
                prop_assert!(end <= flat.len());
            }
        }
    }
}
