//! Jurisdiction-scoped compliance rules
//!
//! Rules live in static, ordered registries: EU regulatory rules, then green
//! loan rules, then member-state rules. Each rule is a pure check over the
//! flattened document that yields at most one finding.

pub mod green_loan;
pub mod national;
pub mod regulatory;

use serde::Serialize;
use shared_types::{Issue, IssueType, Severity};
use tracing::debug;

use crate::document::DocNode;
use crate::flatten::FlatText;
use crate::jurisdiction::{Jurisdiction, JurisdictionHints};
use crate::patterns::TextMatch;

/// Input handed to every rule check
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Raw document tree, if any
    pub content: Option<&'a DocNode>,
    pub flat: &'a FlatText,
}

impl<'a> RuleContext<'a> {
    pub fn new(content: Option<&'a DocNode>, flat: &'a FlatText) -> Self {
        Self { content, flat }
    }
}

pub type RuleCheck = fn(&RuleContext<'_>) -> Option<Finding>;

/// A compliance rule. Stateless; `check` must be pure.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub regulation: &'static str,
    pub jurisdiction: Jurisdiction,
    pub severity: Severity,
    pub check: RuleCheck,
}

impl Rule {
    pub fn info(&self) -> RuleInfo {
        RuleInfo {
            id: self.id,
            name: self.name,
            category: self.category,
            regulation: self.regulation,
            jurisdiction: self.jurisdiction,
            severity: self.severity,
        }
    }
}

/// Serializable rule metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleInfo {
    pub id: &'static str,
    pub name: &'static str,
    pub category: &'static str,
    pub regulation: &'static str,
    pub jurisdiction: Jurisdiction,
    pub severity: Severity,
}

/// What a rule reports. Severity, regulation and jurisdiction come from the
/// rule itself when the finding becomes an [`Issue`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub category: &'static str,
    pub message: String,
    pub suggestion: Option<&'static str>,
    pub anchor: Option<TextMatch>,
}

impl Finding {
    pub fn new(category: &'static str, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            suggestion: None,
            anchor: None,
        }
    }

    pub fn suggest(mut self, suggestion: &'static str) -> Self {
        self.suggestion = Some(suggestion);
        self
    }

    pub fn anchored(mut self, anchor: Option<TextMatch>) -> Self {
        self.anchor = anchor;
        self
    }

    fn into_issue(self, rule: &Rule) -> Issue {
        let mut issue = Issue::new(rule.severity, self.category, self.message)
            .with_issue_type(IssueType::LmaCompliance);
        if let Some(suggestion) = self.suggestion {
            issue = issue.with_suggestion(suggestion);
        }
        if let Some(anchor) = self.anchor {
            issue = issue.with_span(anchor.text, anchor.start, anchor.end);
        }
        issue.regulation = Some(rule.regulation.to_string());
        issue.jurisdiction = Some(rule.jurisdiction.label().to_string());
        issue
    }
}

/// Every rule in registry order
pub fn all_rules() -> impl Iterator<Item = &'static Rule> {
    regulatory::RULES
        .iter()
        .chain(green_loan::RULES)
        .chain(national::RULES)
}

/// EU-wide rules plus the rules of the hinted countries, in registry order
pub fn applicable_rules(hints: &JurisdictionHints) -> Vec<&'static Rule> {
    let (eu_wide, national): (Vec<_>, Vec<_>) = all_rules()
        .filter(|rule| hints.selects(rule.jurisdiction))
        .partition(|rule| rule.jurisdiction.is_eu_wide());
    eu_wide.into_iter().chain(national).collect()
}

/// Run `rules` in order, stamping each finding with its rule's metadata
pub fn run_rules<'r, I>(rules: I, ctx: &RuleContext<'_>) -> Vec<Issue>
where
    I: IntoIterator<Item = &'r Rule>,
{
    rules
        .into_iter()
        .filter_map(|rule| {
            let finding = (rule.check)(ctx)?;
            debug!(rule = rule.id, "Rule triggered");
            Some(finding.into_issue(rule))
        })
        .collect()
}

/// Metadata for every registered rule
pub fn rule_catalog() -> Vec<RuleInfo> {
    all_rules().map(Rule::info).collect()
}

/// Finding raised when none of `pattern`'s phrases appear in the document
pub(crate) fn when_absent(
    flat: &FlatText,
    pattern: &regex::Regex,
    finding: impl FnOnce() -> Finding,
) -> Option<Finding> {
    if crate::patterns::mentions(flat, pattern) {
        None
    } else {
        Some(finding())
    }
}
