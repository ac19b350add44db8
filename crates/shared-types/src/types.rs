use chrono::{DateTime, Utc};
use uuid::Uuid;

/// Severity of a compliance finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    /// Parse a loosely formatted severity label ("ERROR", "Warning", ...)
    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "error" | "critical" => Some(Severity::Error),
            "warning" => Some(Severity::Warning),
            "info" => Some(Severity::Info),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }
}

/// Whether an issue is a regulatory finding or a fairness (party balance) finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum IssueType {
    #[serde(rename = "LMA Compliance")]
    LmaCompliance,
    #[serde(rename = "Fairness")]
    Fairness,
}

impl IssueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            IssueType::LmaCompliance => "LMA Compliance",
            IssueType::Fairness => "Fairness",
        }
    }
}

/// Party a fairness clause favors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FavoredParty {
    Lender,
    Borrower,
    Neutral,
}

impl FavoredParty {
    pub fn as_str(&self) -> &'static str {
        match self {
            FavoredParty::Lender => "lender",
            FavoredParty::Borrower => "borrower",
            FavoredParty::Neutral => "neutral",
        }
    }
}

/// A single compliance or fairness finding.
///
/// Offsets are character offsets into the position-mapped flattened text,
/// `start_offset` inclusive and `end_offset` exclusive.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Issue {
    pub id: String,
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
    pub text_match: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start_offset: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_offset: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<IssueType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub favored_party: Option<FavoredParty>,
}

impl Issue {
    /// Create a document-level issue with no textual anchor
    pub fn new(severity: Severity, category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            severity,
            category: category.into(),
            message: message.into(),
            suggestion: None,
            regulation: None,
            jurisdiction: None,
            text_match: None,
            start_offset: None,
            end_offset: None,
            issue_type: None,
            favored_party: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Anchor the issue to `[start, end)` of the flattened text
    pub fn with_span(mut self, text_match: impl Into<String>, start: usize, end: usize) -> Self {
        self.text_match = Some(text_match.into());
        self.start_offset = Some(start);
        self.end_offset = Some(end);
        self
    }

    pub fn with_issue_type(mut self, issue_type: IssueType) -> Self {
        self.issue_type = Some(issue_type);
        self
    }

    pub fn with_favored_party(mut self, party: FavoredParty) -> Self {
        self.favored_party = Some(party);
        self
    }

    /// True when the issue carries text that can be located in the document
    pub fn is_highlightable(&self) -> bool {
        self.text_match.as_deref().is_some_and(|m| !m.is_empty())
    }
}

/// Result of one analysis run. Never mutated after creation.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComplianceReport {
    pub id: String,
    pub document_id: String,
    pub score: u8,
    pub issues: Vec<Issue>,
    pub analyzed_at: DateTime<Utc>,
}

impl ComplianceReport {
    pub fn new(document_id: impl Into<String>, score: u8, issues: Vec<Issue>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            document_id: document_id.into(),
            score,
            issues,
            analyzed_at: Utc::now(),
        }
    }

    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.issues.iter().filter(|i| i.severity == severity).count()
    }
}
