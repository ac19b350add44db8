//! Optional external advisory pass
//!
//! An [`AdvisoryService`] (typically an LLM) reviews the document text and
//! returns extra issues. Its output is normalized against the flattened text
//! and merged into the local issue set, skipping issues whose matched text is
//! already covered. Any failure leaves the local issues untouched.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use shared_types::{Issue, IssueType, Severity};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::error::AdvisoryError;
use crate::flatten::FlatText;

/// Text sent for advisory review
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryRequest {
    pub document_text: String,
}

impl AdvisoryRequest {
    /// Build a request carrying at most `max_chars` characters of `text`
    pub fn new(text: &str, max_chars: usize) -> Self {
        Self {
            document_text: text.chars().take(max_chars).collect(),
        }
    }
}

/// An issue as reported by the advisory service, before normalization
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryIssue {
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub text_match: Option<String>,
    #[serde(default)]
    pub suggestion: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvisoryResponse {
    #[serde(default)]
    pub issues: Vec<AdvisoryIssue>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub overall_assessment: Option<String>,
}

impl AdvisoryResponse {
    /// Neutral result returned when no advisory backend is configured
    pub fn unavailable() -> Self {
        Self {
            issues: Vec::new(),
            suggestions: vec!["Enable AI analysis by configuring OPENAI_API_KEY".to_string()],
            overall_assessment: Some("AI analysis unavailable".to_string()),
        }
    }

    /// Parse the JSON body produced by the advisory model
    pub fn from_json_str(body: &str) -> Result<Self, AdvisoryError> {
        Ok(serde_json::from_str(body)?)
    }

    pub fn assessment(&self) -> &str {
        self.overall_assessment
            .as_deref()
            .unwrap_or("Analysis complete")
    }
}

/// External reviewer of document text
#[async_trait]
pub trait AdvisoryService: Send + Sync {
    /// False when the service has no backend configured
    fn is_available(&self) -> bool;

    async fn analyze(&self, request: &AdvisoryRequest) -> Result<AdvisoryResponse, AdvisoryError>;

    /// Plain-language negotiation help for a single clause
    async fn negotiate(&self, _clause: &str, _concern: &str) -> Result<String, AdvisoryError> {
        Err(AdvisoryError::Unavailable)
    }
}

/// Advisory service used when nothing is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledAdvisor;

#[async_trait]
impl AdvisoryService for DisabledAdvisor {
    fn is_available(&self) -> bool {
        false
    }

    async fn analyze(&self, _request: &AdvisoryRequest) -> Result<AdvisoryResponse, AdvisoryError> {
        Ok(AdvisoryResponse::unavailable())
    }
}

/// Call `service` under the configured timeout
pub async fn consult(
    service: &dyn AdvisoryService,
    flat: &FlatText,
    config: &EngineConfig,
) -> Result<AdvisoryResponse, AdvisoryError> {
    if !service.is_available() {
        return Err(AdvisoryError::Unavailable);
    }
    let request = AdvisoryRequest::new(flat.search_text(), config.advisory_max_chars);
    let limit = Duration::from_millis(config.advisory_timeout_ms);
    match tokio::time::timeout(limit, service.analyze(&request)).await {
        Ok(result) => result,
        Err(_) => Err(AdvisoryError::Timeout(config.advisory_timeout_ms)),
    }
}

/// Turn raw advisory issues into engine issues.
///
/// Offsets come from an exact search for the matched text; unknown
/// severities become info.
pub fn normalize_issues(response: &AdvisoryResponse, flat: &FlatText) -> Vec<Issue> {
    response
        .issues
        .iter()
        .map(|raw| {
            let severity = raw
                .severity
                .as_deref()
                .and_then(Severity::from_label)
                .unwrap_or(Severity::Info);
            let category = non_blank(&raw.category).unwrap_or("AI Analysis");
            let message = non_blank(&raw.message).unwrap_or("Compliance issue detected");

            let mut issue = Issue::new(severity, category, message)
                .with_issue_type(IssueType::LmaCompliance);
            issue.suggestion = raw.suggestion.clone();
            if let Some(text) = raw.text_match.as_deref().filter(|t| !t.is_empty()) {
                match flat.find_exact(text) {
                    Some(start) => issue = issue.with_span(text, start, start + text.chars().count()),
                    None => issue.text_match = Some(text.to_string()),
                }
            }
            issue
        })
        .collect()
}

/// Append advisory issues whose matched text is not already present.
///
/// Issues without matched text are always kept. Each kept advisory match is
/// added to the seen set, so later advisory duplicates are dropped too.
pub fn merge_advisory(mut local: Vec<Issue>, advisory: Vec<Issue>) -> Vec<Issue> {
    let mut seen: HashSet<String> = local
        .iter()
        .filter_map(|i| i.text_match.clone())
        .collect();

    let before = local.len();
    for issue in advisory {
        match issue.text_match.as_deref() {
            Some(text) if seen.contains(text) => continue,
            Some(text) => {
                seen.insert(text.to_string());
            }
            None => {}
        }
        local.push(issue);
    }

    debug!(added = local.len() - before, "Merged advisory issues");
    local
}

/// Run the advisory pass and merge its issues, or return `local` unchanged
/// on any failure
pub async fn augment(
    local: Vec<Issue>,
    service: &dyn AdvisoryService,
    flat: &FlatText,
    config: &EngineConfig,
) -> Vec<Issue> {
    match consult(service, flat, config).await {
        Ok(response) => {
            let advisory = normalize_issues(&response, flat);
            merge_advisory(local, advisory)
        }
        Err(AdvisoryError::Unavailable) => local,
        Err(e) => {
            warn!("Advisory analysis failed, using rule-based results only: {}", e);
            local
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
