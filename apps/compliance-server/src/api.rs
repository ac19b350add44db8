//! API handlers for the compliance server
//!
//! Provides REST endpoints for:
//! - Rule-only and full (scan + advisory) analysis
//! - Highlight planning over submitted content
//! - Report history per document
//! - Clause negotiation help

use std::time::Duration;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{info, warn};

use compliance_engine::{
    countries, AdvisoryError, AdvisoryService, AnnotatedDocument, CountryInfo, HighlightMark,
    JurisdictionHints, RuleInfo, StructuredDocument,
};
use shared_types::{ComplianceReport, Issue};

use crate::error::ServerError;
use crate::store::ReportStore;
use crate::AppState;

const NEGOTIATION_UNAVAILABLE: &str =
    "AI negotiation assistance unavailable. Configure OPENAI_API_KEY to enable.";
const NEGOTIATION_FAILED: &str = "AI analysis temporarily unavailable.";

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "compliance-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
pub struct RuleListResponse {
    pub success: bool,
    pub rules: Vec<RuleInfo>,
    pub count: usize,
}

/// Handler: GET /api/compliance/rules
pub async fn handle_list_rules(State(state): State<AppState>) -> Json<RuleListResponse> {
    let rules = state.engine.rule_catalog();
    let count = rules.len();
    Json(RuleListResponse {
        success: true,
        rules,
        count,
    })
}

#[derive(Serialize)]
pub struct CountryListResponse {
    pub success: bool,
    pub countries: Vec<CountryInfo>,
    pub count: usize,
}

/// Handler: GET /api/compliance/countries
pub async fn handle_list_countries() -> Json<CountryListResponse> {
    let countries = countries();
    let count = countries.len();
    Json(CountryListResponse {
        success: true,
        countries,
        count,
    })
}

#[derive(Serialize)]
pub struct AdvisoryStatusResponse {
    pub available: bool,
}

/// Handler: GET /api/compliance/ai/status
pub async fn handle_ai_status(State(state): State<AppState>) -> Json<AdvisoryStatusResponse> {
    Json(AdvisoryStatusResponse {
        available: state.advisor.is_available(),
    })
}

/// Analysis request body
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Generated when absent
    #[serde(default)]
    pub document_id: Option<String>,
    /// Editor content: node tree, node array or plain text
    #[serde(default)]
    pub content: Value,
    #[serde(flatten)]
    pub hints: JurisdictionHints,
}

impl AnalyzeRequest {
    pub(crate) fn document_id(&self) -> String {
        self.document_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string())
    }
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub success: bool,
    pub report: ComplianceReport,
}

/// Handler: POST /api/compliance/analyze
///
/// Rule-only analysis. The report is stored under its document id.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, ServerError> {
    let document_id = request.document_id();
    let doc = StructuredDocument::from_json(&request.content);

    let report = state.engine.analyze(&document_id, &doc, &request.hints);
    state.reports.save(report.clone()).await?;

    Ok(Json(AnalyzeResponse {
        success: true,
        report,
    }))
}

#[derive(Serialize)]
pub struct HighlightedAnalysisResponse {
    pub success: bool,
    pub report: ComplianceReport,
    pub marks: Vec<HighlightMark>,
}

/// Handler: POST /api/compliance/analyze/highlights
///
/// Rules, scans and the advisory pass, plus the marks the issues produce on
/// the submitted content.
pub async fn handle_analyze_with_highlights(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<HighlightedAnalysisResponse>, ServerError> {
    let document_id = request.document_id();
    let mut doc = StructuredDocument::from_json(&request.content);

    let report = state
        .engine
        .analyze_with_advisory(&document_id, &doc, &request.hints, state.advisor.as_ref())
        .await;
    let applied = state.engine.apply_highlights(&mut doc, &report.issues);
    info!(document_id = %document_id, applied, "Highlighted analysis");

    state.reports.save(report.clone()).await?;

    Ok(Json(HighlightedAnalysisResponse {
        success: true,
        report,
        marks: doc.marks().to_vec(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct HighlightRequest {
    #[serde(default)]
    pub content: Value,
    #[serde(default)]
    pub issues: Vec<Issue>,
}

#[derive(Serialize)]
pub struct HighlightResponse {
    pub success: bool,
    pub applied: usize,
    pub marks: Vec<HighlightMark>,
}

/// Handler: POST /api/compliance/highlights
pub async fn handle_apply_highlights(
    State(state): State<AppState>,
    Json(request): Json<HighlightRequest>,
) -> Json<HighlightResponse> {
    let mut doc = StructuredDocument::from_json(&request.content);
    let applied = state.engine.apply_highlights(&mut doc, &request.issues);

    Json(HighlightResponse {
        success: true,
        applied,
        marks: doc.marks().to_vec(),
    })
}

#[derive(Serialize)]
pub struct ReportListResponse {
    pub success: bool,
    pub reports: Vec<ComplianceReport>,
    pub count: usize,
}

/// Handler: GET /api/compliance/documents/:id/reports
pub async fn handle_list_reports(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<Json<ReportListResponse>, ServerError> {
    let reports = state.reports.list(&document_id).await?;
    let count = reports.len();
    Ok(Json(ReportListResponse {
        success: true,
        reports,
        count,
    }))
}

/// Handler: GET /api/compliance/documents/:id/latest
///
/// Responds with `null` when the document has no reports.
pub async fn handle_latest_report(
    State(state): State<AppState>,
    Path(document_id): Path<String>,
) -> Result<Json<Option<ComplianceReport>>, ServerError> {
    Ok(Json(state.reports.latest(&document_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct NegotiateRequest {
    pub clause: String,
    #[serde(default)]
    pub concern: String,
}

#[derive(Serialize)]
pub struct NegotiateResponse {
    pub advice: String,
}

/// Handler: POST /api/compliance/negotiate
pub async fn handle_negotiate(
    State(state): State<AppState>,
    Json(request): Json<NegotiateRequest>,
) -> Result<Json<NegotiateResponse>, ServerError> {
    if request.clause.trim().is_empty() {
        return Err(ServerError::InvalidRequest(
            "clause must not be empty".to_string(),
        ));
    }

    let timeout_ms = state.engine.config().advisory_timeout_ms;
    let call = state.advisor.negotiate(&request.clause, &request.concern);
    let result = match tokio::time::timeout(Duration::from_millis(timeout_ms), call).await {
        Ok(result) => result,
        Err(_) => Err(AdvisoryError::Timeout(timeout_ms)),
    };

    let advice = match result {
        Ok(advice) => advice,
        Err(AdvisoryError::Unavailable) => NEGOTIATION_UNAVAILABLE.to_string(),
        Err(e) => {
            warn!("Negotiation advice failed: {}", e);
            NEGOTIATION_FAILED.to_string()
        }
    };

    Ok(Json(NegotiateResponse { advice }))
}
