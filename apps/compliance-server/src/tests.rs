//! Tests for the compliance server API
//!
//! Test categories:
//! - Request parsing properties (document ids, country hints)
//! - HTTP endpoints through the full router with axum-test
//! - Advisory fallbacks with stub services

#[cfg(test)]
mod request_property_tests {
    use proptest::prelude::*;
    use serde_json::json;

    use crate::api::AnalyzeRequest;
    use compliance_engine::Country;

    proptest! {
        /// Property: A supplied non-blank id is used trimmed
        #[test]
        fn document_id_is_trimmed(id in "[a-zA-Z0-9-]{1,24}", pad in " {0,3}") {
            let request: AnalyzeRequest = serde_json::from_value(json!({
                "documentId": format!("{pad}{id}{pad}"),
                "content": "text",
            })).unwrap();
            prop_assert_eq!(request.document_id(), id);
        }

        /// Property: Blank ids are replaced by a generated one
        #[test]
        fn blank_document_id_is_generated(pad in " {0,5}") {
            let request: AnalyzeRequest = serde_json::from_value(json!({
                "documentId": pad,
            })).unwrap();
            let id = request.document_id();
            prop_assert!(uuid::Uuid::parse_str(&id).is_ok());
        }

        /// Property: Any country string deserializes; only known codes resolve
        #[test]
        fn country_hints_never_reject(code in "[A-Za-z]{0,4}") {
            let request: AnalyzeRequest = serde_json::from_value(json!({
                "content": null,
                "providerCountry": code.clone(),
                "getterCountry": code.clone(),
            })).unwrap();
            prop_assert_eq!(request.hints.provider(), Country::parse_code(&code));
            prop_assert_eq!(request.hints.recipient(), Country::parse_code(&code));
        }
    }
}

#[cfg(test)]
mod http_endpoint_tests {
    //! HTTP endpoint integration tests using axum-test

    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};

    use compliance_engine::{
        AdvisoryError, AdvisoryRequest, AdvisoryResponse, AdvisoryService, ComplianceEngine,
        DisabledAdvisor,
    };

    use crate::store::InMemoryReportStore;
    use crate::{app_router, AppState};

    const GREEN_LOAN_PARAGRAPHS: &[&str] = &[
        "GREEN LOAN FACILITY AGREEMENT",
        "Proceeds fund a natural gas peaking plant.",
        "Margin adjustments are as determined by the Lender.",
    ];

    struct CannedAdvisor;

    #[async_trait]
    impl AdvisoryService for CannedAdvisor {
        fn is_available(&self) -> bool {
            true
        }

        async fn analyze(&self, _request: &AdvisoryRequest) -> Result<AdvisoryResponse, AdvisoryError> {
            AdvisoryResponse::from_json_str(
                r#"{"issues":[{"severity":"ERROR","message":"Peaking plant is not eligible","textMatch":"peaking plant"}]}"#,
            )
        }

        async fn negotiate(&self, clause: &str, _concern: &str) -> Result<String, AdvisoryError> {
            Ok(format!("Ask to narrow: {}", clause))
        }
    }

    struct BrokenAdvisor;

    #[async_trait]
    impl AdvisoryService for BrokenAdvisor {
        fn is_available(&self) -> bool {
            true
        }

        async fn analyze(&self, _request: &AdvisoryRequest) -> Result<AdvisoryResponse, AdvisoryError> {
            Err(AdvisoryError::Transport("connection refused".to_string()))
        }

        async fn negotiate(&self, _clause: &str, _concern: &str) -> Result<String, AdvisoryError> {
            Err(AdvisoryError::Transport("connection refused".to_string()))
        }
    }

    /// Create a test server with the full router
    fn create_test_server() -> TestServer {
        server_with(Arc::new(DisabledAdvisor))
    }

    fn server_with(advisor: Arc<dyn AdvisoryService>) -> TestServer {
        let state = AppState::new(
            ComplianceEngine::new(),
            advisor,
            Arc::new(InMemoryReportStore::new()),
        );
        TestServer::new(app_router(state)).unwrap()
    }

    fn content(paragraphs: &[&str]) -> Value {
        json!({
            "type": "doc",
            "content": paragraphs
                .iter()
                .map(|p| json!({"type": "paragraph", "content": [{"type": "text", "text": p}]}))
                .collect::<Vec<_>>(),
        })
    }

    #[tokio::test]
    async fn test_health_returns_200() {
        let server = create_test_server();
        let response = server.get("/health").await;
        response.assert_status_ok();

        let json = response.json::<Value>();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["service"], "compliance-server");
    }

    #[tokio::test]
    async fn test_rules_catalog() {
        let server = create_test_server();
        let response = server.get("/api/compliance/rules").await;
        response.assert_status_ok();

        let json = response.json::<Value>();
        assert!(json["success"].as_bool().unwrap());
        let rules = json["rules"].as_array().unwrap();
        assert_eq!(json["count"].as_u64().unwrap() as usize, rules.len());
        assert!(rules.iter().any(|r| r["jurisdiction"] == "EU"));
    }

    #[tokio::test]
    async fn test_countries_listing() {
        let server = create_test_server();
        let response = server.get("/api/compliance/countries").await;
        response.assert_status_ok();

        let json = response.json::<Value>();
        assert_eq!(json["count"], 27);
        assert_eq!(json["countries"][0]["code"], "DE");
        assert_eq!(json["countries"][0]["name"], "Germany");
    }

    #[tokio::test]
    async fn test_ai_status_reflects_advisor() {
        let disabled = create_test_server();
        let json = disabled.get("/api/compliance/ai/status").await.json::<Value>();
        assert_eq!(json["available"], false);

        let enabled = server_with(Arc::new(CannedAdvisor));
        let json = enabled.get("/api/compliance/ai/status").await.json::<Value>();
        assert_eq!(json["available"], true);
    }

    #[tokio::test]
    async fn test_analyze_flags_fossil_fuel() {
        let server = create_test_server();
        let response = server
            .post("/api/compliance/analyze")
            .json(&json!({
                "documentId": "loan-1",
                "content": content(GREEN_LOAN_PARAGRAPHS),
            }))
            .await;
        response.assert_status_ok();

        let json = response.json::<Value>();
        let report = &json["report"];
        assert_eq!(report["documentId"], "loan-1");
        assert!(report["score"].as_u64().unwrap() < 100);
        assert!(report["issues"]
            .as_array()
            .unwrap()
            .iter()
            .any(|i| i["textMatch"] == "natural gas" && i["severity"] == "error"));
    }

    #[tokio::test]
    async fn test_analyze_accepts_plain_text_and_unknown_country() {
        let server = create_test_server();
        let response = server
            .post("/api/compliance/analyze")
            .json(&json!({
                "content": "Darlehensvertrag nach BGB",
                "providerCountry": "XX",
            }))
            .await;
        response.assert_status_ok();

        let json = response.json::<Value>();
        assert!(!json["report"]["issues"]
            .as_array()
            .unwrap()
            .iter()
            .any(|i| i["jurisdiction"] == "Germany"));
    }

    #[tokio::test]
    async fn test_analyze_with_getter_country_adds_national_rules() {
        let server = create_test_server();
        let response = server
            .post("/api/compliance/analyze")
            .json(&json!({
                "content": "Darlehensvertrag nach BGB",
                "getterCountry": "DE",
            }))
            .await;
        response.assert_status_ok();

        let json = response.json::<Value>();
        assert!(json["report"]["issues"]
            .as_array()
            .unwrap()
            .iter()
            .any(|i| i["jurisdiction"] == "Germany"));
    }

    #[tokio::test]
    async fn test_highlighted_analysis_returns_marks() {
        let server = create_test_server();
        let response = server
            .post("/api/compliance/analyze/highlights")
            .json(&json!({
                "documentId": "loan-2",
                "content": content(GREEN_LOAN_PARAGRAPHS),
            }))
            .await;
        response.assert_status_ok();

        let json = response.json::<Value>();
        let marks = json["marks"].as_array().unwrap();
        assert!(!marks.is_empty());

        // "natural gas" sits in the second paragraph, which opens at 31
        let gas = marks
            .iter()
            .find(|m| m["message"].as_str().unwrap_or("").contains("natural gas"))
            .unwrap();
        let from = gas["from"].as_u64().unwrap();
        let to = gas["to"].as_u64().unwrap();
        assert_eq!(to - from, "natural gas".len() as u64);
        assert!(from > 31);
        assert!(json["report"]["issues"]
            .as_array()
            .unwrap()
            .iter()
            .any(|i| i["issueType"] == "Fairness"));
    }

    #[tokio::test]
    async fn test_highlighted_analysis_merges_advisory_issues() {
        let server = server_with(Arc::new(CannedAdvisor));
        let response = server
            .post("/api/compliance/analyze/highlights")
            .json(&json!({ "content": content(GREEN_LOAN_PARAGRAPHS) }))
            .await;
        response.assert_status_ok();

        let json = response.json::<Value>();
        let advisory = json["report"]["issues"]
            .as_array()
            .unwrap()
            .iter()
            .find(|i| i["textMatch"] == "peaking plant")
            .cloned()
            .unwrap();
        assert_eq!(advisory["severity"], "error");
        assert_eq!(advisory["category"], "AI Analysis");
        assert!(json["marks"]
            .as_array()
            .unwrap()
            .iter()
            .any(|m| m["issueId"] == advisory["id"]));
    }

    #[tokio::test]
    async fn test_advisory_failure_falls_back_to_local_issues() {
        let local = create_test_server();
        let broken = server_with(Arc::new(BrokenAdvisor));
        let body = json!({ "content": content(GREEN_LOAN_PARAGRAPHS) });

        let expected = local
            .post("/api/compliance/analyze/highlights")
            .json(&body)
            .await
            .json::<Value>();
        let response = broken
            .post("/api/compliance/analyze/highlights")
            .json(&body)
            .await;
        response.assert_status_ok();

        let json = response.json::<Value>();
        assert_eq!(json["report"]["score"], expected["report"]["score"]);
        assert_eq!(
            json["report"]["issues"].as_array().unwrap().len(),
            expected["report"]["issues"].as_array().unwrap().len()
        );
    }

    #[tokio::test]
    async fn test_apply_highlights_endpoint() {
        let server = create_test_server();
        let response = server
            .post("/api/compliance/highlights")
            .json(&json!({
                "content": content(&["alpha beta"]),
                "issues": [
                    {
                        "id": "i-1",
                        "severity": "warning",
                        "category": "Test",
                        "message": "beta found",
                        "textMatch": "beta",
                        "startOffset": 6,
                        "endOffset": 10
                    },
                    {
                        "id": "i-2",
                        "severity": "info",
                        "category": "Test",
                        "message": "not present",
                        "textMatch": "omega"
                    }
                ]
            }))
            .await;
        response.assert_status_ok();

        let json = response.json::<Value>();
        assert_eq!(json["applied"], 1);
        assert_eq!(json["marks"][0]["issueId"], "i-1");
        assert_eq!(json["marks"][0]["from"], 7);
        assert_eq!(json["marks"][0]["to"], 11);
    }

    #[tokio::test]
    async fn test_apply_highlights_on_bare_text_root() {
        let server = create_test_server();
        let response = server
            .post("/api/compliance/highlights")
            .json(&json!({
                "content": {"type": "text", "text": "natural gas plant"},
                "issues": [{
                    "id": "gas",
                    "severity": "error",
                    "category": "Greenwashing",
                    "message": "fossil fuel",
                    "textMatch": "natural gas",
                    "startOffset": 0,
                    "endOffset": 11
                }]
            }))
            .await;
        response.assert_status_ok();

        let json = response.json::<Value>();
        assert_eq!(json["applied"], 1);
        assert_eq!(json["marks"][0]["from"], 0);
        assert_eq!(json["marks"][0]["to"], 11);
    }

    #[tokio::test]
    async fn test_reports_are_listed_newest_first() {
        let server = create_test_server();
        for text in ["first analysis", "second analysis natural gas"] {
            server
                .post("/api/compliance/analyze")
                .json(&json!({ "documentId": "hist", "content": text }))
                .await
                .assert_status_ok();
        }

        let list = server
            .get("/api/compliance/documents/hist/reports")
            .await
            .json::<Value>();
        assert_eq!(list["count"], 2);

        let latest = server
            .get("/api/compliance/documents/hist/latest")
            .await
            .json::<Value>();
        assert_eq!(latest["id"], list["reports"][0]["id"]);
    }

    #[tokio::test]
    async fn test_latest_report_is_null_when_absent() {
        let server = create_test_server();
        let response = server.get("/api/compliance/documents/nothing/latest").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>(), Value::Null);

        let list = server
            .get("/api/compliance/documents/nothing/reports")
            .await
            .json::<Value>();
        assert_eq!(list["count"], 0);
    }

    #[tokio::test]
    async fn test_negotiate_uses_advisor() {
        let server = server_with(Arc::new(CannedAdvisor));
        let response = server
            .post("/api/compliance/negotiate")
            .json(&json!({ "clause": "Lender may terminate", "concern": "one-sided" }))
            .await;
        response.assert_status_ok();
        assert_eq!(
            response.json::<Value>()["advice"],
            "Ask to narrow: Lender may terminate"
        );
    }

    #[tokio::test]
    async fn test_negotiate_fallbacks() {
        let body = json!({ "clause": "Lender may terminate", "concern": "one-sided" });

        let disabled = create_test_server()
            .post("/api/compliance/negotiate")
            .json(&body)
            .await
            .json::<Value>();
        assert_eq!(
            disabled["advice"],
            "AI negotiation assistance unavailable. Configure OPENAI_API_KEY to enable."
        );

        let broken = server_with(Arc::new(BrokenAdvisor))
            .post("/api/compliance/negotiate")
            .json(&body)
            .await
            .json::<Value>();
        assert_eq!(broken["advice"], "AI analysis temporarily unavailable.");
    }

    #[tokio::test]
    async fn test_negotiate_rejects_empty_clause() {
        let server = create_test_server();
        let response = server
            .post("/api/compliance/negotiate")
            .json(&json!({ "clause": "   " }))
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);

        let json = response.json::<Value>();
        assert_eq!(json["success"], false);
        assert_eq!(json["code"], "INVALID_REQUEST");
    }
}
