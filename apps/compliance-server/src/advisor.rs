//! OpenAI-compatible advisory client

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use compliance_engine::{AdvisoryError, AdvisoryRequest, AdvisoryResponse, AdvisoryService};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o";

const ANALYSIS_SYSTEM_PROMPT: &str = "You are an expert in Green Finance, specifically LMA Green \
Loan Principles and EU sustainable finance regulations. Provide precise, actionable compliance analysis.";

const NEGOTIATION_SYSTEM_PROMPT: &str = "You are a financial negotiation expert helping borrowers \
understand and negotiate loan terms fairly.";

const NO_ADVICE: &str = "Unable to generate negotiation advice.";

/// Chat completions client configured from the environment
pub struct OpenAiAdvisor {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl OpenAiAdvisor {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// `OPENAI_API_KEY` is required; `OPENAI_BASE_URL` and `OPENAI_MODEL` are optional
    pub fn from_env() -> Option<Self> {
        let key = std::env::var("OPENAI_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())?;
        let mut advisor = Self::new(key);
        if let Ok(base_url) = std::env::var("OPENAI_BASE_URL") {
            advisor = advisor.with_base_url(base_url);
        }
        if let Ok(model) = std::env::var("OPENAI_MODEL") {
            advisor = advisor.with_model(model);
        }
        Some(advisor)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, body: serde_json::Value) -> Result<Option<String>, AdvisoryError> {
        let url = format!("{}/chat/completions", self.base_url);
        debug!(%url, model = %self.model, "Calling advisory model");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AdvisoryError::Transport(e.to_string()))?
            .error_for_status()
            .map_err(|e| AdvisoryError::Transport(e.to_string()))?;

        let completion: ChatCompletion = response
            .json()
            .await
            .map_err(|e| AdvisoryError::MalformedResponse(e.to_string()))?;

        Ok(completion.content())
    }
}

#[async_trait]
impl AdvisoryService for OpenAiAdvisor {
    fn is_available(&self) -> bool {
        true
    }

    async fn analyze(&self, request: &AdvisoryRequest) -> Result<AdvisoryResponse, AdvisoryError> {
        let body = json!({
            "model": self.model,
            "messages": [
                ChatMessage::system(ANALYSIS_SYSTEM_PROMPT),
                ChatMessage::user(analysis_prompt(&request.document_text)),
            ],
            "response_format": { "type": "json_object" },
            "temperature": 0.3,
            "max_tokens": 2000,
        });

        let content = self
            .complete(body)
            .await?
            .ok_or_else(|| AdvisoryError::MalformedResponse("empty completion".to_string()))?;
        AdvisoryResponse::from_json_str(&content)
    }

    async fn negotiate(&self, clause: &str, concern: &str) -> Result<String, AdvisoryError> {
        let body = json!({
            "model": self.model,
            "messages": [
                ChatMessage::system(NEGOTIATION_SYSTEM_PROMPT),
                ChatMessage::user(negotiation_prompt(clause, concern)),
            ],
            "temperature": 0.5,
            "max_tokens": 1000,
        });

        Ok(self
            .complete(body)
            .await?
            .unwrap_or_else(|| NO_ADVICE.to_string()))
    }
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

impl ChatMessage {
    fn system(content: &str) -> Self {
        Self {
            role: "system",
            content: content.to_string(),
        }
    }

    fn user(content: String) -> Self {
        Self {
            role: "user",
            content,
        }
    }
}

#[derive(Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl ChatCompletion {
    /// First choice's content, `None` when missing or blank
    fn content(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
    }
}

fn analysis_prompt(document_text: &str) -> String {
    format!(
        r#"You are a Green Loan compliance expert. Analyze the following document for compliance issues with the LMA Green Loan Principles 2023 and EU Taxonomy Regulation.

DOCUMENT:
{document_text}

Identify:
1. CRITICAL issues (fossil fuel references, greenwashing, non-eligible uses of proceeds)
2. WARNING issues (weak language, missing mandatory clauses, inadequate verification)
3. INFO issues (missing best practices, vague metrics)

For each issue found, provide:
- The exact text that is problematic (for highlighting)
- The severity level (error/warning/info)
- A clear explanation
- A specific suggestion to fix it

Respond in JSON format:
{{
  "issues": [
    {{
      "severity": "error|warning|info",
      "category": "Category name",
      "message": "Clear description of the issue",
      "textMatch": "exact text from document",
      "suggestion": "How to fix it"
    }}
  ],
  "suggestions": ["General improvement suggestions"],
  "overallAssessment": "Brief overall compliance assessment"
}}"#
    )
}

fn negotiation_prompt(clause: &str, concern: &str) -> String {
    format!(
        "A borrower has a concern about this loan clause:\n\n\
         CLAUSE:\n{clause}\n\n\
         BORROWER'S CONCERN:\n{concern}\n\n\
         Provide:\n\
         1. Plain-language explanation of what this clause means\n\
         2. Whether the concern is reasonable\n\
         3. Suggested alternative language that would be more balanced\n\
         4. Key negotiation points the borrower could raise"
    )
}
