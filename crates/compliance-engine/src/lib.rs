pub mod advisory;
pub mod config;
pub mod document;
pub mod error;
pub mod flatten;
pub mod highlight;
pub mod jurisdiction;
pub mod patterns;
pub mod rules;
pub mod scan;
pub mod score;

pub use advisory::{AdvisoryRequest, AdvisoryResponse, AdvisoryService, DisabledAdvisor};
pub use config::EngineConfig;
pub use document::{AnnotatedDocument, DocNode, StructuredDocument};
pub use error::{AdvisoryError, ConfigError};
pub use flatten::{flatten, FlatText};
pub use highlight::{issue_at_position, HighlightMark};
pub use jurisdiction::{countries, Country, CountryInfo, Jurisdiction, JurisdictionHints};
pub use rules::{Rule, RuleInfo};

use shared_types::{ComplianceReport, Issue};
use tracing::{debug, info};

use rules::RuleContext;

/// ComplianceEngine entry point
#[derive(Debug, Clone, Default)]
pub struct ComplianceEngine {
    config: EngineConfig,
}

impl ComplianceEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Metadata for every registered rule
    pub fn rule_catalog(&self) -> Vec<RuleInfo> {
        rules::rule_catalog()
    }

    pub fn applicable_rules(&self, hints: &JurisdictionHints) -> Vec<&'static Rule> {
        rules::applicable_rules(hints)
    }

    /// Rule-only analysis of a document
    pub fn analyze<D>(&self, document_id: &str, doc: &D, hints: &JurisdictionHints) -> ComplianceReport
    where
        D: AnnotatedDocument + ?Sized,
    {
        let flat = flatten(doc.root());
        let issues = self.run_rules(doc.root(), &flat, hints);
        self.report(document_id, issues)
    }

    /// Rules plus the exhaustive green loan and disparity scans
    pub fn collect_local_issues(
        &self,
        root: Option<&DocNode>,
        flat: &FlatText,
        hints: &JurisdictionHints,
    ) -> Vec<Issue> {
        let mut issues = self.run_rules(root, flat, hints);
        issues.extend(scan::green_loan::scan_green_loan(
            flat,
            self.config.green_loan_match_cap,
        ));
        issues.extend(scan::disparity::scan_disparities(
            flat,
            self.config.disparity_match_cap,
        ));
        issues
    }

    /// Full analysis: rules, scans and the advisory pass.
    ///
    /// Advisory failures are logged and the local issues are reported as-is.
    pub async fn analyze_with_advisory<D>(
        &self,
        document_id: &str,
        doc: &D,
        hints: &JurisdictionHints,
        advisor: &dyn AdvisoryService,
    ) -> ComplianceReport
    where
        D: AnnotatedDocument + Sync + ?Sized,
    {
        let flat = flatten(doc.root());
        let local = self.collect_local_issues(doc.root(), &flat, hints);
        let issues = advisory::augment(local, advisor, &flat, &self.config).await;
        self.report(document_id, issues)
    }

    /// Flatten the document's current content and replace its highlights
    pub fn apply_highlights<D>(&self, doc: &mut D, issues: &[Issue]) -> usize
    where
        D: AnnotatedDocument + ?Sized,
    {
        let flat = flatten(doc.root());
        highlight::apply_highlights(doc, &flat, issues)
    }

    /// Check raw text against the EU-wide rules (for testing)
    pub fn check_text(&self, text: &str) -> Vec<Issue> {
        let doc = StructuredDocument::from_plain_text(text);
        let flat = flatten(doc.root());
        self.run_rules(doc.root(), &flat, &JurisdictionHints::default())
    }

    fn run_rules(
        &self,
        root: Option<&DocNode>,
        flat: &FlatText,
        hints: &JurisdictionHints,
    ) -> Vec<Issue> {
        let applicable = rules::applicable_rules(hints);
        debug!(rules = applicable.len(), chars = flat.len(), "Running rules");
        rules::run_rules(applicable, &RuleContext::new(root, flat))
    }

    fn report(&self, document_id: &str, issues: Vec<Issue>) -> ComplianceReport {
        let score = score::score(&issues);
        info!(
            document_id,
            score,
            issues = issues.len(),
            "Compliance analysis complete"
        );
        ComplianceReport::new(document_id, score, issues)
    }
}
