//! Report persistence
//!
//! Reports are immutable once saved. Listing returns a document's reports
//! newest first.

use std::collections::HashMap;

use async_trait::async_trait;
use shared_types::ComplianceReport;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Report store unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn save(&self, report: ComplianceReport) -> Result<(), StoreError>;

    /// All reports for `document_id`, newest first
    async fn list(&self, document_id: &str) -> Result<Vec<ComplianceReport>, StoreError>;

    async fn latest(&self, document_id: &str) -> Result<Option<ComplianceReport>, StoreError> {
        Ok(self.list(document_id).await?.into_iter().next())
    }
}

/// Process-local store, lost on restart
#[derive(Default)]
pub struct InMemoryReportStore {
    reports: RwLock<HashMap<String, Vec<ComplianceReport>>>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn save(&self, report: ComplianceReport) -> Result<(), StoreError> {
        let mut reports = self.reports.write().await;
        let entries = reports.entry(report.document_id.clone()).or_default();
        // Newest first; equal timestamps keep the later save in front
        let at = entries.partition_point(|r| r.analyzed_at > report.analyzed_at);
        entries.insert(at, report);
        Ok(())
    }

    async fn list(&self, document_id: &str) -> Result<Vec<ComplianceReport>, StoreError> {
        let reports = self.reports.read().await;
        Ok(reports.get(document_id).cloned().unwrap_or_default())
    }
}
