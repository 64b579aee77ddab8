use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::batch::{BatchStats, Finding};
use crate::domain::DocumentId;
use crate::report::SummaryRow;

/// Findings retained from one import, keyed by document.
#[derive(Debug, Clone, Serialize)]
pub struct FindingsBatch {
    pub document: DocumentId,
    pub name: String,
    pub imported_at: DateTime<Utc>,
    pub stats: BatchStats,
    pub findings: Vec<Finding>,

    /// Grouped totals, computed with the field names of the rules in force
    pub summary: Vec<SummaryRow>,
}

/// Keyed store of import results.
///
/// The rule engine never touches this; only the import/report layer does.
#[async_trait]
pub trait FindingsStore: Send + Sync {
    /// Store a batch, replacing whatever the document had before.
    async fn put_findings(&self, batch: FindingsBatch) -> anyhow::Result<()>;

    async fn get_findings(&self, document: &DocumentId) -> anyhow::Result<Option<FindingsBatch>>;

    /// Number of documents with stored findings.
    async fn document_count(&self) -> anyhow::Result<usize>;
}
