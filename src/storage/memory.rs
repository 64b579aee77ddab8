use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;

use crate::domain::DocumentId;

use super::traits::{FindingsBatch, FindingsStore};

/// Process-local findings store. Contents are lost on restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    batches: RwLock<HashMap<DocumentId, FindingsBatch>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FindingsStore for InMemoryStore {
    async fn put_findings(&self, batch: FindingsBatch) -> anyhow::Result<()> {
        self.batches.write().insert(batch.document.clone(), batch);
        Ok(())
    }

    async fn get_findings(&self, document: &DocumentId) -> anyhow::Result<Option<FindingsBatch>> {
        Ok(self.batches.read().get(document).cloned())
    }

    async fn document_count(&self) -> anyhow::Result<usize> {
        Ok(self.batches.read().len())
    }
}
