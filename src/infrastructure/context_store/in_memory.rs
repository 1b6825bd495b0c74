use async_trait::async_trait;
use std::sync::RwLock;

use crate::domain::{ports::ContextStore, ContextDocument, DomainError, Embedding, SearchResult};

/// Brute-force cosine scan. Readers share a snapshot under the read lock.
pub struct InMemoryContextStore {
    documents: RwLock<Vec<ContextDocument>>,
}

impl InMemoryContextStore {
    pub fn new() -> Self {
        Self {
            documents: RwLock::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.documents.read().map(|d| d.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryContextStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ContextStore for InMemoryContextStore {
    async fn upsert_document(&self, doc: &ContextDocument) -> Result<(), DomainError> {
        let mut store = self
            .documents
            .write()
            .map_err(|e| DomainError::storage(e.to_string()))?;

        match store.iter_mut().find(|d| d.id == doc.id) {
            Some(existing) => *existing = doc.clone(),
            None => store.push(doc.clone()),
        }
        Ok(())
    }

    async fn nearest_documents(
        &self,
        query: &Embedding,
        k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let store = self
            .documents
            .read()
            .map_err(|e| DomainError::storage(e.to_string()))?;

        let mut results: Vec<SearchResult> = store
            .iter()
            .map(|doc| SearchResult {
                distance: query.cosine_distance(&doc.embedding),
                document: doc.clone(),
            })
            .collect();

        // Stable: equal distances keep insertion order.
        results.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        results.truncate(k);

        Ok(results)
    }
}
