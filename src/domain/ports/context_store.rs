use crate::domain::{errors::DomainError, ContextDocument, Embedding, SearchResult};
use async_trait::async_trait;

#[async_trait]
pub trait ContextStore: Send + Sync {
    async fn upsert_document(&self, doc: &ContextDocument) -> Result<(), DomainError>;

    /// Results are ordered by ascending distance to `query`.
    async fn nearest_documents(
        &self,
        query: &Embedding,
        k: usize,
    ) -> Result<Vec<SearchResult>, DomainError>;
}
