use std::sync::Arc;
use tracing::instrument;

use crate::domain::{
    ports::{ContextStore, EmbeddingService},
    ContextDocument, DomainError, Embedding, Metadata, SearchResult,
};

pub struct RagService {
    embedding: Arc<dyn EmbeddingService>,
    context_store: Arc<dyn ContextStore>,
    default_top_k: usize,
}

impl RagService {
    pub fn new(
        embedding: Arc<dyn EmbeddingService>,
        context_store: Arc<dyn ContextStore>,
        default_top_k: usize,
    ) -> Self {
        Self {
            embedding,
            context_store,
            default_top_k,
        }
    }

    pub fn default_top_k(&self) -> usize {
        self.default_top_k
    }

    #[instrument(skip(self))]
    pub async fn retrieve_top_k(
        &self,
        query: &str,
        top_k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        let embedding = self.embedding.embed(query).await?;
        self.context_store.nearest_documents(&embedding, top_k).await
    }

    /// Retrieval for a query that has already been embedded.
    #[instrument(skip(self, embedding), fields(dimension = embedding.dimension()))]
    pub async fn retrieve_for(
        &self,
        embedding: &Embedding,
    ) -> Result<Vec<SearchResult>, DomainError> {
        self.context_store
            .nearest_documents(embedding, self.default_top_k)
            .await
    }

    #[instrument(skip(self, content, metadata), fields(content_len = content.len()))]
    pub async fn index_document(
        &self,
        content: &str,
        metadata: Metadata,
    ) -> Result<ContextDocument, DomainError> {
        if content.trim().is_empty() {
            return Err(DomainError::validation("content is required"));
        }

        let embedding = self.embedding.embed(content).await?;
        let document = ContextDocument::new(content, embedding).with_metadata(metadata);
        self.context_store.upsert_document(&document).await?;
        Ok(document)
    }
}
