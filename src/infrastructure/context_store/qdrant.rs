use async_trait::async_trait;
use qdrant_client::qdrant::{
    CreateCollectionBuilder, Distance, PointStruct, SearchPointsBuilder, UpsertPointsBuilder,
    VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant};
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::{
    ports::ContextStore, ContextDocument, DomainError, Embedding, Metadata, SearchResult,
};

/// Context documents in a Qdrant collection with cosine distance.
///
/// Qdrant point ids must be integers or UUIDs, so document ids that are not
/// UUIDs are mapped to a name-based UUID; the original id travels in the payload.
pub struct QdrantContextStore {
    client: Qdrant,
    collection: String,
    dimension: usize,
}

impl QdrantContextStore {
    pub async fn new(url: &str, collection: &str, dimension: usize) -> Result<Self, DomainError> {
        let client = Qdrant::from_url(url)
            .build()
            .map_err(|e| DomainError::storage(e.to_string()))?;

        let store = Self {
            client,
            collection: collection.to_string(),
            dimension,
        };

        store.ensure_collection().await?;

        Ok(store)
    }

    async fn ensure_collection(&self) -> Result<(), DomainError> {
        let collections = self
            .client
            .list_collections()
            .await
            .map_err(|e| DomainError::storage(e.to_string()))?;

        let exists = collections
            .collections
            .iter()
            .any(|c| c.name == self.collection);

        if !exists {
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.collection).vectors_config(
                        VectorParamsBuilder::new(self.dimension as u64, Distance::Cosine),
                    ),
                )
                .await
                .map_err(|e| DomainError::storage(e.to_string()))?;
            info!(collection = %self.collection, dimension = self.dimension, "created collection");
        }

        Ok(())
    }
}

fn point_id(document_id: &str) -> String {
    match Uuid::parse_str(document_id) {
        Ok(id) => id.to_string(),
        Err(_) => Uuid::new_v5(&Uuid::NAMESPACE_OID, document_id.as_bytes()).to_string(),
    }
}

fn to_payload(doc: &ContextDocument) -> Result<Payload, DomainError> {
    let metadata = serde_json::to_string(&doc.metadata)
        .map_err(|e| DomainError::storage(e.to_string()))?;

    serde_json::json!({
        "doc_id": doc.id,
        "content": doc.content,
        "metadata": metadata,
    })
    .try_into()
    .map_err(|_| DomainError::storage("failed to build point payload"))
}

#[async_trait]
impl ContextStore for QdrantContextStore {
    #[instrument(skip(self, doc), fields(doc_id = %doc.id))]
    async fn upsert_document(&self, doc: &ContextDocument) -> Result<(), DomainError> {
        let point = PointStruct::new(
            point_id(&doc.id),
            doc.embedding.as_slice().to_vec(),
            to_payload(doc)?,
        );

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.collection, vec![point]).wait(true))
            .await
            .map_err(|e| DomainError::storage(e.to_string()))?;

        Ok(())
    }

    #[instrument(skip(self, query))]
    async fn nearest_documents(
        &self,
        query: &Embedding,
        k: usize,
    ) -> Result<Vec<SearchResult>, DomainError> {
        if query.dimension() != self.dimension {
            warn!(
                expected = self.dimension,
                actual = query.dimension(),
                "query dimension mismatch, skipping search"
            );
            return Ok(Vec::new());
        }

        let response = self
            .client
            .search_points(
                SearchPointsBuilder::new(&self.collection, query.as_slice().to_vec(), k as u64)
                    .with_payload(true),
            )
            .await
            .map_err(|e| DomainError::storage(e.to_string()))?;

        let results = response
            .result
            .into_iter()
            .filter_map(|point| {
                let payload = point.payload;

                let id = payload.get("doc_id")?.as_str()?.to_string();
                let content = payload.get("content")?.as_str()?.to_string();
                let metadata: Metadata = payload
                    .get("metadata")
                    .and_then(|m| m.as_str())
                    .and_then(|m| serde_json::from_str(m).ok())
                    .unwrap_or_default();

                Some(SearchResult {
                    document: ContextDocument::new(content, Embedding::default())
                        .with_id(id)
                        .with_metadata(metadata),
                    distance: 1.0 - point.score,
                })
            })
            .collect();

        Ok(results)
    }
}
