use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::Embedding;

pub type Metadata = Map<String, Value>;

/// Reference material retrieved into the prompt. Upserted by `id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextDocument {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(skip)]
    pub embedding: Embedding,
}

impl ContextDocument {
    pub fn new(content: impl Into<String>, embedding: Embedding) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            content: content.into(),
            metadata: Metadata::new(),
            embedding,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// The `source` metadata field, when it is a string.
    pub fn source(&self) -> Option<&str> {
        self.metadata.get("source").and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub document: ContextDocument,
    /// Cosine distance to the query; lower is closer.
    pub distance: f32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_reads_string_metadata() {
        let mut metadata = Metadata::new();
        metadata.insert("source".into(), json!("handbook.md"));
        let doc = ContextDocument::new("text", Embedding::default()).with_metadata(metadata);

        assert_eq!(doc.source(), Some("handbook.md"));
    }

    #[test]
    fn test_source_ignores_non_string_values() {
        let mut metadata = Metadata::new();
        metadata.insert("source".into(), json!(42));
        let doc = ContextDocument::new("text", Embedding::default()).with_metadata(metadata);

        assert_eq!(doc.source(), None);
    }

    #[test]
    fn test_new_documents_get_distinct_ids() {
        let a = ContextDocument::new("a", Embedding::default());
        let b = ContextDocument::new("b", Embedding::default());
        assert_ne!(a.id, b.id);
    }
}
