use async_trait::async_trait;
use rig::client::{EmbeddingsClient, ProviderClient};
use rig::embeddings::EmbeddingsBuilder;
use rig::providers::openai;
use tracing::{instrument, warn};

use crate::domain::{ports::EmbeddingService, DomainError, Embedding};
use crate::infrastructure::config::{ConfigError, EmbeddingConfig};

const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// OpenAI embeddings through rig. The client reads `OPENAI_API_KEY`.
pub struct TextEmbedding {
    model: String,
    dimension: usize,
}

impl TextEmbedding {
    pub fn from_config(config: &EmbeddingConfig) -> Result<Self, ConfigError> {
        require_api_key(std::env::var(API_KEY_VAR).ok().as_deref())?;

        Ok(Self {
            model: config.model.clone(),
            dimension: config.dimension,
        })
    }

    fn to_embedding(&self, values: Vec<f64>) -> Embedding {
        if values.len() != self.dimension {
            warn!(
                expected = self.dimension,
                actual = values.len(),
                "embedding dimension mismatch"
            );
        }
        Embedding::new(values.into_iter().map(|x| x as f32).collect())
    }
}

fn require_api_key(value: Option<&str>) -> Result<(), ConfigError> {
    match value {
        Some(key) if !key.trim().is_empty() => Ok(()),
        _ => Err(ConfigError::MissingEnv {
            var: API_KEY_VAR,
            feature: "openai embedding provider",
        }),
    }
}

#[async_trait]
impl EmbeddingService for TextEmbedding {
    #[instrument(skip(self, text), fields(model = %self.model))]
    async fn embed(&self, text: &str) -> Result<Embedding, DomainError> {
        self.embed_batch(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::upstream("no embedding returned"))
    }

    #[instrument(skip(self, texts), fields(model = %self.model, count = texts.len()))]
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Embedding>, DomainError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let client = openai::Client::from_env();
        let model = client.embedding_model(&self.model);

        let mut builder = EmbeddingsBuilder::new(model);
        for text in texts {
            builder = builder
                .document(*text)
                .map_err(|e| DomainError::upstream(e.to_string()))?;
        }

        let embeddings = builder
            .build()
            .await
            .map_err(|e| DomainError::upstream(e.to_string()))?;

        Ok(embeddings
            .into_iter()
            .map(|(_doc, emb)| self.to_embedding(emb.first().vec))
            .collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
