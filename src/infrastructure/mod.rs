pub mod config;
pub mod context_store;
pub mod conversation_store;
pub mod embedding;
pub mod llm;
pub mod pdf;

pub use config::{AppConfig, Config, ConfigError, PromptsConfig};
pub use context_store::{InMemoryContextStore, QdrantContextStore};
pub use conversation_store::{
    create_pool, InMemoryConversationStore, RedisConversationStore, RedisPool,
};
pub use embedding::{HashedEmbedding, TextEmbedding};
pub use llm::OpenRouterClient;
pub use pdf::PdfWriter;
