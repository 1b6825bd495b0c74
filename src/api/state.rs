use std::sync::Arc;

use crate::application::{QueryPipeline, RagService, ResumeService};
use crate::domain::ports::{
    CompletionService, ContextStore, ConversationStore, DocumentWriter, EmbeddingService,
};
use crate::infrastructure::{AppConfig, RedisConversationStore};

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<QueryPipeline>,
    pub rag: Arc<RagService>,
    pub resume: Arc<ResumeService>,
    pub config: Arc<AppConfig>,
    /// Present when conversations live in Redis; used by the readiness probe.
    pub redis: Option<RedisConversationStore>,
}

/// Concrete adapters chosen by the binary.
pub struct Components {
    pub embedding: Arc<dyn EmbeddingService>,
    pub conversations: Arc<dyn ConversationStore>,
    pub context: Arc<dyn ContextStore>,
    pub completion: Arc<dyn CompletionService>,
    pub writer: Arc<dyn DocumentWriter>,
}

impl AppState {
    pub fn new(config: AppConfig, components: Components) -> Self {
        let Components {
            embedding,
            conversations,
            context,
            completion,
            writer,
        } = components;

        let rag = Arc::new(RagService::new(
            embedding.clone(),
            context,
            config.config.rag.top_k,
        ));
        let pipeline = Arc::new(QueryPipeline::new(
            embedding,
            conversations.clone(),
            rag.clone(),
            completion,
            config.pipeline_settings(),
        ));
        let resume = Arc::new(ResumeService::new(
            pipeline.clone(),
            conversations,
            writer,
            config.resume_settings(),
        ));

        Self {
            pipeline,
            rag,
            resume,
            config: Arc::new(config),
            redis: None,
        }
    }

    pub fn with_redis(mut self, store: RedisConversationStore) -> Self {
        self.redis = Some(store);
        self
    }
}
