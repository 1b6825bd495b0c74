use resume_assistant::api::{create_router, state::Components, AppState};
use resume_assistant::domain::ports::{ContextStore, ConversationStore, EmbeddingService};
use resume_assistant::infrastructure::config::{
    ContextBackend, ConversationBackend, EmbeddingProvider,
};
use resume_assistant::infrastructure::{
    create_pool, AppConfig, HashedEmbedding, InMemoryContextStore, InMemoryConversationStore,
    OpenRouterClient, PdfWriter, QdrantContextStore, RedisConversationStore, TextEmbedding,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=debug,resume_assistant=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::load()?;
    let cfg = &config.config;

    let embedding: Arc<dyn EmbeddingService> = match cfg.embedding.provider {
        EmbeddingProvider::Hashed => Arc::new(HashedEmbedding::new(cfg.embedding.dimension)),
        EmbeddingProvider::OpenAi => Arc::new(TextEmbedding::from_config(&cfg.embedding)?),
    };
    info!(provider = ?cfg.embedding.provider, dimension = cfg.embedding.dimension, "embedding provider ready");

    let mut redis = None;
    let conversations: Arc<dyn ConversationStore> = match cfg.storage.conversations {
        ConversationBackend::Memory => Arc::new(InMemoryConversationStore::new()),
        ConversationBackend::Redis => {
            let store = RedisConversationStore::new(create_pool(&cfg.storage.redis_url)?);
            info!("Redis pool initialized");
            redis = Some(store.clone());
            Arc::new(store)
        }
    };

    let context: Arc<dyn ContextStore> = match cfg.storage.context {
        ContextBackend::Memory => Arc::new(InMemoryContextStore::new()),
        ContextBackend::Qdrant => Arc::new(
            QdrantContextStore::new(
                &cfg.storage.qdrant_url,
                &cfg.storage.collection,
                cfg.embedding.dimension,
            )
            .await?,
        ),
    };

    let completion = OpenRouterClient::new(&cfg.llm, config.prompts.chat.not_configured.clone())?;
    if !completion.is_configured() {
        warn!("OPEN_ROUTER_API_KEY is not set; chat answers will report the missing configuration");
    }

    let addr = SocketAddr::new(cfg.server.host.parse()?, cfg.server.port);

    let mut state = AppState::new(
        config.clone(),
        Components {
            embedding,
            conversations,
            context,
            completion: Arc::new(completion),
            writer: Arc::new(PdfWriter::new()),
        },
    );
    if let Some(store) = redis {
        state = state.with_redis(store);
    }
    let app = create_router(state);

    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
