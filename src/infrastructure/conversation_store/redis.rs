use async_trait::async_trait;
use chrono::Utc;
use deadpool_redis::redis::{cmd, AsyncCommands};
use deadpool_redis::{Config, Pool, Runtime};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::domain::{ports::ConversationStore, ChatTurn, DomainError, Embedding};

pub type RedisPool = Pool;

pub fn create_pool(redis_url: &str) -> Result<RedisPool, DomainError> {
    Config::from_url(redis_url)
        .create_pool(Some(Runtime::Tokio1))
        .map_err(|e| DomainError::storage(e.to_string()))
}

pub mod keys {
    pub fn turns(session_id: &str) -> String {
        format!("conversation:{session_id}")
    }

    pub fn sequence(session_id: &str) -> String {
        format!("conversation:{session_id}:seq")
    }
}

/// Stored form of a turn. `ChatTurn` leaves its embedding out of its own
/// serde output, so the vector is carried next to it here.
#[derive(Serialize, Deserialize)]
struct StoredTurn {
    #[serde(flatten)]
    turn: ChatTurn,
    #[serde(default)]
    embedding: Vec<f32>,
}

fn encode_turn(turn: &ChatTurn) -> Result<String, DomainError> {
    let stored = StoredTurn {
        turn: turn.clone(),
        embedding: turn.embedding.as_slice().to_vec(),
    };
    serde_json::to_string(&stored).map_err(|e| DomainError::storage(e.to_string()))
}

fn decode_turn(json: &str) -> Result<ChatTurn, DomainError> {
    let stored: StoredTurn =
        serde_json::from_str(json).map_err(|e| DomainError::storage(e.to_string()))?;
    let mut turn = stored.turn;
    turn.embedding = Embedding::new(stored.embedding);
    Ok(turn)
}

/// One Redis list per session; RPUSH order is chronological order.
#[derive(Clone)]
pub struct RedisConversationStore {
    pool: RedisPool,
}

impl RedisConversationStore {
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    async fn conn(&self) -> Result<deadpool_redis::Connection, DomainError> {
        self.pool
            .get()
            .await
            .map_err(|e| DomainError::storage(e.to_string()))
    }

    pub async fn ping(&self) -> Result<(), DomainError> {
        let mut conn = self.conn().await?;
        cmd("PING")
            .query_async::<String>(&mut *conn)
            .await
            .map(|_| ())
            .map_err(|e| DomainError::storage(e.to_string()))
    }
}

#[async_trait]
impl ConversationStore for RedisConversationStore {
    #[instrument(skip(self, turn), fields(session_id = %turn.session_id))]
    async fn save_turn(&self, mut turn: ChatTurn) -> Result<ChatTurn, DomainError> {
        let mut conn = self.conn().await?;

        turn.id = conn
            .incr::<_, _, i64>(keys::sequence(&turn.session_id), 1)
            .await
            .map_err(|e| DomainError::storage(e.to_string()))?;
        turn.created_at = Utc::now();

        let payload = encode_turn(&turn)?;
        conn.rpush::<_, _, ()>(keys::turns(&turn.session_id), payload)
            .await
            .map_err(|e| DomainError::storage(e.to_string()))?;

        Ok(turn)
    }

    #[instrument(skip(self))]
    async fn list_turns(&self, session_id: &str) -> Result<Vec<ChatTurn>, DomainError> {
        let mut conn = self.conn().await?;
        let raw: Vec<String> = conn
            .lrange(keys::turns(session_id), 0, -1)
            .await
            .map_err(|e| DomainError::storage(e.to_string()))?;

        raw.iter().map(|json| decode_turn(json)).collect()
    }
}
