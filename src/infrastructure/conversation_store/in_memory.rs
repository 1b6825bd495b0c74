use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::domain::{ports::ConversationStore, ChatTurn, DomainError};

#[derive(Default)]
struct Sessions {
    turns: HashMap<String, Vec<ChatTurn>>,
    next_id: i64,
}

/// Process-local conversation history, lost on restart.
#[derive(Default)]
pub struct InMemoryConversationStore {
    inner: RwLock<Sessions>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn save_turn(&self, mut turn: ChatTurn) -> Result<ChatTurn, DomainError> {
        let mut inner = self
            .inner
            .write()
            .map_err(|e| DomainError::storage(e.to_string()))?;

        inner.next_id += 1;
        turn.id = inner.next_id;

        let session = inner.turns.entry(turn.session_id.clone()).or_default();
        // Keep created_at non-decreasing within a session even if the clock steps back.
        let now = Utc::now();
        turn.created_at = match session.last() {
            Some(last) if last.created_at > now => last.created_at,
            _ => now,
        };
        session.push(turn.clone());

        Ok(turn)
    }

    async fn list_turns(&self, session_id: &str) -> Result<Vec<ChatTurn>, DomainError> {
        let inner = self
            .inner
            .read()
            .map_err(|e| DomainError::storage(e.to_string()))?;

        Ok(inner.turns.get(session_id).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Embedding, MessageRole};

    #[tokio::test]
    async fn test_turns_listed_in_insertion_order() {
        let store = InMemoryConversationStore::new();
        for i in 0..5 {
            let turn = if i % 2 == 0 {
                ChatTurn::user("s", format!("q{i}"), Embedding::default())
            } else {
                ChatTurn::assistant("s", format!("a{i}"), Embedding::default())
            };
            store.save_turn(turn).await.unwrap();
        }

        let turns = store.list_turns("s").await.unwrap();
        let contents: Vec<&str> = turns.iter().map(|t| t.content.as_str()).collect();

        assert_eq!(contents, vec!["q0", "a1", "q2", "a3", "q4"]);
        assert_eq!(turns[1].role, MessageRole::Assistant);
        assert!(turns.windows(2).all(|w| w[0].created_at <= w[1].created_at));
        assert!(turns.windows(2).all(|w| w[0].id < w[1].id));
    }

    #[tokio::test]
    async fn test_save_assigns_id() {
        let store = InMemoryConversationStore::new();
        let saved = store
            .save_turn(ChatTurn::user("s", "hi", Embedding::new(vec![0.5])))
            .await
            .unwrap();

        assert!(saved.id > 0);
        assert_eq!(saved.embedding, Embedding::new(vec![0.5]));
    }

    #[tokio::test]
    async fn test_sessions_are_isolated() {
        let store = InMemoryConversationStore::new();
        store
            .save_turn(ChatTurn::user("a", "one", Embedding::default()))
            .await
            .unwrap();

        assert!(store.list_turns("b").await.unwrap().is_empty());
        assert_eq!(store.list_turns("a").await.unwrap().len(), 1);
    }
}
