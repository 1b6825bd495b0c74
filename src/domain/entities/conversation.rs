use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Embedding;

/// A persisted chat turn. `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub id: i64,
    pub session_id: String,
    pub role: MessageRole,
    pub content: String,
    #[serde(skip)]
    pub embedding: Embedding,
    pub created_at: DateTime<Utc>,
}

impl ChatTurn {
    pub fn new(
        session_id: impl Into<String>,
        role: MessageRole,
        content: impl Into<String>,
        embedding: Embedding,
    ) -> Self {
        Self {
            id: 0,
            session_id: session_id.into(),
            role,
            content: content.into(),
            embedding,
            created_at: Utc::now(),
        }
    }

    pub fn user(session_id: impl Into<String>, content: impl Into<String>, embedding: Embedding) -> Self {
        Self::new(session_id, MessageRole::User, content, embedding)
    }

    pub fn assistant(
        session_id: impl Into<String>,
        content: impl Into<String>,
        embedding: Embedding,
    ) -> Self {
        Self::new(session_id, MessageRole::Assistant, content, embedding)
    }

    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }
}

/// A role-tagged message handed to the completion provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }
}

impl From<&ChatTurn> for Message {
    fn from(turn: &ChatTurn) -> Self {
        Self::new(turn.role, turn.content.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::System => "system",
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

/// The answer to one user turn. Not persisted itself.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Completion {
    pub answer: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Completion {
    pub fn new(answer: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            answer: answer.into(),
            sources,
            created_at: Utc::now(),
        }
    }
}
