use crate::domain::{errors::DomainError, ChatTurn};
use async_trait::async_trait;

#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Persists a turn and returns it with its assigned id and timestamp.
    async fn save_turn(&self, turn: ChatTurn) -> Result<ChatTurn, DomainError>;

    /// All turns of a session in chronological order.
    async fn list_turns(&self, session_id: &str) -> Result<Vec<ChatTurn>, DomainError>;
}
