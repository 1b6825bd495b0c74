use crate::domain::{errors::DomainError, Message};
use async_trait::async_trait;

#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Returns the text of the first completion choice.
    async fn complete(&self, messages: &[Message]) -> Result<String, DomainError>;
}
