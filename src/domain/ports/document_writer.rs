use crate::domain::{errors::DomainError, layout::PageLayout};

/// Turns a composed layout into a binary document.
pub trait DocumentWriter: Send + Sync {
    fn write(&self, layout: &PageLayout) -> Result<Vec<u8>, DomainError>;

    fn content_type(&self) -> &'static str;
}
