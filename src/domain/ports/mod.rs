mod completion;
mod context_store;
mod conversation_store;
mod document_writer;
mod embedding;

pub use completion::CompletionService;
pub use context_store::ContextStore;
pub use conversation_store::ConversationStore;
pub use document_writer::DocumentWriter;
pub use embedding::EmbeddingService;
