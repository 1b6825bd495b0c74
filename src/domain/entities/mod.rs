mod conversation;
mod document;
mod embedding;
mod resume;

pub use conversation::{ChatTurn, Completion, Message, MessageRole};
pub use document::{ContextDocument, Metadata, SearchResult};
pub use embedding::Embedding;
pub use resume::{BasicInfo, Education, Experience, Project, ResumeRecord, Skill};
