mod in_memory;
mod qdrant;

pub use in_memory::InMemoryContextStore;
pub use qdrant::QdrantContextStore;
