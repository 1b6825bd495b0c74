mod in_memory;
mod redis;

pub use in_memory::InMemoryConversationStore;
pub use redis::{create_pool, RedisConversationStore, RedisPool};
