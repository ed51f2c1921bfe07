//! Conversation transcript cache, addressed by (user, conversation).

pub mod key;
pub mod memory;
pub mod redis;

use std::sync::Arc;

use async_trait::async_trait;
use qa_assist_common::config::{CacheBackend, CacheConfig};
use qa_assist_common::error::CacheResult;
use tokio::sync::OnceCell;

pub use self::memory::InMemoryConversationCache;
pub use self::redis::RedisConversationCache;

/// Store of per-(user, conversation) transcripts.
///
/// A missing or evicted key is a normal `Ok(None)` lookup result, never an
/// error. `insert_or_append` serializes its read-modify-write across all
/// callers of one backend instance; callers must tolerate blocking.
#[async_trait]
pub trait ConversationCache: Send + Sync {
    /// Return the stored transcript for the given conversation.
    async fn get(&self, user_id: &str, conversation_id: &str) -> CacheResult<Option<String>>;

    /// Append a turn to the transcript, creating it on first write.
    ///
    /// An existing transcript becomes `current + "\n" + value`; a first
    /// write stores `value` as-is.
    async fn insert_or_append(
        &self,
        user_id: &str,
        conversation_id: &str,
        value: &str,
    ) -> CacheResult<()>;
}

static CONVERSATION_CACHE: OnceCell<Arc<dyn ConversationCache>> = OnceCell::const_new();

/// Build the cache backend selected by configuration.
pub async fn build_cache(config: &CacheConfig) -> CacheResult<Arc<dyn ConversationCache>> {
    match config.backend {
        CacheBackend::Redis => {
            let cache = RedisConversationCache::connect(&config.redis).await?;
            Ok(Arc::new(cache))
        }
        CacheBackend::Memory => Ok(Arc::new(InMemoryConversationCache::new(
            config.memory.max_entries,
        ))),
    }
}

/// Process-wide cache handle.
///
/// The first caller constructs the configured backend; every later caller
/// receives the same instance. Construction is serialized, so concurrent
/// first use cannot double-initialize the store connection. Configuration
/// is consumed on first use only and is fixed for the process lifetime.
pub async fn conversation_cache(config: &CacheConfig) -> CacheResult<Arc<dyn ConversationCache>> {
    let cache = CONVERSATION_CACHE
        .get_or_try_init(|| build_cache(config))
        .await?;
    Ok(Arc::clone(cache))
}
