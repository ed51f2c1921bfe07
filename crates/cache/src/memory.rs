use lru::LruCache;
use std::num::NonZeroUsize;
use tokio::sync::Mutex;

use async_trait::async_trait;
use qa_assist_common::error::CacheResult;

use crate::key::conversation_key;
use crate::ConversationCache;

/// In-process conversation cache bounded by conversation count.
///
/// Mirrors the external store's `allkeys-lru` behavior: once the capacity
/// is reached, the least-recently-used conversation is evicted and later
/// lookups for it return `None`. Reads refresh recency, as they do under
/// the store's LRU policy.
pub struct InMemoryConversationCache {
    entries: Mutex<LruCache<String, String>>,
}

impl InMemoryConversationCache {
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
        }
    }
}

#[async_trait]
impl ConversationCache for InMemoryConversationCache {
    async fn get(&self, user_id: &str, conversation_id: &str) -> CacheResult<Option<String>> {
        let key = conversation_key(user_id, conversation_id);
        let mut entries = self.entries.lock().await;
        Ok(entries.get(&key).cloned())
    }

    async fn insert_or_append(
        &self,
        user_id: &str,
        conversation_id: &str,
        value: &str,
    ) -> CacheResult<()> {
        let key = conversation_key(user_id, conversation_id);

        // Same discipline as the redis backend: the guard spans the read
        // and the write, so concurrent appends cannot interleave.
        let mut entries = self.entries.lock().await;
        let next = match entries.get(&key) {
            Some(existing) => format!("{}\n{}", existing, value),
            None => value.to_string(),
        };
        entries.put(key, next);
        Ok(())
    }
}
