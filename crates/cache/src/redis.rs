use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::sync::Arc;
use tokio::sync::Mutex;

use async_trait::async_trait;
use qa_assist_common::config::RedisConfig;
use qa_assist_common::error::{CacheError, CacheResult};

use crate::key::conversation_key;
use crate::ConversationCache;

/// Redis-backed conversation cache.
///
/// The store's memory cap and eviction policy are applied once at connect
/// time; eviction afterwards is the store's business and shows up here only
/// as a `None` lookup result.
pub struct RedisConversationCache {
    connection: Arc<Mutex<MultiplexedConnection>>,
}

impl RedisConversationCache {
    /// Connect to Redis and apply the store-side memory settings.
    pub async fn connect(config: &RedisConfig) -> CacheResult<Self> {
        let url = config.url();
        let client = redis::Client::open(url.as_str()).map_err(map_store_error)?;

        let mut connection = client
            .get_multiplexed_async_connection()
            .await
            .map_err(map_store_error)?;

        redis::cmd("CONFIG")
            .arg("SET")
            .arg("maxmemory")
            .arg(&config.max_memory)
            .query_async::<String>(&mut connection)
            .await
            .map_err(map_store_error)?;
        redis::cmd("CONFIG")
            .arg("SET")
            .arg("maxmemory-policy")
            .arg(&config.max_memory_policy)
            .query_async::<String>(&mut connection)
            .await
            .map_err(map_store_error)?;

        tracing::info!(
            "Connected to Redis at {} (maxmemory={}, policy={})",
            url,
            config.max_memory,
            config.max_memory_policy
        );

        Ok(Self {
            connection: Arc::new(Mutex::new(connection)),
        })
    }
}

#[async_trait]
impl ConversationCache for RedisConversationCache {
    async fn get(&self, user_id: &str, conversation_id: &str) -> CacheResult<Option<String>> {
        let key = conversation_key(user_id, conversation_id);
        let mut conn = self.connection.lock().await;
        let value: Option<String> = conn.get(&key).await.map_err(map_store_error)?;
        Ok(value)
    }

    async fn insert_or_append(
        &self,
        user_id: &str,
        conversation_id: &str,
        value: &str,
    ) -> CacheResult<()> {
        let key = conversation_key(user_id, conversation_id);

        // The guard is held across the read and the write, so concurrent
        // appends to any key cannot interleave.
        let mut conn = self.connection.lock().await;
        let current: Option<String> = conn.get(&key).await.map_err(map_store_error)?;
        let next = match current {
            Some(existing) => {
                tracing::debug!("Appending to existing transcript for key {}", key);
                format!("{}\n{}", existing, value)
            }
            None => value.to_string(),
        };
        conn.set::<_, _, ()>(&key, next)
            .await
            .map_err(map_store_error)?;
        Ok(())
    }
}

fn map_store_error(err: redis::RedisError) -> CacheError {
    if err.is_io_error()
        || err.is_connection_refusal()
        || err.is_connection_dropped()
        || err.is_timeout()
    {
        CacheError::StoreUnavailable(err.to_string())
    } else {
        CacheError::StoreRejected(err.to_string())
    }
}
