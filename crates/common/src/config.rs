use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SystemConfig {
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub context: ContextConfig,
}

/// Which backend stores conversation transcripts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheBackend {
    Redis,
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    pub backend: CacheBackend,
    #[serde(default)]
    pub redis: RedisConfig,
    #[serde(default)]
    pub memory: MemoryConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    pub host: String,
    pub port: u16,
    /// Memory cap handed to the store at startup, e.g. "1024mb".
    pub max_memory: String,
    /// Eviction policy handed to the store at startup, e.g. "allkeys-lru".
    pub max_memory_policy: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Conversation count cap for the in-process backend.
    pub max_entries: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextConfig {
    /// Named tokenizer encoding, e.g. "cl100k_base".
    pub tokenizer_encoding: String,
    pub context_window_limit: usize,
    pub response_window_limit: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Redis,
            redis: RedisConfig::default(),
            memory: MemoryConfig::default(),
        }
    }
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 6379,
            max_memory: "1024mb".to_string(),
            max_memory_policy: "allkeys-lru".to_string(),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self { max_entries: 1000 }
    }
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            tokenizer_encoding: "cl100k_base".to_string(),
            context_window_limit: 2000,
            response_window_limit: 500,
        }
    }
}

impl RedisConfig {
    pub fn url(&self) -> String {
        format!("redis://{}:{}/", self.host, self.port)
    }
}

impl SystemConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path))?;
        let config: SystemConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Build configuration from environment variables over defaults.
    pub fn from_env() -> anyhow::Result<Self> {
        let mut config = SystemConfig::default();
        config.apply_env()?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay environment variables onto the current values.
    pub fn apply_env(&mut self) -> anyhow::Result<()> {
        if let Ok(backend) = env::var("CACHE_BACKEND") {
            self.cache.backend = match backend.as_str() {
                "redis" => CacheBackend::Redis,
                "memory" => CacheBackend::Memory,
                other => bail!("Unknown CACHE_BACKEND value: {}", other),
            };
        }
        if let Ok(host) = env::var("REDIS_CACHE_HOST") {
            self.cache.redis.host = host;
        }
        if let Ok(port) = env::var("REDIS_CACHE_PORT") {
            self.cache.redis.port = port
                .parse()
                .context("REDIS_CACHE_PORT must be a port number")?;
        }
        if let Ok(max_memory) = env::var("REDIS_CACHE_MAX_MEMORY") {
            self.cache.redis.max_memory = max_memory;
        }
        if let Ok(policy) = env::var("REDIS_CACHE_MAX_MEMORY_POLICY") {
            self.cache.redis.max_memory_policy = policy;
        }
        if let Ok(max_entries) = env::var("CACHE_MAX_ENTRIES") {
            self.cache.memory.max_entries = max_entries
                .parse()
                .context("CACHE_MAX_ENTRIES must be an integer")?;
        }
        if let Ok(encoding) = env::var("TOKENIZER_ENCODING") {
            self.context.tokenizer_encoding = encoding;
        }
        if let Ok(limit) = env::var("CONTEXT_WINDOW_LIMIT") {
            self.context.context_window_limit = limit
                .parse()
                .context("CONTEXT_WINDOW_LIMIT must be an integer")?;
        }
        if let Ok(limit) = env::var("RESPONSE_WINDOW_LIMIT") {
            self.context.response_window_limit = limit
                .parse()
                .context("RESPONSE_WINDOW_LIMIT must be an integer")?;
        }
        Ok(())
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.cache.memory.max_entries == 0 {
            bail!("cache.memory.max_entries must be at least 1");
        }
        if self.context.context_window_limit == 0 {
            bail!("context.context_window_limit must be at least 1");
        }
        if self.context.response_window_limit >= self.context.context_window_limit {
            bail!(
                "context.response_window_limit ({}) must be smaller than context_window_limit ({})",
                self.context.response_window_limit,
                self.context.context_window_limit
            );
        }
        Ok(())
    }
}
