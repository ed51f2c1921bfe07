use thiserror::Error;

/// Failures surfaced by the conversation cache.
///
/// "Key not found" is not represented here; a missing or evicted key is a
/// normal lookup result, not a failure.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Cache store rejected operation: {0}")]
    StoreRejected(String),
}

/// Failures surfaced by the context assembler.
#[derive(Error, Debug)]
pub enum ContextError {
    #[error("Tokenization error: {0}")]
    Tokenization(String),
}

pub type CacheResult<T> = std::result::Result<T, CacheError>;
pub type ContextResult<T> = std::result::Result<T, ContextError>;
