//! Key-value cache port.
//!
//! The status service talks to its store through this narrow capability;
//! concurrency safety and timeouts are the client's own contract. Failures
//! are surfaced to the caller unmodified, never retried here.

use async_trait::async_trait;
use thiserror::Error;

pub mod memory;
pub mod resp;

pub use memory::MemoryCache;
pub use resp::RespCache;

/// Cache operation failures.
#[derive(Debug, Error)]
pub enum CacheError {
    /// The store is unreachable or reported an error.
    #[error("cache unavailable: {0}")]
    Unavailable(String),

    /// The store answered with something this client cannot parse.
    #[error("cache protocol error: {0}")]
    Protocol(String),
}

/// Opaque handle to a key-value store.
#[async_trait]
pub trait CacheClient: Send + Sync {
    /// Store `value` under `key`, last write wins.
    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;

    /// Fetch the value under `key`, `None` when absent.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
}
