//! In-process cache client.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;

use crate::cache::{CacheClient, CacheError};

/// A thread-safe in-process cache, for tests and single-node development.
///
/// Cloning is cheap; clones share the same map.
#[derive(Clone, Default)]
pub struct MemoryCache {
    inner: Arc<DashMap<String, String>>,
}

impl MemoryCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[async_trait]
impl CacheClient for MemoryCache {
    async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.inner.insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.inner.get(key).map(|entry| entry.value().clone()))
    }
}
