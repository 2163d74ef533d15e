//! Cache round-trip status probe.
//!
//! Writes a timestamped message under a fixed key and reads it straight
//! back, so a healthy response proves the full path through the external
//! store, not just local formatting.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::cache::{CacheClient, CacheError};

/// Fixed key the probe writes under. Last write wins.
pub const STATUS_KEY: &str = "myMessage";

/// Write `"Hello World <epoch-millis>!\n"` under [`STATUS_KEY`], re-read
/// it, and return the *stored* string. Failures from the cache client
/// propagate unmodified; there is no retry.
pub async fn probe(cache: &dyn CacheClient) -> Result<String, CacheError> {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis();
    let value = format!("Hello World {now_ms}!\n");

    cache.set(STATUS_KEY, &value).await?;
    match cache.get(STATUS_KEY).await? {
        Some(stored) => Ok(stored),
        None => Err(CacheError::Unavailable(format!(
            "key {STATUS_KEY:?} missing right after write"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoryCache;
    use async_trait::async_trait;

    struct DownCache;

    #[async_trait]
    impl CacheClient for DownCache {
        async fn set(&self, _key: &str, _value: &str) -> Result<(), CacheError> {
            Err(CacheError::Unavailable("store is down".into()))
        }

        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Unavailable("store is down".into()))
        }
    }

    struct ForgetfulCache(MemoryCache);

    #[async_trait]
    impl CacheClient for ForgetfulCache {
        async fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
            self.0.set(key, value).await
        }

        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_probe_message_shape() {
        let cache = MemoryCache::new();
        let message = probe(&cache).await.unwrap();
        assert!(message.starts_with("Hello World "));
        assert!(message.ends_with("!\n"));

        // The returned string is the one the store handed back.
        assert_eq!(cache.get(STATUS_KEY).await.unwrap(), Some(message));
    }

    #[tokio::test]
    async fn test_probe_embeds_epoch_millis() {
        let cache = MemoryCache::new();
        let message = probe(&cache).await.unwrap();
        let digits = message
            .trim_start_matches("Hello World ")
            .trim_end_matches("!\n");
        let millis: u128 = digits.parse().expect("timestamp should be numeric");
        assert!(millis > 0);
    }

    #[tokio::test]
    async fn test_probe_propagates_unavailable() {
        let err = probe(&DownCache).await.unwrap_err();
        assert!(matches!(err, CacheError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_probe_rejects_vanished_write() {
        let cache = ForgetfulCache(MemoryCache::new());
        let err = probe(&cache).await.unwrap_err();
        assert!(err.to_string().contains(STATUS_KEY));
    }
}
