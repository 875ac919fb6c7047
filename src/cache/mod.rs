//! Redis cache layer
//!
//! An explicit cache abstraction injected into the services that need it,
//! instead of static module state. `CacheManager` is the Redis-backed
//! production implementation; `NoOpCache` serves cache-less deployments
//! and batch contexts.

use crate::config::RedisConfig;
use crate::domain::StringUuid;
use crate::error::{AppError, Result};
use async_trait::async_trait;
use redis::{aio::ConnectionManager, AsyncCommands};
use std::time::Duration;

/// Cache key prefixes
mod keys {
    pub const CUSTOMER_CARDS: &str = "perks:customer_cards";
}

/// Key for a customer's card listing
pub fn customer_cards_key(customer_id: StringUuid) -> String {
    format!("{}:{}", keys::CUSTOMER_CARDS, customer_id)
}

/// Cache operations used by services
///
/// Values cross the boundary as JSON; callers serialize/deserialize their
/// own types around it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheOperations: Send + Sync {
    /// Get a JSON value from cache
    async fn get_json(&self, key: &str) -> Result<Option<serde_json::Value>>;

    /// Set a JSON value in cache with a TTL
    async fn set_json(&self, key: &str, value: &serde_json::Value, ttl: Duration) -> Result<()>;

    /// Remove a key from cache
    async fn invalidate(&self, key: &str) -> Result<()>;

    /// Check cache health
    async fn ping(&self) -> Result<()>;
}

/// Cache manager for Redis operations
#[derive(Clone)]
pub struct CacheManager {
    conn: ConnectionManager,
}

impl CacheManager {
    /// Create a new cache manager
    pub async fn new(config: &RedisConfig) -> Result<Self> {
        let client = redis::Client::open(config.url.as_str()).map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to create Redis client: {}", e))
        })?;

        let conn = ConnectionManager::new(client).await.map_err(|e| {
            AppError::Internal(anyhow::anyhow!("Failed to connect to Redis: {}", e))
        })?;

        Ok(Self { conn })
    }
}

#[async_trait]
impl CacheOperations for CacheManager {
    async fn get_json(&self, key: &str) -> Result<Option<serde_json::Value>> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;

        match value {
            Some(v) => {
                let parsed = serde_json::from_str(&v).map_err(|e| {
                    AppError::Internal(anyhow::anyhow!("Cache deserialize error: {}", e))
                })?;
                Ok(Some(parsed))
            }
            None => Ok(None),
        }
    }

    async fn set_json(&self, key: &str, value: &serde_json::Value, ttl: Duration) -> Result<()> {
        let mut conn = self.conn.clone();
        let serialized = serde_json::to_string(value)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Cache serialize error: {}", e)))?;

        let _: () = conn.set_ex(key, serialized, ttl.as_secs()).await?;
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: () = conn.del(key).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn.clone();
        let _: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }
}

/// Cache selected at startup: Redis-backed when configured, no-op otherwise
#[derive(Clone)]
pub enum AppCache {
    Redis(CacheManager),
    NoOp(NoOpCache),
}

#[async_trait]
impl CacheOperations for AppCache {
    async fn get_json(&self, key: &str) -> Result<Option<serde_json::Value>> {
        match self {
            Self::Redis(cache) => cache.get_json(key).await,
            Self::NoOp(cache) => cache.get_json(key).await,
        }
    }

    async fn set_json(&self, key: &str, value: &serde_json::Value, ttl: Duration) -> Result<()> {
        match self {
            Self::Redis(cache) => cache.set_json(key, value, ttl).await,
            Self::NoOp(cache) => cache.set_json(key, value, ttl).await,
        }
    }

    async fn invalidate(&self, key: &str) -> Result<()> {
        match self {
            Self::Redis(cache) => cache.invalidate(key).await,
            Self::NoOp(cache) => cache.invalidate(key).await,
        }
    }

    async fn ping(&self) -> Result<()> {
        match self {
            Self::Redis(cache) => cache.ping().await,
            Self::NoOp(cache) => cache.ping().await,
        }
    }
}

/// No-op cache for deployments without Redis
#[derive(Debug, Clone, Default)]
pub struct NoOpCache;

#[async_trait]
impl CacheOperations for NoOpCache {
    async fn get_json(&self, _key: &str) -> Result<Option<serde_json::Value>> {
        Ok(None)
    }

    async fn set_json(&self, _key: &str, _value: &serde_json::Value, _ttl: Duration) -> Result<()> {
        Ok(())
    }

    async fn invalidate(&self, _key: &str) -> Result<()> {
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_customer_cards_key_format() {
        let customer_id = StringUuid::parse_str("550e8400-e29b-41d4-a716-446655440000").unwrap();
        assert_eq!(
            customer_cards_key(customer_id),
            "perks:customer_cards:550e8400-e29b-41d4-a716-446655440000"
        );
    }

    #[tokio::test]
    async fn test_noop_cache_get_misses() {
        let cache = NoOpCache;
        let result = cache.get_json("any-key").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_noop_cache_set_and_invalidate_succeed() {
        let cache = NoOpCache;
        cache
            .set_json("k", &serde_json::json!({"a": 1}), Duration::from_secs(60))
            .await
            .unwrap();
        cache.invalidate("k").await.unwrap();
        cache.ping().await.unwrap();
    }
}
