//! Redis TTL 缓存实现。

use crate::{CacheError, TtlCache};
use async_trait::async_trait;
use redis::AsyncCommands;
use std::time::Duration;

/// Redis 缓存（多实例部署时的共享后端）。
pub struct RedisTtlCache {
    client: redis::Client,
}

impl RedisTtlCache {
    pub fn connect(redis_url: &str) -> Result<Self, CacheError> {
        let client =
            redis::Client::open(redis_url).map_err(|err| CacheError::Backend(err.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl TtlCache for RedisTtlCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|err| CacheError::Backend(err.to_string()))?;
        let value: Option<String> = conn
            .get(key)
            .await
            .map_err(|err| CacheError::Backend(err.to_string()))?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|err| CacheError::Backend(err.to_string()))?;
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, seconds)
            .await
            .map_err(|err| CacheError::Backend(err.to_string()))?;
        Ok(())
    }

    async fn touch(&self, key: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|err| CacheError::Backend(err.to_string()))?;
        let seconds = ttl.as_secs().max(1) as i64;
        conn.expire::<_, ()>(key, seconds)
            .await
            .map_err(|err| CacheError::Backend(err.to_string()))?;
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|err| CacheError::Backend(err.to_string()))?;
        conn.del::<_, ()>(key)
            .await
            .map_err(|err| CacheError::Backend(err.to_string()))?;
        Ok(())
    }
}
