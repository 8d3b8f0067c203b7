//! TTL 缓存能力。
//!
//! 流水线里的四类易失状态都走这一层：
//! - 会话游标（5 分钟滑动过期，丢失等价于新会话）
//! - 告警去重标记（24 小时）
//! - 设备在线信号（5 分钟）
//! - 停止命令抑制标记（1 分钟）
//!
//! 缓存实例由装配层显式构造并注入，不使用进程级全局状态；
//! 多实例部署需使用 Redis 实现以保证去重正确性。

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

pub mod keys;
mod redis_cache;

pub use redis_cache::RedisTtlCache;

/// 缓存错误。
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("backend error: {0}")]
    Backend(String),
}

/// TTL 缓存接口。
///
/// 所有操作都是有界 I/O；调用方把错误当作"未命中"处理并记日志，
/// 缓存故障绝不阻塞流水线。
#[async_trait]
pub trait TtlCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError>;

    /// 只刷新过期时间，不改变值；键不存在时为空操作。
    async fn touch(&self, key: &str, ttl: Duration) -> Result<(), CacheError>;

    async fn del(&self, key: &str) -> Result<(), CacheError>;
}

/// 内存 TTL 缓存（单实例部署与测试）。
pub struct InMemoryTtlCache {
    entries: RwLock<HashMap<String, (String, Instant)>>,
}

impl InMemoryTtlCache {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryTtlCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TtlCache for InMemoryTtlCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let now = Instant::now();
        {
            let entries = self
                .entries
                .read()
                .map_err(|_| CacheError::Backend("lock failed".to_string()))?;
            match entries.get(key) {
                Some((value, deadline)) if *deadline > now => return Ok(Some(value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }
        // 过期条目在读路径上惰性清除
        let mut entries = self
            .entries
            .write()
            .map_err(|_| CacheError::Backend("lock failed".to_string()))?;
        if let Some((_, deadline)) = entries.get(key) {
            if *deadline <= now {
                entries.remove(key);
            }
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| CacheError::Backend("lock failed".to_string()))?;
        entries.insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }

    async fn touch(&self, key: &str, ttl: Duration) -> Result<(), CacheError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| CacheError::Backend("lock failed".to_string()))?;
        if let Some(entry) = entries.get_mut(key) {
            entry.1 = Instant::now() + ttl;
        }
        Ok(())
    }

    async fn del(&self, key: &str) -> Result<(), CacheError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|_| CacheError::Backend("lock failed".to_string()))?;
        entries.remove(key);
        Ok(())
    }
}

/// 默认 TTL 常量。
pub mod ttl {
    use std::time::Duration;

    /// 会话游标滑动过期。
    pub const SESSION: Duration = Duration::from_secs(5 * 60);
    /// 设备在线信号。
    pub const LIVENESS: Duration = Duration::from_secs(5 * 60);
    /// 告警去重标记。
    pub const NOTICE: Duration = Duration::from_secs(24 * 60 * 60);
    /// 停止命令抑制标记。
    pub const STOP_SUPPRESS: Duration = Duration::from_secs(60);
}
