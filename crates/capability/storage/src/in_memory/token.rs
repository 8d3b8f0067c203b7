//! 推送令牌内存实现。

use crate::error::StorageError;
use crate::models::DeviceTokenRecord;
use crate::traits::DeviceTokenStore;
use std::sync::RwLock;

/// 推送令牌内存存储。
pub struct InMemoryDeviceTokenStore {
    tokens: RwLock<Vec<DeviceTokenRecord>>,
}

impl InMemoryDeviceTokenStore {
    pub fn new() -> Self {
        Self {
            tokens: RwLock::new(Vec::new()),
        }
    }

    pub fn with_tokens(tokens: Vec<DeviceTokenRecord>) -> Self {
        Self {
            tokens: RwLock::new(tokens),
        }
    }
}

impl Default for InMemoryDeviceTokenStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DeviceTokenStore for InMemoryDeviceTokenStore {
    async fn list_tokens(&self, project_id: &str) -> Result<Vec<String>, StorageError> {
        let tokens = self
            .tokens
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(tokens
            .iter()
            .filter(|item| item.project_id == project_id)
            .map(|item| item.device_token.clone())
            .collect())
    }
}
