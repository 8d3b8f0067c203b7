//! 设备存储内存实现。

use crate::error::StorageError;
use crate::models::ThingRecord;
use crate::traits::ThingStore;
use std::sync::RwLock;

/// 设备内存存储。
pub struct InMemoryThingStore {
    things: RwLock<Vec<ThingRecord>>,
}

impl InMemoryThingStore {
    pub fn new() -> Self {
        Self {
            things: RwLock::new(Vec::new()),
        }
    }

    /// 预置设备记录（测试用）。
    pub fn with_things(things: Vec<ThingRecord>) -> Self {
        Self {
            things: RwLock::new(things),
        }
    }
}

impl Default for InMemoryThingStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ThingStore for InMemoryThingStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<ThingRecord>, StorageError> {
        let things = self
            .things
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(things.iter().find(|item| item.name == name).cloned())
    }

    async fn list_online(&self) -> Result<Vec<ThingRecord>, StorageError> {
        let things = self
            .things
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(things.iter().filter(|item| item.online).cloned().collect())
    }

    async fn update_status(&self, id: &str, online: bool) -> Result<(), StorageError> {
        let mut things = self
            .things
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        for thing in things.iter_mut() {
            if thing.id == id {
                thing.online = online;
                return Ok(());
            }
        }
        Ok(())
    }
}
