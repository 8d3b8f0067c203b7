//! 组件存储内存实现。

use crate::error::StorageError;
use crate::models::{ComponentDetailRecord, ComponentRecord};
use crate::traits::ComponentStore;
use domain::{CommandStatus, ComponentKind};
use std::sync::RwLock;

/// 组件内存存储。
pub struct InMemoryComponentStore {
    components: RwLock<Vec<ComponentRecord>>,
    details: RwLock<Vec<ComponentDetailRecord>>,
}

impl InMemoryComponentStore {
    pub fn new() -> Self {
        Self {
            components: RwLock::new(Vec::new()),
            details: RwLock::new(Vec::new()),
        }
    }

    pub fn with_components(components: Vec<ComponentRecord>) -> Self {
        Self {
            components: RwLock::new(components),
            details: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryComponentStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ComponentStore for InMemoryComponentStore {
    async fn find_by_mac(
        &self,
        mac_addr: &str,
        kind: ComponentKind,
    ) -> Result<Option<ComponentRecord>, StorageError> {
        let components = self
            .components
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(components
            .iter()
            .find(|item| item.mac_addr == mac_addr && item.kind == kind)
            .cloned())
    }

    async fn find(&self, component_id: &str) -> Result<Option<ComponentRecord>, StorageError> {
        let components = self
            .components
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(components
            .iter()
            .find(|item| item.id == component_id)
            .cloned())
    }

    async fn find_detail(
        &self,
        component_id: &str,
    ) -> Result<Option<ComponentDetailRecord>, StorageError> {
        let details = self
            .details
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(details
            .iter()
            .find(|item| item.component_id == component_id)
            .cloned())
    }

    async fn save_detail(&self, record: ComponentDetailRecord) -> Result<(), StorageError> {
        let mut details = self
            .details
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if let Some(existing) = details
            .iter_mut()
            .find(|item| item.component_id == record.component_id)
        {
            *existing = record;
        } else {
            details.push(record);
        }
        Ok(())
    }

    async fn set_status(
        &self,
        component_id: &str,
        status: CommandStatus,
    ) -> Result<(), StorageError> {
        let mut details = self
            .details
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        for detail in details.iter_mut() {
            if detail.component_id == component_id {
                detail.status = status;
                return Ok(());
            }
        }
        Ok(())
    }
}
