//! 阈值存储内存实现。

use crate::error::StorageError;
use crate::models::ThresholdRecord;
use crate::traits::ThresholdStore;
use domain::Threshold;
use std::sync::RwLock;

/// 阈值内存存储。
pub struct InMemoryThresholdStore {
    records: RwLock<Vec<ThresholdRecord>>,
}

impl InMemoryThresholdStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
        }
    }

    pub fn insert(&self, record: ThresholdRecord) {
        if let Ok(mut records) = self.records.write() {
            records.retain(|item| {
                !(item.project_id == record.project_id && item.device == record.device)
            });
            records.push(record);
        }
    }
}

impl Default for InMemoryThresholdStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl ThresholdStore for InMemoryThresholdStore {
    async fn find(
        &self,
        project_id: &str,
        device: &str,
    ) -> Result<Option<Threshold>, StorageError> {
        let records = self
            .records
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(records
            .iter()
            .find(|item| item.project_id == project_id && item.device == device)
            .map(|item| item.threshold))
    }
}
