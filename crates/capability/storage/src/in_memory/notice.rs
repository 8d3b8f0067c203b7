//! 告警记录内存实现。

use crate::error::StorageError;
use crate::models::NoticeRecord;
use crate::traits::NoticeStore;
use std::sync::RwLock;

/// 告警记录内存存储。
pub struct InMemoryNoticeStore {
    notices: RwLock<Vec<NoticeRecord>>,
}

impl InMemoryNoticeStore {
    pub fn new() -> Self {
        Self {
            notices: RwLock::new(Vec::new()),
        }
    }

    /// 当前记录条数（测试断言用）。
    pub fn len(&self) -> usize {
        self.notices.read().map(|n| n.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryNoticeStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl NoticeStore for InMemoryNoticeStore {
    async fn find(
        &self,
        project_id: &str,
        device: &str,
        metric: &str,
        cause: &str,
    ) -> Result<Option<NoticeRecord>, StorageError> {
        let notices = self
            .notices
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(notices
            .iter()
            .find(|item| {
                item.project_id == project_id
                    && item.device == device
                    && item.metric == metric
                    && item.cause == cause
            })
            .cloned())
    }

    async fn find_any_cause(
        &self,
        project_id: &str,
        device: &str,
        metric: &str,
    ) -> Result<Option<NoticeRecord>, StorageError> {
        let notices = self
            .notices
            .read()
            .map_err(|_| StorageError::new("lock failed"))?;
        Ok(notices
            .iter()
            .find(|item| {
                item.project_id == project_id && item.device == device && item.metric == metric
            })
            .cloned())
    }

    async fn save(&self, record: NoticeRecord) -> Result<(), StorageError> {
        let mut notices = self
            .notices
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        if notices.iter().any(|item| *item == record) {
            return Ok(());
        }
        notices.push(record);
        Ok(())
    }

    async fn delete(
        &self,
        project_id: &str,
        device: &str,
        metric: &str,
    ) -> Result<(), StorageError> {
        let mut notices = self
            .notices
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        notices.retain(|item| {
            !(item.project_id == project_id && item.device == device && item.metric == metric)
        });
        Ok(())
    }
}
