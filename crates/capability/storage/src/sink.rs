//! 时序写入接口与内存实现。

use crate::error::StorageError;
use async_trait::async_trait;
use domain::SensorRecord;
use std::sync::RwLock;

/// 时序库接口：只追加，按记录类别分表，批量写入。
///
/// 写入失败视为瞬态故障：调用方记日志后放弃本批，
/// 不做显式重试（下一批报文自然覆盖）。
#[async_trait]
pub trait MetricSink: Send + Sync {
    async fn append_sensor(&self, records: &[SensorRecord]) -> Result<(), StorageError>;

    async fn append_broadcast(&self, records: &[SensorRecord]) -> Result<(), StorageError>;
}

/// 内存时序实现（用于测试与单机演示）。
pub struct InMemoryMetricSink {
    sensor: RwLock<Vec<SensorRecord>>,
    broadcast: RwLock<Vec<SensorRecord>>,
}

impl InMemoryMetricSink {
    pub fn new() -> Self {
        Self {
            sensor: RwLock::new(Vec::new()),
            broadcast: RwLock::new(Vec::new()),
        }
    }

    pub fn sensor_records(&self) -> Vec<SensorRecord> {
        self.sensor.read().map(|r| r.clone()).unwrap_or_default()
    }

    pub fn broadcast_records(&self) -> Vec<SensorRecord> {
        self.broadcast.read().map(|r| r.clone()).unwrap_or_default()
    }
}

impl Default for InMemoryMetricSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetricSink for InMemoryMetricSink {
    async fn append_sensor(&self, records: &[SensorRecord]) -> Result<(), StorageError> {
        if records.is_empty() {
            return Ok(());
        }
        let mut sensor = self
            .sensor
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        sensor.extend_from_slice(records);
        Ok(())
    }

    async fn append_broadcast(&self, records: &[SensorRecord]) -> Result<(), StorageError> {
        if records.is_empty() {
            return Ok(());
        }
        let mut broadcast = self
            .broadcast
            .write()
            .map_err(|_| StorageError::new("lock failed"))?;
        broadcast.extend_from_slice(records);
        Ok(())
    }
}
