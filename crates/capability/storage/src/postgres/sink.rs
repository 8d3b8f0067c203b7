//! Postgres 时序写入实现。
//!
//! 传感与广播记录分表追加。单条失败使整批失败，由调用方决定丢弃。

use crate::error::StorageError;
use crate::sink::MetricSink;
use domain::SensorRecord;
use sqlx::PgPool;

pub struct PgMetricSink {
    pub pool: PgPool,
}

impl PgMetricSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn append(&self, table: &str, records: &[SensorRecord]) -> Result<(), StorageError> {
        if records.is_empty() {
            return Ok(());
        }
        let sql = format!(
            "insert into {} (project_id, device, thing, ts, rssi, temperature, humidity, \
             device_name, power, data_type, data) \
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
            table
        );
        let mut tx = self.pool.begin().await?;
        for record in records {
            sqlx::query(&sql)
                .bind(&record.project_id)
                .bind(&record.device)
                .bind(&record.thing)
                .bind(record.timestamp)
                .bind(record.rssi)
                .bind(record.temperature)
                .bind(record.humidity)
                .bind(&record.device_name)
                .bind(record.power)
                .bind(record.data_type.as_deref())
                .bind(record.data.as_deref())
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl MetricSink for PgMetricSink {
    async fn append_sensor(&self, records: &[SensorRecord]) -> Result<(), StorageError> {
        self.append("sensor_records", records).await
    }

    async fn append_broadcast(&self, records: &[SensorRecord]) -> Result<(), StorageError> {
        self.append("broadcast_records", records).await
    }
}
