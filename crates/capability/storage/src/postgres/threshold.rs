//! Postgres 阈值存储实现。

use crate::error::StorageError;
use crate::traits::ThresholdStore;
use domain::Threshold;
use sqlx::{PgPool, Row};

pub struct PgThresholdStore {
    pub pool: PgPool,
}

impl PgThresholdStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl ThresholdStore for PgThresholdStore {
    async fn find(
        &self,
        project_id: &str,
        device: &str,
    ) -> Result<Option<Threshold>, StorageError> {
        let row = sqlx::query(
            "select temperature_min, temperature_max, humidity_min, humidity_max \
             from device_thresholds where project_id = $1 and device = $2",
        )
        .bind(project_id)
        .bind(device)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(Threshold {
            temp_min: row.try_get("temperature_min")?,
            temp_max: row.try_get("temperature_max")?,
            hum_min: row.try_get("humidity_min")?,
            hum_max: row.try_get("humidity_max")?,
        }))
    }
}
