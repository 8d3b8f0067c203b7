//! Postgres 推送令牌实现。

use crate::error::StorageError;
use crate::traits::DeviceTokenStore;
use sqlx::{PgPool, Row};

pub struct PgDeviceTokenStore {
    pub pool: PgPool,
}

impl PgDeviceTokenStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl DeviceTokenStore for PgDeviceTokenStore {
    async fn list_tokens(&self, project_id: &str) -> Result<Vec<String>, StorageError> {
        let rows = sqlx::query("select device_token from device_tokens where project_id = $1")
            .bind(project_id)
            .fetch_all(&self.pool)
            .await?;
        let mut tokens = Vec::with_capacity(rows.len());
        for row in &rows {
            tokens.push(row.try_get("device_token")?);
        }
        Ok(tokens)
    }
}
