//! Postgres 设备存储实现。

use crate::error::StorageError;
use crate::models::ThingRecord;
use crate::traits::ThingStore;
use sqlx::{PgPool, Row};

pub struct PgThingStore {
    pub pool: PgPool,
}

impl PgThingStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_thing(row: &sqlx::postgres::PgRow) -> Result<ThingRecord, StorageError> {
    Ok(ThingRecord {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        project_id: row.try_get("project_id")?,
        online: row.try_get::<i32, _>("status")? == 1,
    })
}

#[async_trait::async_trait]
impl ThingStore for PgThingStore {
    async fn find_by_name(&self, name: &str) -> Result<Option<ThingRecord>, StorageError> {
        let row = sqlx::query("select id, name, project_id, status from things where name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(row_to_thing(&row)?))
    }

    async fn list_online(&self) -> Result<Vec<ThingRecord>, StorageError> {
        let rows = sqlx::query("select id, name, project_id, status from things where status = 1")
            .fetch_all(&self.pool)
            .await?;
        let mut things = Vec::with_capacity(rows.len());
        for row in &rows {
            things.push(row_to_thing(row)?);
        }
        Ok(things)
    }

    async fn update_status(&self, id: &str, online: bool) -> Result<(), StorageError> {
        sqlx::query("update things set status = $1 where id = $2")
            .bind(if online { 1_i32 } else { 0_i32 })
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
