//! Postgres 告警记录实现。

use crate::error::StorageError;
use crate::models::NoticeRecord;
use crate::traits::NoticeStore;
use sqlx::{PgPool, Row};

pub struct PgNoticeStore {
    pub pool: PgPool,
}

impl PgNoticeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_notice(row: &sqlx::postgres::PgRow) -> Result<NoticeRecord, StorageError> {
    Ok(NoticeRecord {
        project_id: row.try_get("project_id")?,
        device: row.try_get("device")?,
        metric: row.try_get("metric")?,
        cause: row.try_get("cause")?,
    })
}

#[async_trait::async_trait]
impl NoticeStore for PgNoticeStore {
    async fn find(
        &self,
        project_id: &str,
        device: &str,
        metric: &str,
        cause: &str,
    ) -> Result<Option<NoticeRecord>, StorageError> {
        let row = sqlx::query(
            "select project_id, device, metric, cause from notices \
             where project_id = $1 and device = $2 and metric = $3 and cause = $4",
        )
        .bind(project_id)
        .bind(device)
        .bind(metric)
        .bind(cause)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(row_to_notice(&row)?))
    }

    async fn find_any_cause(
        &self,
        project_id: &str,
        device: &str,
        metric: &str,
    ) -> Result<Option<NoticeRecord>, StorageError> {
        let row = sqlx::query(
            "select project_id, device, metric, cause from notices \
             where project_id = $1 and device = $2 and metric = $3 limit 1",
        )
        .bind(project_id)
        .bind(device)
        .bind(metric)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(row_to_notice(&row)?))
    }

    async fn save(&self, record: NoticeRecord) -> Result<(), StorageError> {
        sqlx::query(
            "insert into notices (project_id, device, metric, cause, noticed) \
             values ($1, $2, $3, $4, '1') \
             on conflict (project_id, device, metric, cause) do nothing",
        )
        .bind(&record.project_id)
        .bind(&record.device)
        .bind(&record.metric)
        .bind(&record.cause)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn delete(
        &self,
        project_id: &str,
        device: &str,
        metric: &str,
    ) -> Result<(), StorageError> {
        sqlx::query("delete from notices where project_id = $1 and device = $2 and metric = $3")
            .bind(project_id)
            .bind(device)
            .bind(metric)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
