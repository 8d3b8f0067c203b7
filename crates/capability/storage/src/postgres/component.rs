//! Postgres 组件存储实现。

use crate::error::StorageError;
use crate::models::{ComponentDetailRecord, ComponentRecord};
use crate::traits::ComponentStore;
use domain::{CommandStatus, ComponentKind};
use sqlx::{PgPool, Row};

pub struct PgComponentStore {
    pub pool: PgPool,
}

impl PgComponentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn row_to_component(row: &sqlx::postgres::PgRow) -> Result<ComponentRecord, StorageError> {
    let kind: String = row.try_get("kind")?;
    let kind = match kind.as_str() {
        "BEACON" => ComponentKind::Beacon,
        "GATEWAY" => ComponentKind::Gateway,
        other => return Err(StorageError::new(format!("unknown component kind: {}", other))),
    };
    Ok(ComponentRecord {
        id: row.try_get("id")?,
        mac_addr: row.try_get("mac_addr")?,
        gw_mac_addr: row.try_get("gw_mac_addr")?,
        kind,
        project_id: row.try_get("project_id")?,
    })
}

fn row_to_detail(row: &sqlx::postgres::PgRow) -> Result<ComponentDetailRecord, StorageError> {
    let status: String = row.try_get("status")?;
    let status = CommandStatus::from_label(&status)
        .ok_or_else(|| StorageError::new(format!("unknown command status: {}", status)))?;
    Ok(ComponentDetailRecord {
        id: row.try_get("id")?,
        component_id: row.try_get("component_id")?,
        status,
        applied_data: row.try_get("applied_data")?,
        pending_data: row.try_get("pending_data")?,
    })
}

#[async_trait::async_trait]
impl ComponentStore for PgComponentStore {
    async fn find_by_mac(
        &self,
        mac_addr: &str,
        kind: ComponentKind,
    ) -> Result<Option<ComponentRecord>, StorageError> {
        let row = sqlx::query(
            "select id, mac_addr, gw_mac_addr, kind, project_id from components \
             where mac_addr = $1 and kind = $2",
        )
        .bind(mac_addr)
        .bind(kind.as_str())
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(row_to_component(&row)?))
    }

    async fn find(&self, component_id: &str) -> Result<Option<ComponentRecord>, StorageError> {
        let row = sqlx::query(
            "select id, mac_addr, gw_mac_addr, kind, project_id from components where id = $1",
        )
        .bind(component_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(row_to_component(&row)?))
    }

    async fn find_detail(
        &self,
        component_id: &str,
    ) -> Result<Option<ComponentDetailRecord>, StorageError> {
        let row = sqlx::query(
            "select id, component_id, status, applied_data, pending_data \
             from component_details where component_id = $1",
        )
        .bind(component_id)
        .fetch_optional(&self.pool)
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        Ok(Some(row_to_detail(&row)?))
    }

    async fn save_detail(&self, record: ComponentDetailRecord) -> Result<(), StorageError> {
        sqlx::query(
            "insert into component_details (id, component_id, status, applied_data, pending_data) \
             values ($1, $2, $3, $4, $5) \
             on conflict (component_id) do update set \
             status = excluded.status, applied_data = excluded.applied_data, \
             pending_data = excluded.pending_data",
        )
        .bind(&record.id)
        .bind(&record.component_id)
        .bind(record.status.as_label())
        .bind(&record.applied_data)
        .bind(&record.pending_data)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn set_status(
        &self,
        component_id: &str,
        status: CommandStatus,
    ) -> Result<(), StorageError> {
        sqlx::query("update component_details set status = $1 where component_id = $2")
            .bind(status.as_label())
            .bind(component_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
