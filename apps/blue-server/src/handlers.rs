//! HTTP 处理器
//!
//! 运维面接口：健康检查、指标快照、组件配置命令的查询/下发/取消。

use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use blue_control::ControlError;
use blue_storage::ComponentDetailRecord;
use blue_telemetry::metrics;
use serde::Deserialize;

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

/// 指标快照（累计计数，进程生命周期内单调递增）。
pub async fn metrics_snapshot() -> impl IntoResponse {
    let snapshot = metrics().snapshot();
    Json(serde_json::json!({
        "reports_received": snapshot.reports_received,
        "reports_dropped_invalid": snapshot.reports_dropped_invalid,
        "reports_unregistered": snapshot.reports_unregistered,
        "records_persisted": snapshot.records_persisted,
        "loss_events": snapshot.loss_events,
        "loss_published": snapshot.loss_published,
        "alerts_sent": snapshot.alerts_sent,
        "clears_sent": snapshot.clears_sent,
        "alerts_suppressed": snapshot.alerts_suppressed,
        "notify_failures": snapshot.notify_failures,
        "things_marked_offline": snapshot.things_marked_offline,
        "stop_commands_sent": snapshot.stop_commands_sent,
        "commands_issued": snapshot.commands_issued,
        "acks_applied": snapshot.acks_applied,
        "acks_unknown_component": snapshot.acks_unknown_component,
    }))
}

#[derive(Debug, Deserialize)]
pub struct CommandRequest {
    pub data: String,
    #[serde(default)]
    pub password: String,
}

pub async fn get_command(
    State(state): State<AppState>,
    Path(component_id): Path<String>,
) -> Response {
    match state.commands.status(&component_id).await {
        Ok(Some(detail)) => (StatusCode::OK, detail_json(&detail)).into_response(),
        Ok(None) => not_found("no command issued for component"),
        Err(err) => control_error(err),
    }
}

pub async fn put_command(
    State(state): State<AppState>,
    Path(component_id): Path<String>,
    Json(req): Json<CommandRequest>,
) -> Response {
    match state
        .commands
        .request(&component_id, req.data, req.password)
        .await
    {
        Ok(detail) => (StatusCode::OK, detail_json(&detail)).into_response(),
        Err(err) => control_error(err),
    }
}

pub async fn cancel_command(
    State(state): State<AppState>,
    Path(component_id): Path<String>,
) -> Response {
    match state.commands.cancel(&component_id).await {
        Ok(status) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": status.as_label() })),
        )
            .into_response(),
        Err(err) => control_error(err),
    }
}

fn detail_json(detail: &ComponentDetailRecord) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "component_id": detail.component_id,
        "status": detail.status.as_label(),
        "applied_data": detail.applied_data,
        "pending_data": detail.pending_data,
    }))
}

fn not_found(message: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({ "error": message })),
    )
        .into_response()
}

fn control_error(err: ControlError) -> Response {
    match err {
        ControlError::NotFound(id) => not_found(&format!("component not found: {}", id)),
        ControlError::Storage(message) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({ "error": message })),
        )
            .into_response(),
    }
}
