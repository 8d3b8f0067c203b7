//! 路由定义
//!
//! - 健康检查：/health
//! - 指标快照：/metrics
//! - 组件命令：/components/{id}/command（查询/下发）、
//!   /components/{id}/command/cancel（取消）
//!
//! 命令路由受 `control_enabled` 开关控制，关闭后只保留运维面。

use crate::handlers::*;
use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};

pub fn create_router(control_enabled: bool) -> Router<AppState> {
    let mut router = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_snapshot));
    if control_enabled {
        router = router
            .route(
                "/components/:component_id/command",
                get(get_command).put(put_command),
            )
            .route("/components/:component_id/command/cancel", post(cancel_command));
    }
    router
}
