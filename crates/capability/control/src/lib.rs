//! 网关配置命令状态机
//!
//! 生命周期：`Idle → Updating → {Success, Cancelled, Failed}`。
//! 下发后网关异步回执；取消后到达的回执仍然生效（已知竞态，
//! 以设备侧实际结果为准）。

use blue_ingest::{topics, Publisher, EVENT_PUBLISH_TIMEOUT};
use blue_storage::{ComponentDetailRecord, ComponentStore};
use blue_telemetry::{record_ack_applied, record_ack_unknown_component, record_command_issued};
use domain::{CommandStatus, ComponentKind};
use std::sync::Arc;
use tracing::{info, warn};

/// 控制链路错误。
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("component not found: {0}")]
    NotFound(String),
}

/// 网关配置命令（线上格式）。
#[derive(Debug, serde::Serialize)]
struct ActionMessage<'a> {
    msg: &'a str,
    dmac_type: u8,
    dmac: &'a str,
    passwd: &'a str,
    data: &'a str,
}

/// 命令服务：下发、取消、回执落库。
pub struct CommandService {
    components: Arc<dyn ComponentStore>,
    publisher: Arc<dyn Publisher>,
}

impl CommandService {
    pub fn new(components: Arc<dyn ComponentStore>, publisher: Arc<dyn Publisher>) -> Self {
        Self {
            components,
            publisher,
        }
    }

    /// 查询组件当前命令明细。
    pub async fn status(
        &self,
        component_id: &str,
    ) -> Result<Option<ComponentDetailRecord>, ControlError> {
        self.components
            .find_detail(component_id)
            .await
            .map_err(|err| ControlError::Storage(err.to_string()))
    }

    /// 下发配置命令：无条件置为 `Updating` 并覆盖待生效配置
    /// （后写覆盖先写，不排队），随后发布到网关动作主题。
    ///
    /// 发布失败只记日志，状态保持 `Updating`，由回执或下一次
    /// 下发推进。
    pub async fn request(
        &self,
        component_id: &str,
        data: String,
        password: String,
    ) -> Result<ComponentDetailRecord, ControlError> {
        let component = self
            .components
            .find(component_id)
            .await
            .map_err(|err| ControlError::Storage(err.to_string()))?
            .ok_or_else(|| ControlError::NotFound(component_id.to_string()))?;

        let mut detail = self
            .components
            .find_detail(component_id)
            .await
            .map_err(|err| ControlError::Storage(err.to_string()))?
            .unwrap_or_else(|| ComponentDetailRecord::new(component_id));
        detail.status = CommandStatus::Updating;
        detail.pending_data = data.clone();
        self.components
            .save_detail(detail.clone())
            .await
            .map_err(|err| ControlError::Storage(err.to_string()))?;
        record_command_issued();

        let msg = match component.kind {
            ComponentKind::Beacon => "config_beacon_req",
            ComponentKind::Gateway => "config_gateway_req",
        };
        let action = ActionMessage {
            msg,
            dmac_type: component.kind.wire_code(),
            dmac: &component.mac_addr,
            passwd: &password,
            data: &data,
        };
        let payload = match serde_json::to_vec(&action) {
            Ok(payload) => payload,
            Err(err) => {
                warn!(target: "blue.control", "action payload marshal failed: {}", err);
                return Ok(detail);
            }
        };
        let topic = topics::action_topic(&component.gw_mac_addr);
        info!(
            target: "blue.control",
            component_id = %component.id,
            mac_addr = %component.mac_addr,
            topic = %topic,
            msg = %msg,
            "command_publish"
        );
        if let Err(err) = self
            .publisher
            .publish(&topic, payload, EVENT_PUBLISH_TIMEOUT)
            .await
        {
            warn!(
                target: "blue.control",
                component_id = %component.id,
                "command publish failed: {}",
                err
            );
        }
        Ok(detail)
    }

    /// 取消命令：仅 `Updating` 可取消（清空待生效配置）；
    /// 终止态和 `Idle` 为空操作，返回当前状态。
    pub async fn cancel(&self, component_id: &str) -> Result<CommandStatus, ControlError> {
        let mut detail = self
            .components
            .find_detail(component_id)
            .await
            .map_err(|err| ControlError::Storage(err.to_string()))?
            .ok_or_else(|| ControlError::NotFound(component_id.to_string()))?;
        if detail.status != CommandStatus::Updating {
            return Ok(detail.status);
        }
        detail.status = CommandStatus::Cancelled;
        detail.pending_data.clear();
        self.components
            .save_detail(detail)
            .await
            .map_err(|err| ControlError::Storage(err.to_string()))?;
        info!(target: "blue.control", component_id = %component_id, "command_cancelled");
        Ok(CommandStatus::Cancelled)
    }

    /// 处理网关回执：`"0"` 表示成功（待生效配置提升为已生效），
    /// 其余数字码只把状态推进为 `Failed(code)`，配置字段不动。
    /// 找不到组件或结果码不可解析时告警丢弃。
    pub async fn apply_ack(
        &self,
        mac_addr: &str,
        kind: ComponentKind,
        result: &str,
    ) -> Result<(), ControlError> {
        let component = match self
            .components
            .find_by_mac(mac_addr, kind)
            .await
            .map_err(|err| ControlError::Storage(err.to_string()))?
        {
            Some(component) => component,
            None => {
                warn!(
                    target: "blue.control",
                    mac_addr = %mac_addr,
                    kind = %kind.as_str(),
                    "ack for unknown component"
                );
                record_ack_unknown_component();
                return Ok(());
            }
        };
        let mut detail = match self
            .components
            .find_detail(&component.id)
            .await
            .map_err(|err| ControlError::Storage(err.to_string()))?
        {
            Some(detail) => detail,
            None => {
                warn!(
                    target: "blue.control",
                    component_id = %component.id,
                    "ack without command detail"
                );
                return Ok(());
            }
        };

        let status = if result == "0" {
            detail.status = CommandStatus::Success;
            detail.applied_data = std::mem::take(&mut detail.pending_data);
            self.components
                .save_detail(detail)
                .await
                .map_err(|err| ControlError::Storage(err.to_string()))?;
            CommandStatus::Success
        } else {
            let code = match result.parse::<u8>() {
                Ok(code) => code,
                Err(_) => {
                    warn!(
                        target: "blue.control",
                        component_id = %component.id,
                        result = %result,
                        "unparsable ack result"
                    );
                    return Ok(());
                }
            };
            // 失败回执只更新状态字段，待生效/已生效配置保持原样
            self.components
                .set_status(&component.id, CommandStatus::Failed(code))
                .await
                .map_err(|err| ControlError::Storage(err.to_string()))?;
            CommandStatus::Failed(code)
        };
        record_ack_applied();
        info!(
            target: "blue.control",
            component_id = %component.id,
            status = %status.as_label(),
            "ack_applied"
        );
        Ok(())
    }
}
