//! 通知出口能力
//!
//! - App 推送：HTTP 推送服务商，listcast 批量投递，失败只记日志。
//! - 告警主题：项目级 MQTT 主题发布，复用出站发布器。

mod alert;
mod push;

pub use alert::{AlertPublisher, MqttAlertPublisher, NoopAlertPublisher};
pub use push::{HttpPushNotifier, NoopPushNotifier, PushConfig, PushNotifier};

/// 通知链路错误。
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("push error: {0}")]
    Push(String),
    #[error("alert publish error: {0}")]
    Alert(String),
}
