//! 项目告警主题发布。

use crate::NotifyError;
use async_trait::async_trait;
use blue_ingest::{topics, Publisher, EVENT_PUBLISH_TIMEOUT};
use std::sync::Arc;

/// 告警主题发布抽象。
#[async_trait]
pub trait AlertPublisher: Send + Sync {
    async fn publish_alert(&self, project_id: &str, message: &str) -> Result<(), NotifyError>;
}

/// 空告警发布器（用于接线与测试）。
#[derive(Debug, Default)]
pub struct NoopAlertPublisher;

#[async_trait]
impl AlertPublisher for NoopAlertPublisher {
    async fn publish_alert(&self, _project_id: &str, _message: &str) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// MQTT 告警发布器：发布到 `alerts/{project_id}`。
pub struct MqttAlertPublisher {
    publisher: Arc<dyn Publisher>,
}

impl MqttAlertPublisher {
    pub fn new(publisher: Arc<dyn Publisher>) -> Self {
        Self { publisher }
    }
}

#[async_trait]
impl AlertPublisher for MqttAlertPublisher {
    async fn publish_alert(&self, project_id: &str, message: &str) -> Result<(), NotifyError> {
        self.publisher
            .publish(
                &topics::alert_topic(project_id),
                message.as_bytes().to_vec(),
                EVENT_PUBLISH_TIMEOUT,
            )
            .await
            .map_err(|err| NotifyError::Alert(err.to_string()))
    }
}
