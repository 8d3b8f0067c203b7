//! MQTT 传输适配
//!
//! - 入站：订阅上报 / 广播采集 / 命令回执三类主题，按主题分发给处理器。
//! - 出站：带超时的发布接口，供丢包上报、告警与命令下发复用。
//! - 稳态事件循环错误只告警并退避重连，启动期的连接/订阅失败才是致命错误。

use async_trait::async_trait;
use rumqttc::{AsyncClient, Event, EventLoop, MqttOptions, Packet, QoS};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub mod decode;
pub mod topics;

pub use decode::{AckMessage, CollectInfo, CollectUnit, DecodedReport, COLLECT_MSG};
pub use topics::InboundTopic;

/// 事件类出站发布超时（丢包、告警）。
pub const EVENT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(5);

/// 命令类出站发布超时（start/stop）。
pub const COMMAND_PUBLISH_TIMEOUT: Duration = Duration::from_secs(2);

/// 传输层错误。
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("decode error: {0}")]
    Decode(String),
    #[error("source error: {0}")]
    Source(String),
    #[error("publish error: {0}")]
    Publish(String),
    #[error("publish timeout: {0}")]
    Timeout(String),
    #[error("handler error: {0}")]
    Handler(String),
}

/// 入站报文处理器。
///
/// 事件循环只做主题分类，原始负载交给处理器；处理器内部
/// 只允许有界排队，不得长时间阻塞事件循环。
#[async_trait]
pub trait InboundHandler: Send + Sync {
    async fn on_report(&self, thing: &str, payload: &[u8]) -> Result<(), IngestError>;

    async fn on_collect(&self, gw_mac: &str, payload: &[u8]) -> Result<(), IngestError>;

    async fn on_ack(&self, gw_mac: &str, payload: &[u8]) -> Result<(), IngestError>;
}

/// MQTT 连接配置。
#[derive(Debug, Clone)]
pub struct MqttConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
}

fn mqtt_options(client_id: String, config: &MqttConfig) -> MqttOptions {
    let mut options = MqttOptions::new(client_id, config.host.clone(), config.port);
    options.set_keep_alive(Duration::from_secs(30));
    if let (Some(username), Some(password)) =
        (config.username.as_ref(), config.password.as_ref())
    {
        options.set_credentials(username, password);
    }
    options
}

/// MQTT 入站采集源。
#[derive(Debug, Clone)]
pub struct MqttSource {
    config: MqttConfig,
}

impl MqttSource {
    pub fn new(config: MqttConfig) -> Self {
        Self { config }
    }

    /// 建连并订阅三类入站主题，等到 ConnAck 才返回：
    /// 连接或订阅失败在启动期就暴露为错误（致命）。
    pub async fn subscribe(&self) -> Result<SubscribedSource, IngestError> {
        let client_id = format!("blue-ingest-{}", uuid::Uuid::new_v4());
        let options = mqtt_options(client_id, &self.config);
        let (client, mut eventloop) = AsyncClient::new(options, 10);
        subscribe_filters(&client).await?;
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => break,
                Ok(_) => {}
                Err(err) => return Err(IngestError::Source(err.to_string())),
            }
        }
        Ok(SubscribedSource { client, eventloop })
    }
}

async fn subscribe_filters(client: &AsyncClient) -> Result<(), IngestError> {
    for filter in [topics::REPORT_FILTER, topics::COLLECT_FILTER, topics::ACK_FILTER] {
        client
            .subscribe(filter, QoS::AtLeastOnce)
            .await
            .map_err(|err| IngestError::Source(err.to_string()))?;
    }
    Ok(())
}

/// 已完成订阅的入站源。
pub struct SubscribedSource {
    client: AsyncClient,
    eventloop: EventLoop,
}

impl std::fmt::Debug for SubscribedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscribedSource").finish_non_exhaustive()
    }
}

impl SubscribedSource {
    /// 稳态分发循环：轮询错误只告警并退避 1 秒，重连后重新订阅。
    pub async fn run(mut self, handler: Arc<dyn InboundHandler>) {
        loop {
            match self.eventloop.poll().await {
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    let Some(topic) = topics::classify(&publish.topic) else {
                        warn!(target: "blue.ingest", "topic skipped: {}", publish.topic);
                        continue;
                    };
                    let result = match &topic {
                        InboundTopic::Report { thing } => {
                            handler.on_report(thing, &publish.payload).await
                        }
                        InboundTopic::Collect { gw_mac } => {
                            handler.on_collect(gw_mac, &publish.payload).await
                        }
                        InboundTopic::Ack { gw_mac } => {
                            handler.on_ack(gw_mac, &publish.payload).await
                        }
                    };
                    if let Err(err) = result {
                        warn!(
                            target: "blue.ingest",
                            topic = %publish.topic,
                            "inbound handler failed: {}",
                            err
                        );
                    }
                }
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    // 代理侧不保留订阅状态，重连成功后补一次
                    if let Err(err) = subscribe_filters(&self.client).await {
                        warn!(target: "blue.ingest", "resubscribe failed: {}", err);
                    }
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(target: "blue.ingest", "mqtt eventloop error: {}", err);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    }
}

/// 出站发布抽象。
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
        timeout: Duration,
    ) -> Result<(), IngestError>;
}

/// 空发布器（用于接线与测试）。
#[derive(Debug, Default)]
pub struct NoopPublisher;

#[async_trait]
impl Publisher for NoopPublisher {
    async fn publish(
        &self,
        _topic: &str,
        _payload: Vec<u8>,
        _timeout: Duration,
    ) -> Result<(), IngestError> {
        Ok(())
    }
}

/// MQTT 出站发布器（独立连接，后台任务维持事件循环）。
#[derive(Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
}

impl MqttPublisher {
    pub fn connect(config: MqttConfig) -> (Self, tokio::task::JoinHandle<()>) {
        let client_id = format!("blue-publish-{}", uuid::Uuid::new_v4());
        let options = mqtt_options(client_id, &config);
        let (client, mut eventloop) = AsyncClient::new(options, 10);
        let handle = tokio::spawn(async move {
            loop {
                if let Err(err) = eventloop.poll().await {
                    warn!(target: "blue.ingest", "mqtt publish eventloop error: {}", err);
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        });
        (Self { client }, handle)
    }
}

#[async_trait]
impl Publisher for MqttPublisher {
    async fn publish(
        &self,
        topic: &str,
        payload: Vec<u8>,
        timeout: Duration,
    ) -> Result<(), IngestError> {
        let publish = self
            .client
            .publish(topic, QoS::AtLeastOnce, false, payload);
        match tokio::time::timeout(timeout, publish).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(err)) => Err(IngestError::Publish(err.to_string())),
            Err(_) => Err(IngestError::Timeout(topic.to_string())),
        }
    }
}
