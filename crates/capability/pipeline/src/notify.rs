//! 告警与恢复通知派发
//!
//! 去重采取双后备：TTL 缓存扛住 24 小时内的重复告警，持久化
//! 记录扛住缓存淘汰与进程重启。check-then-act 之间的竞态窗口
//! 接受为已知行为（最多重复一条，24 小时内自愈），不加键级锁。

use crate::PipelineError;
use blue_cache::{keys, ttl, TtlCache};
use blue_notify::{AlertPublisher, PushNotifier};
use blue_storage::{DeviceTokenStore, NoticeRecord, NoticeStore};
use blue_telemetry::{
    record_alert_sent, record_alert_suppressed, record_clear_sent, record_notify_failure,
};
use domain::{Cause, Classification, Metric, SensorRecord};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

/// 一条待派发的判定结果。
#[derive(Debug, Clone)]
pub struct NoticeSend {
    pub record: SensorRecord,
    pub metric: Metric,
    pub value: f64,
    pub classification: Classification,
}

/// 通知派发器。
pub struct NotificationDispatcher {
    cache: Arc<dyn TtlCache>,
    notices: Arc<dyn NoticeStore>,
    tokens: Arc<dyn DeviceTokenStore>,
    push: Arc<dyn PushNotifier>,
    alerts: Arc<dyn AlertPublisher>,
}

impl NotificationDispatcher {
    pub fn new(
        cache: Arc<dyn TtlCache>,
        notices: Arc<dyn NoticeStore>,
        tokens: Arc<dyn DeviceTokenStore>,
        push: Arc<dyn PushNotifier>,
        alerts: Arc<dyn AlertPublisher>,
    ) -> Self {
        Self {
            cache,
            notices,
            tokens,
            push,
            alerts,
        }
    }

    pub async fn process(&self, item: NoticeSend) -> Result<(), PipelineError> {
        match item.classification {
            Classification::Above => self.handle_alert(&item, Cause::Upper).await,
            Classification::Below => self.handle_alert(&item, Cause::Lower).await,
            Classification::Within => self.handle_clear(&item).await,
        }
    }

    async fn handle_alert(&self, item: &NoticeSend, cause: Cause) -> Result<(), PipelineError> {
        let record = &item.record;
        let key = keys::notice_key(
            &record.project_id,
            &record.device,
            item.metric.as_str(),
            cause.as_str(),
        );
        if self.cache_hit(&key).await {
            record_alert_suppressed();
            return Ok(());
        }
        let persisted = self
            .notices
            .find(
                &record.project_id,
                &record.device,
                item.metric.as_str(),
                cause.as_str(),
            )
            .await
            .map_err(|err| PipelineError::Notice(err.to_string()))?;
        if persisted.is_some() {
            record_alert_suppressed();
            return Ok(());
        }

        let message = format!(
            "[notice]device({}) thing({}) {} is {}, it's out of the range of device settings, please pay attention to it.",
            record.device,
            record.thing,
            item.metric.as_str(),
            item.value
        );
        self.push_in_background(record.project_id.clone(), message.clone());
        if let Err(err) = self
            .alerts
            .publish_alert(&record.project_id, &message)
            .await
        {
            // 投递失败不落去重标记，下一条读数自然重试
            warn!(
                target: "blue.pipeline",
                device = %record.device,
                metric = %item.metric.as_str(),
                "alert publish failed: {}",
                err
            );
            record_notify_failure();
            return Ok(());
        }
        record_alert_sent();
        info!(
            target: "blue.pipeline",
            device = %record.device,
            metric = %item.metric.as_str(),
            cause = %cause.as_str(),
            value = item.value,
            "alert_sent"
        );

        if let Err(err) = self.cache.set(&key, "1", ttl::NOTICE).await {
            warn!(target: "blue.pipeline", key = %key, "notice dedup mark failed: {}", err);
        }
        if let Err(err) = self
            .notices
            .save(NoticeRecord {
                project_id: record.project_id.clone(),
                device: record.device.clone(),
                metric: item.metric.as_str().to_string(),
                cause: cause.as_str().to_string(),
            })
            .await
        {
            warn!(
                target: "blue.pipeline",
                device = %record.device,
                "notice persist failed: {}",
                err
            );
        }
        Ok(())
    }

    async fn handle_clear(&self, item: &NoticeSend) -> Result<(), PipelineError> {
        let record = &item.record;
        let metric = item.metric.as_str();
        let upper_key = keys::notice_key(&record.project_id, &record.device, metric, "upper");
        let lower_key = keys::notice_key(&record.project_id, &record.device, metric, "lower");
        let cached = self.cache_hit(&upper_key).await || self.cache_hit(&lower_key).await;
        let persisted = self
            .notices
            .find_any_cause(&record.project_id, &record.device, metric)
            .await
            .map_err(|err| PipelineError::Notice(err.to_string()))?;
        if !cached && persisted.is_none() {
            return Ok(());
        }

        let message = format!(
            "[clean]device({}) thing({}) {} is {}, it restores back to the range of device settings.",
            record.device, record.thing, metric, item.value
        );
        self.push_in_background(record.project_id.clone(), message.clone());
        if let Err(err) = self
            .alerts
            .publish_alert(&record.project_id, &message)
            .await
        {
            warn!(
                target: "blue.pipeline",
                device = %record.device,
                metric = %metric,
                "clear publish failed: {}",
                err
            );
            record_notify_failure();
            return Ok(());
        }
        record_clear_sent();
        info!(
            target: "blue.pipeline",
            device = %record.device,
            metric = %metric,
            value = item.value,
            "clear_sent"
        );

        for key in [&upper_key, &lower_key] {
            if let Err(err) = self.cache.del(key).await {
                warn!(target: "blue.pipeline", key = %key, "notice dedup unmark failed: {}", err);
            }
        }
        if let Err(err) = self
            .notices
            .delete(&record.project_id, &record.device, metric)
            .await
        {
            warn!(
                target: "blue.pipeline",
                device = %record.device,
                "notice delete failed: {}",
                err
            );
        }
        Ok(())
    }

    /// 缓存故障按未命中处理。
    async fn cache_hit(&self, key: &str) -> bool {
        match self.cache.get(key).await {
            Ok(hit) => hit.is_some(),
            Err(err) => {
                warn!(target: "blue.pipeline", key = %key, "dedup cache read failed: {}", err);
                false
            }
        }
    }

    /// App 推送不在派发路径上等待：失败只记日志。
    fn push_in_background(&self, project_id: String, message: String) {
        let tokens = self.tokens.clone();
        let push = self.push.clone();
        tokio::spawn(async move {
            let device_tokens = match tokens.list_tokens(&project_id).await {
                Ok(device_tokens) => device_tokens,
                Err(err) => {
                    warn!(target: "blue.pipeline", project_id = %project_id, "token list failed: {}", err);
                    return;
                }
            };
            if let Err(err) = push.notify(&device_tokens, &message).await {
                warn!(target: "blue.pipeline", project_id = %project_id, "push failed: {}", err);
                record_notify_failure();
            }
        });
    }
}

/// 通知工作器：逐条处理，单条失败记日志后继续。
pub fn spawn_notify_worker(
    dispatcher: Arc<NotificationDispatcher>,
    mut receiver: mpsc::Receiver<NoticeSend>,
    mut shutdown: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                item = receiver.recv() => {
                    let Some(item) = item else { break };
                    if let Err(err) = dispatcher.process(item).await {
                        warn!(target: "blue.pipeline", "notice item failed: {}", err);
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use blue_cache::InMemoryTtlCache;
    use blue_notify::NotifyError;
    use blue_storage::{DeviceTokenRecord, InMemoryDeviceTokenStore, InMemoryNoticeStore};
    use std::sync::Mutex;

    struct RecordingAlerts {
        sent: Mutex<Vec<(String, String)>>,
    }

    impl RecordingAlerts {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                sent: Mutex::new(Vec::new()),
            })
        }

        fn count(&self) -> usize {
            self.sent.lock().map(|s| s.len()).unwrap_or(0)
        }

        fn last(&self) -> Option<(String, String)> {
            self.sent.lock().ok().and_then(|s| s.last().cloned())
        }
    }

    #[async_trait]
    impl AlertPublisher for RecordingAlerts {
        async fn publish_alert(&self, project_id: &str, message: &str) -> Result<(), NotifyError> {
            self.sent
                .lock()
                .map_err(|_| NotifyError::Alert("lock failed".to_string()))?
                .push((project_id.to_string(), message.to_string()));
            Ok(())
        }
    }

    struct FailingAlerts;

    #[async_trait]
    impl AlertPublisher for FailingAlerts {
        async fn publish_alert(
            &self,
            _project_id: &str,
            _message: &str,
        ) -> Result<(), NotifyError> {
            Err(NotifyError::Alert("broker down".to_string()))
        }
    }

    struct FailingPush;

    #[async_trait]
    impl PushNotifier for FailingPush {
        async fn notify(&self, _tokens: &[String], _message: &str) -> Result<(), NotifyError> {
            Err(NotifyError::Push("provider down".to_string()))
        }
    }

    struct Fixture {
        cache: Arc<InMemoryTtlCache>,
        notices: Arc<InMemoryNoticeStore>,
        alerts: Arc<RecordingAlerts>,
        dispatcher: NotificationDispatcher,
    }

    fn fixture_with(push: Arc<dyn PushNotifier>, alerts: Arc<dyn AlertPublisher>) -> Fixture {
        let cache = Arc::new(InMemoryTtlCache::new());
        let notices = Arc::new(InMemoryNoticeStore::new());
        let tokens = Arc::new(InMemoryDeviceTokenStore::with_tokens(vec![
            DeviceTokenRecord {
                project_id: "project-1".to_string(),
                device_token: "tok-1".to_string(),
            },
        ]));
        let recording = RecordingAlerts::new();
        let dispatcher = NotificationDispatcher::new(
            cache.clone(),
            notices.clone(),
            tokens,
            push,
            alerts,
        );
        Fixture {
            cache,
            notices,
            alerts: recording,
            dispatcher,
        }
    }

    fn fixture() -> Fixture {
        let alerts = RecordingAlerts::new();
        let mut fixture = fixture_with(Arc::new(blue_notify::NoopPushNotifier), alerts.clone());
        fixture.alerts = alerts;
        fixture
    }

    fn item(value: f64, classification: Classification) -> NoticeSend {
        NoticeSend {
            record: SensorRecord {
                project_id: "project-1".to_string(),
                device: "dev-1".to_string(),
                thing: "t1".to_string(),
                timestamp: 1,
                rssi: -60.0,
                temperature: Some(value),
                humidity: None,
                device_name: "sensor".to_string(),
                power: 3.0,
                data_type: None,
                data: None,
            },
            metric: Metric::Temperature,
            value,
            classification,
        }
    }

    #[tokio::test]
    async fn repeated_alert_is_suppressed() {
        let f = fixture();
        f.dispatcher
            .process(item(35.0, Classification::Above))
            .await
            .expect("process");
        f.dispatcher
            .process(item(36.0, Classification::Above))
            .await
            .expect("process");

        assert_eq!(f.alerts.count(), 1);
        assert_eq!(f.notices.len(), 1);
        let (project, message) = f.alerts.last().expect("sent");
        assert_eq!(project, "project-1");
        assert!(message.starts_with("[notice]device(dev-1) thing(t1) temperature is 35"));
    }

    #[tokio::test]
    async fn clear_removes_marks_and_is_idempotent() {
        let f = fixture();
        f.dispatcher
            .process(item(35.0, Classification::Above))
            .await
            .expect("process");
        f.dispatcher
            .process(item(20.0, Classification::Within))
            .await
            .expect("process");

        assert_eq!(f.alerts.count(), 2);
        assert!(f.notices.is_empty());
        let (_, message) = f.alerts.last().expect("sent");
        assert!(message.starts_with("[clean]device(dev-1) thing(t1) temperature is 20"));

        // 没有活跃告警时 Within 不产生任何投递
        f.dispatcher
            .process(item(21.0, Classification::Within))
            .await
            .expect("process");
        assert_eq!(f.alerts.count(), 2);
    }

    #[tokio::test]
    async fn persisted_notice_suppresses_after_cache_loss() {
        let f = fixture();
        f.notices
            .save(NoticeRecord {
                project_id: "project-1".to_string(),
                device: "dev-1".to_string(),
                metric: "temperature".to_string(),
                cause: "upper".to_string(),
            })
            .await
            .expect("save");

        // 缓存为空（相当于重启后），持久化记录仍然抑制重复告警
        f.dispatcher
            .process(item(35.0, Classification::Above))
            .await
            .expect("process");
        assert_eq!(f.alerts.count(), 0);
    }

    #[tokio::test]
    async fn opposite_cause_alerts_independently() {
        let f = fixture();
        f.dispatcher
            .process(item(35.0, Classification::Above))
            .await
            .expect("process");
        f.dispatcher
            .process(item(-5.0, Classification::Below))
            .await
            .expect("process");

        assert_eq!(f.alerts.count(), 2);
        assert_eq!(f.notices.len(), 2);

        // 恢复一次清掉两个方向
        f.dispatcher
            .process(item(20.0, Classification::Within))
            .await
            .expect("process");
        assert!(f.notices.is_empty());
        assert!(
            f.cache
                .get(&keys::notice_key("project-1", "dev-1", "temperature", "upper"))
                .await
                .expect("get")
                .is_none()
        );
        assert!(
            f.cache
                .get(&keys::notice_key("project-1", "dev-1", "temperature", "lower"))
                .await
                .expect("get")
                .is_none()
        );
    }

    #[tokio::test]
    async fn delivery_failure_leaves_notice_inactive() {
        let f = fixture_with(Arc::new(blue_notify::NoopPushNotifier), Arc::new(FailingAlerts));
        f.dispatcher
            .process(item(35.0, Classification::Above))
            .await
            .expect("process");

        assert!(f.notices.is_empty());
        assert!(
            f.cache
                .get(&keys::notice_key("project-1", "dev-1", "temperature", "upper"))
                .await
                .expect("get")
                .is_none()
        );
    }

    #[tokio::test]
    async fn push_failure_does_not_block_alert() {
        let alerts = RecordingAlerts::new();
        let mut f = fixture_with(Arc::new(FailingPush), alerts.clone());
        f.alerts = alerts;
        f.dispatcher
            .process(item(35.0, Classification::Above))
            .await
            .expect("process");

        assert_eq!(f.alerts.count(), 1);
        assert_eq!(f.notices.len(), 1);
    }

    #[tokio::test]
    async fn worker_drains_queue_until_close() {
        let f = fixture();
        let dispatcher = Arc::new(f.dispatcher);
        let (tx, rx) = mpsc::channel(8);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = spawn_notify_worker(dispatcher, rx, shutdown_rx);

        tx.send(item(35.0, Classification::Above)).await.expect("send");
        tx.send(item(20.0, Classification::Within)).await.expect("send");
        drop(tx);
        handle.await.expect("join");
        drop(shutdown_tx);

        assert_eq!(f.alerts.count(), 2);
    }
}
