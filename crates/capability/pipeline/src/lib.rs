//! 上报处理流水线
//!
//! 装配顺序（单条报文）：注册校验 → 在线信号 → 解码 → 会话跟踪 →
//! 补全入库 → 阈值判定 → 通知排队。丢包与通知各有一个有界队列
//! （默认容量 200）和一个长驻工作器；扫描器独立计时。
//!
//! 背压策略：丢包队列用 `try_send`（溢出丢弃并记日志），通知队列
//! 用阻塞 `send`（生产端有界等待，保证告警不静默丢失）。

use async_trait::async_trait;
use blue_cache::{keys, ttl, TtlCache};
use blue_control::CommandService;
use blue_ingest::{
    decode, topics, DecodedReport, InboundHandler, IngestError, Publisher,
    COMMAND_PUBLISH_TIMEOUT,
};
use blue_notify::{AlertPublisher, PushNotifier};
use blue_storage::{
    ComponentStore, DeviceTokenStore, MetricSink, NoticeStore, ThingRecord, ThingStore,
    ThresholdStore,
};
use blue_telemetry::{
    record_loss_event, record_records_persisted, record_report_dropped_invalid,
    record_report_received, record_report_unregistered, record_stop_command_sent,
};
use domain::{
    parse_metric, ComponentKind, LossEvent, RawReport, ReportKind, SensorRecord, Threshold,
    TrackOutcome,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

pub mod evaluate;
pub mod loss;
pub mod notify;
pub mod session;
pub mod sweeper;

pub use evaluate::ThresholdEvaluator;
pub use loss::{spawn_loss_worker, LossReporter};
pub use notify::{spawn_notify_worker, NoticeSend, NotificationDispatcher};
pub use session::SessionTracker;
pub use sweeper::{spawn_sweeper, LivenessSweeper};

/// 流水线错误。
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("storage error: {0}")]
    Storage(String),
    #[error("notice error: {0}")]
    Notice(String),
    #[error("loss report error: {0}")]
    Loss(String),
    #[error("sweep error: {0}")]
    Sweep(String),
}

/// 流水线参数。
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub queue_capacity: usize,
    pub default_threshold: Threshold,
    pub sweep_period: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            queue_capacity: 200,
            default_threshold: Threshold {
                temp_min: 0.0,
                temp_max: 30.0,
                hum_min: 30.0,
                hum_max: 60.0,
            },
            sweep_period: Duration::from_secs(90),
        }
    }
}

impl PipelineConfig {
    fn sanitized(mut self) -> Self {
        if self.queue_capacity == 0 {
            self.queue_capacity = 1;
        }
        self
    }
}

/// 流水线外部依赖。
pub struct PipelineDeps {
    pub things: Arc<dyn ThingStore>,
    pub components: Arc<dyn ComponentStore>,
    pub thresholds: Arc<dyn ThresholdStore>,
    pub notices: Arc<dyn NoticeStore>,
    pub tokens: Arc<dyn DeviceTokenStore>,
    pub sink: Arc<dyn MetricSink>,
    pub cache: Arc<dyn TtlCache>,
    pub publisher: Arc<dyn Publisher>,
    pub push: Arc<dyn PushNotifier>,
    pub alerts: Arc<dyn AlertPublisher>,
    pub commands: Arc<CommandService>,
}

/// 长驻工作器句柄。
pub struct PipelineHandles {
    pub notify_worker: tokio::task::JoinHandle<()>,
    pub loss_worker: tokio::task::JoinHandle<()>,
    pub sweeper: tokio::task::JoinHandle<()>,
}

/// 装配流水线并启动全部工作器。
pub fn build(
    deps: PipelineDeps,
    config: PipelineConfig,
    shutdown: watch::Receiver<bool>,
) -> (Arc<ReportPipeline>, PipelineHandles) {
    let config = config.sanitized();
    let (loss_tx, loss_rx) = mpsc::channel(config.queue_capacity);
    let (notice_tx, notice_rx) = mpsc::channel(config.queue_capacity);

    let dispatcher = Arc::new(NotificationDispatcher::new(
        deps.cache.clone(),
        deps.notices,
        deps.tokens,
        deps.push,
        deps.alerts,
    ));
    let reporter = Arc::new(LossReporter::new(deps.publisher.clone()));
    let sweeper = Arc::new(LivenessSweeper::new(deps.things.clone(), deps.cache.clone()));

    let handles = PipelineHandles {
        notify_worker: spawn_notify_worker(dispatcher, notice_rx, shutdown.clone()),
        loss_worker: spawn_loss_worker(reporter, loss_rx, shutdown.clone()),
        sweeper: spawn_sweeper(sweeper, config.sweep_period, shutdown),
    };

    let pipeline = Arc::new(ReportPipeline {
        things: deps.things,
        components: deps.components,
        cache: deps.cache.clone(),
        publisher: deps.publisher,
        tracker: SessionTracker::new(deps.cache),
        evaluator: ThresholdEvaluator::new(deps.thresholds, config.default_threshold),
        sink: deps.sink,
        commands: deps.commands,
        loss_tx,
        notice_tx,
    });
    (pipeline, handles)
}

/// 上报流水线：实现传输层的入站处理器。
pub struct ReportPipeline {
    things: Arc<dyn ThingStore>,
    components: Arc<dyn ComponentStore>,
    cache: Arc<dyn TtlCache>,
    publisher: Arc<dyn Publisher>,
    tracker: SessionTracker,
    evaluator: ThresholdEvaluator,
    sink: Arc<dyn MetricSink>,
    commands: Arc<CommandService>,
    loss_tx: mpsc::Sender<LossEvent>,
    notice_tx: mpsc::Sender<NoticeSend>,
}

impl ReportPipeline {
    /// 下发恢复上报命令（HTTP 层外部使用）。
    pub async fn publish_start(&self, thing: &str) -> Result<(), IngestError> {
        self.publisher
            .publish(&topics::start_topic(thing), Vec::new(), COMMAND_PUBLISH_TIMEOUT)
            .await
    }

    /// 下发停止上报命令。
    pub async fn publish_stop(&self, thing: &str) -> Result<(), IngestError> {
        self.publisher
            .publish(&topics::stop_topic(thing), Vec::new(), COMMAND_PUBLISH_TIMEOUT)
            .await
    }

    /// 未注册设备：带抑制标记（1 分钟）下发 stop，避免风暴。
    async fn suppress_unregistered(&self, thing: &str) {
        record_report_unregistered();
        let key = keys::stop_key(thing);
        let suppressed = match self.cache.get(&key).await {
            Ok(hit) => hit.is_some(),
            Err(err) => {
                warn!(target: "blue.pipeline", key = %key, "stop suppression read failed: {}", err);
                false
            }
        };
        if suppressed {
            debug!(target: "blue.pipeline", thing = %thing, "stop already sent, skipping");
            return;
        }
        match self.publish_stop(thing).await {
            Ok(()) => {
                record_stop_command_sent();
                info!(target: "blue.pipeline", thing = %thing, "stop_command_sent");
            }
            Err(err) => {
                warn!(target: "blue.pipeline", thing = %thing, "stop publish failed: {}", err);
            }
        }
        if let Err(err) = self.cache.set(&key, "1", ttl::STOP_SUPPRESS).await {
            warn!(target: "blue.pipeline", key = %key, "stop suppression write failed: {}", err);
        }
    }

    /// 刷新在线信号；持久化状态不在线时置为在线。
    async fn touch_liveness(&self, thing: &ThingRecord) {
        if let Err(err) = self
            .cache
            .set(&keys::status_key(&thing.name), "1", ttl::LIVENESS)
            .await
        {
            warn!(target: "blue.pipeline", thing = %thing.name, "liveness write failed: {}", err);
        }
        if !thing.online {
            if let Err(err) = self.things.update_status(&thing.id, true).await {
                warn!(target: "blue.pipeline", thing = %thing.name, "online transition failed: {}", err);
            } else {
                info!(target: "blue.pipeline", thing = %thing.name, "thing_online");
            }
        }
    }

    async fn persist(&self, sensor: &[SensorRecord], broadcast: &[SensorRecord]) {
        if !sensor.is_empty() {
            match self.sink.append_sensor(sensor).await {
                Ok(()) => record_records_persisted(sensor.len() as u64),
                Err(err) => {
                    warn!(target: "blue.pipeline", "sensor batch append failed: {}", err)
                }
            }
        }
        if !broadcast.is_empty() {
            match self.sink.append_broadcast(broadcast).await {
                Ok(()) => record_records_persisted(broadcast.len() as u64),
                Err(err) => {
                    warn!(target: "blue.pipeline", "broadcast batch append failed: {}", err)
                }
            }
        }
    }
}

#[async_trait]
impl InboundHandler for ReportPipeline {
    async fn on_report(&self, thing_name: &str, payload: &[u8]) -> Result<(), IngestError> {
        record_report_received();
        let thing = self
            .things
            .find_by_name(thing_name)
            .await
            .map_err(|err| IngestError::Handler(err.to_string()))?;
        let Some(thing) = thing else {
            self.suppress_unregistered(thing_name).await;
            return Ok(());
        };
        self.touch_liveness(&thing).await;

        let decoded = decode::decode_report(payload).inspect_err(|_| {
            record_report_dropped_invalid();
        })?;
        let reports: Vec<RawReport> = match decoded {
            DecodedReport::Session(report) => {
                if report.has_session() {
                    match self
                        .tracker
                        .track(thing_name, &report.session_id, report.seq)
                        .await
                    {
                        TrackOutcome::Stale => {
                            debug!(
                                target: "blue.pipeline",
                                thing = %thing_name,
                                session_id = %report.session_id,
                                seq = report.seq,
                                "stale report dropped"
                            );
                            return Ok(());
                        }
                        TrackOutcome::Accepted { loss } => {
                            if let Some(event) = loss {
                                record_loss_event();
                                if let Err(err) = self.loss_tx.try_send(event) {
                                    warn!(target: "blue.pipeline", "loss queue full, dropping: {}", err);
                                }
                            }
                        }
                    }
                }
                report.objs
            }
            DecodedReport::Single(report) => vec![report],
        };

        let mut sensor = Vec::new();
        let mut broadcast = Vec::new();
        for raw in &reports {
            let record = enrich(raw, &thing.project_id, thing_name);
            match record.kind() {
                ReportKind::Sensor => sensor.push(record),
                ReportKind::Broadcast => broadcast.push(record),
            }
        }
        self.persist(&sensor, &broadcast).await;

        for record in &sensor {
            for (metric, value, classification) in self.evaluator.evaluate(record).await {
                let item = NoticeSend {
                    record: record.clone(),
                    metric,
                    value,
                    classification,
                };
                if self.notice_tx.send(item).await.is_err() {
                    warn!(target: "blue.pipeline", "notice queue closed");
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    async fn on_collect(&self, gw_mac: &str, payload: &[u8]) -> Result<(), IngestError> {
        let info = decode::decode_collect(payload).inspect_err(|_| {
            record_report_dropped_invalid();
        })?;
        let mut records = Vec::new();
        for unit in &info.obj {
            let Some(kind) = ComponentKind::from_wire(&unit.dmac_type) else {
                warn!(target: "blue.pipeline", gw_mac = %gw_mac, dmac_type = %unit.dmac_type, "unknown dmac_type");
                continue;
            };
            let component = match self.components.find_by_mac(&unit.dmac, kind).await {
                Ok(Some(component)) => component,
                Ok(None) => {
                    warn!(target: "blue.pipeline", dmac = %unit.dmac, "component not registered");
                    continue;
                }
                Err(err) => {
                    warn!(target: "blue.pipeline", dmac = %unit.dmac, "component lookup failed: {}", err);
                    continue;
                }
            };
            let Ok(rssi) = unit.rssi.trim().parse::<f64>() else {
                warn!(target: "blue.pipeline", dmac = %unit.dmac, rssi = %unit.rssi, "invalid rssi");
                continue;
            };
            records.push(SensorRecord {
                project_id: component.project_id,
                device: unit.dmac.clone(),
                thing: gw_mac.to_string(),
                timestamp: now_epoch_ms(),
                rssi,
                temperature: None,
                humidity: None,
                device_name: String::new(),
                power: 0.0,
                data_type: Some("broadcast".to_string()),
                data: Some(unit.data.clone()),
            });
        }
        self.persist(&[], &records).await;
        Ok(())
    }

    async fn on_ack(&self, gw_mac: &str, payload: &[u8]) -> Result<(), IngestError> {
        let ack = decode::decode_ack(payload).inspect_err(|_| {
            record_report_dropped_invalid();
        })?;
        let Some(kind) = ComponentKind::from_wire(&ack.dmac_type) else {
            warn!(target: "blue.pipeline", gw_mac = %gw_mac, dmac_type = %ack.dmac_type, "ack with unknown dmac_type");
            return Ok(());
        };
        self.commands
            .apply_ack(&ack.dmac, kind, &ack.result)
            .await
            .map_err(|err| IngestError::Handler(err.to_string()))
    }
}

/// 补全一条原始报文：数值统一为 f64，打上项目与设备标识。
fn enrich(raw: &RawReport, project_id: &str, thing: &str) -> SensorRecord {
    SensorRecord {
        project_id: project_id.to_string(),
        device: raw.device.clone(),
        thing: thing.to_string(),
        timestamp: raw.timestamp,
        rssi: raw.rssi.as_ref().and_then(parse_metric).unwrap_or(0.0),
        temperature: raw.temperature.as_ref().and_then(parse_metric),
        humidity: raw.humidity.as_ref().and_then(parse_metric),
        device_name: raw.device_name.clone(),
        power: raw
            .power
            .as_deref()
            .and_then(parse_power)
            .unwrap_or(0.0),
        data_type: raw.data_type.clone(),
        data: raw.data.clone(),
    }
}

/// 电量上报带百分号后缀（如 "66%"），去掉后再解析。
fn parse_power(raw: &str) -> Option<f64> {
    raw.trim().trim_end_matches('%').parse::<f64>().ok()
}

fn now_epoch_ms() -> i64 {
    let now = std::time::SystemTime::now();
    let duration = now
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default();
    duration.as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use blue_cache::InMemoryTtlCache;
    use blue_storage::{
        ComponentRecord, InMemoryComponentStore, InMemoryMetricSink, InMemoryThingStore,
        InMemoryThresholdStore,
    };
    use std::sync::Mutex;

    struct RecordingPublisher {
        published: Mutex<Vec<(String, Vec<u8>)>>,
    }

    impl RecordingPublisher {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                published: Mutex::new(Vec::new()),
            })
        }

        fn topics(&self) -> Vec<String> {
            self.published
                .lock()
                .map(|p| p.iter().map(|(t, _)| t.clone()).collect())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl Publisher for RecordingPublisher {
        async fn publish(
            &self,
            topic: &str,
            payload: Vec<u8>,
            _timeout: Duration,
        ) -> Result<(), IngestError> {
            self.published
                .lock()
                .map_err(|_| IngestError::Publish("lock failed".to_string()))?
                .push((topic.to_string(), payload));
            Ok(())
        }
    }

    struct Fixture {
        pipeline: ReportPipeline,
        things: Arc<InMemoryThingStore>,
        sink: Arc<InMemoryMetricSink>,
        cache: Arc<InMemoryTtlCache>,
        publisher: Arc<RecordingPublisher>,
        loss_rx: mpsc::Receiver<LossEvent>,
        notice_rx: mpsc::Receiver<NoticeSend>,
    }

    fn fixture() -> Fixture {
        let things = Arc::new(InMemoryThingStore::with_things(vec![ThingRecord {
            id: "t-1".to_string(),
            name: "sensor-a".to_string(),
            project_id: "project-1".to_string(),
            online: false,
        }]));
        let components = Arc::new(InMemoryComponentStore::with_components(vec![
            ComponentRecord {
                id: "comp-1".to_string(),
                mac_addr: "AA:BB".to_string(),
                gw_mac_addr: "GW:01".to_string(),
                kind: ComponentKind::Beacon,
                project_id: "project-1".to_string(),
            },
        ]));
        let cache = Arc::new(InMemoryTtlCache::new());
        let sink = Arc::new(InMemoryMetricSink::new());
        let publisher = RecordingPublisher::new();
        let commands = Arc::new(CommandService::new(components.clone(), publisher.clone()));
        let (loss_tx, loss_rx) = mpsc::channel(8);
        let (notice_tx, notice_rx) = mpsc::channel(8);
        let pipeline = ReportPipeline {
            things: things.clone(),
            components,
            cache: cache.clone(),
            publisher: publisher.clone(),
            tracker: SessionTracker::new(cache.clone()),
            evaluator: ThresholdEvaluator::new(
                Arc::new(InMemoryThresholdStore::new()),
                PipelineConfig::default().default_threshold,
            ),
            sink: sink.clone(),
            commands,
            loss_tx,
            notice_tx,
        };
        Fixture {
            pipeline,
            things,
            sink,
            cache,
            publisher,
            loss_rx,
            notice_rx,
        }
    }

    #[tokio::test]
    async fn report_is_enriched_persisted_and_evaluated() {
        let mut f = fixture();
        let payload = br#"{"objs":[{"device":"dev-1","thing":"sensor-a","timestamp":1700000000,"temperature":"35.5","humidity":45,"rssi":-60,"power":"2.9"}],"session_id":"s1","seq":1}"#;
        f.pipeline
            .on_report("sensor-a", payload)
            .await
            .expect("report");

        let records = f.sink.sensor_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].project_id, "project-1");
        assert_eq!(records[0].temperature, Some(35.5));
        assert_eq!(records[0].humidity, Some(45.0));
        assert_eq!(records[0].rssi, -60.0);
        assert_eq!(records[0].power, 2.9);

        // 温度越上限、湿度在区间内，两条判定结果都入队
        let first = f.notice_rx.try_recv().expect("notice");
        assert_eq!(first.metric, domain::Metric::Temperature);
        assert_eq!(first.classification, domain::Classification::Above);
        let second = f.notice_rx.try_recv().expect("notice");
        assert_eq!(second.metric, domain::Metric::Humidity);
        assert_eq!(second.classification, domain::Classification::Within);

        // 设备被置为在线
        assert_eq!(f.things.list_online().await.expect("list").len(), 1);
    }

    #[tokio::test]
    async fn power_percent_suffix_is_parsed() {
        let mut f = fixture();
        let payload = br#"{"objs":[
            {"device":"dev-1","temperature":20,"power":"66%"},
            {"device":"dev-2","temperature":20,"power":"2.9"},
            {"device":"dev-3","temperature":20,"power":"low"}
        ],"session_id":"s1","seq":1}"#;
        f.pipeline
            .on_report("sensor-a", payload)
            .await
            .expect("report");

        let records = f.sink.sensor_records();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].power, 66.0);
        assert_eq!(records[1].power, 2.9);
        // 不可解析的电量回落为 0
        assert_eq!(records[2].power, 0.0);
        while f.notice_rx.try_recv().is_ok() {}
    }

    #[tokio::test]
    async fn session_gap_enqueues_loss_event() {
        let mut f = fixture();
        for seq in [1, 2] {
            let payload = format!(
                r#"{{"objs":[{{"device":"dev-1","temperature":20}}],"session_id":"s1","seq":{}}}"#,
                seq
            );
            f.pipeline
                .on_report("sensor-a", payload.as_bytes())
                .await
                .expect("report");
        }
        let payload = br#"{"objs":[{"device":"dev-1","temperature":20}],"session_id":"s1","seq":6}"#;
        f.pipeline
            .on_report("sensor-a", payload)
            .await
            .expect("report");

        let event = f.loss_rx.try_recv().expect("loss");
        assert_eq!(event.start_seq, 3);
        assert_eq!(event.end_seq, 5);
        assert!(f.loss_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn stale_report_is_dropped_entirely() {
        let mut f = fixture();
        let payload = br#"{"objs":[{"device":"dev-1","temperature":35}],"session_id":"s1","seq":5}"#;
        f.pipeline
            .on_report("sensor-a", payload)
            .await
            .expect("report");
        assert_eq!(f.sink.sensor_records().len(), 1);
        let _ = f.notice_rx.try_recv();

        f.pipeline
            .on_report("sensor-a", payload)
            .await
            .expect("report");
        assert_eq!(f.sink.sensor_records().len(), 1);
        assert!(f.notice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn sessionless_report_bypasses_tracker() {
        let mut f = fixture();
        let payload = br#"{"device":"dev-1","temperature":20,"humidity":45}"#;
        f.pipeline
            .on_report("sensor-a", payload)
            .await
            .expect("report");
        f.pipeline
            .on_report("sensor-a", payload)
            .await
            .expect("report");

        assert_eq!(f.sink.sensor_records().len(), 2);
        assert!(f.loss_rx.try_recv().is_err());
        let _ = f.notice_rx.try_recv();
    }

    #[tokio::test]
    async fn unregistered_thing_gets_stop_once() {
        let f = fixture();
        let payload = br#"{"device":"dev-1","temperature":20}"#;
        f.pipeline
            .on_report("ghost", payload)
            .await
            .expect("report");
        f.pipeline
            .on_report("ghost", payload)
            .await
            .expect("report");

        // 抑制窗口内只下发一次 stop
        assert_eq!(
            f.publisher.topics(),
            vec!["things/ghost/reports/stop".to_string()]
        );
        assert!(f.sink.sensor_records().is_empty());
        assert!(
            f.cache
                .get(&keys::stop_key("ghost"))
                .await
                .expect("get")
                .is_some()
        );
    }

    #[tokio::test]
    async fn malformed_report_is_counted_and_dropped() {
        let f = fixture();
        let err = f
            .pipeline
            .on_report("sensor-a", b"not json")
            .await
            .expect_err("decode failure");
        assert!(matches!(err, IngestError::Decode(_)));
        assert!(f.sink.sensor_records().is_empty());
    }

    #[tokio::test]
    async fn broadcast_reports_split_from_sensor() {
        let mut f = fixture();
        let payload = br#"{"objs":[{"device":"dev-1","temperature":20},{"device":"dev-2","data_type":"broadcast","data":"00ff","rssi":-70}],"session_id":"s1","seq":1}"#;
        f.pipeline
            .on_report("sensor-a", payload)
            .await
            .expect("report");

        assert_eq!(f.sink.sensor_records().len(), 1);
        let broadcast = f.sink.broadcast_records();
        assert_eq!(broadcast.len(), 1);
        assert_eq!(broadcast[0].data.as_deref(), Some("00ff"));
        // 广播记录不参与阈值判定
        let notice = f.notice_rx.try_recv().expect("notice");
        assert_eq!(notice.record.device, "dev-1");
        assert!(f.notice_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn collect_resolves_components_and_persists_broadcast() {
        let f = fixture();
        let payload = br#"{"msg":"adv_data_ind","gmac":"GW:01","obj":[
            {"dmac_type":"0","dmac":"AA:BB","rssi":"-61","data":"00ff"},
            {"dmac_type":"0","dmac":"ZZ:ZZ","rssi":"-50","data":"aa"},
            {"dmac_type":"0","dmac":"AA:BB","rssi":"bad","data":"bb"}
        ]}"#;
        f.pipeline
            .on_collect("GW:01", payload)
            .await
            .expect("collect");

        let records = f.sink.broadcast_records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].project_id, "project-1");
        assert_eq!(records[0].device, "AA:BB");
        assert_eq!(records[0].rssi, -61.0);
        assert_eq!(records[0].thing, "GW:01");
    }

    #[tokio::test]
    async fn ack_routes_to_command_service() {
        let f = fixture();
        // 先造一个待回执的命令
        f.pipeline
            .commands
            .request("comp-1", "cfg".to_string(), "pw".to_string())
            .await
            .expect("request");

        let payload = br#"{"msg":"config_beacon_resp","dmac_type":"0","dmac":"AA:BB","result":"0"}"#;
        f.pipeline
            .on_ack("GW:01", payload)
            .await
            .expect("ack");

        let detail = f
            .pipeline
            .commands
            .status("comp-1")
            .await
            .expect("status")
            .expect("detail");
        assert_eq!(detail.status, domain::CommandStatus::Success);
        assert_eq!(detail.applied_data, "cfg");
    }
}
