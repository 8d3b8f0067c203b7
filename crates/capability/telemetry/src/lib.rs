//! 追踪与请求 ID 生成。

use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::{EnvFilter, fmt};

/// 请求级追踪标识。
#[derive(Debug, Clone)]
pub struct RequestIds {
    pub request_id: String,
    pub trace_id: String,
}

/// 管道指标快照。
#[derive(Debug, Clone, Copy, Default)]
pub struct MetricsSnapshot {
    pub reports_received: u64,
    pub reports_dropped_invalid: u64,
    pub reports_unregistered: u64,
    pub records_persisted: u64,
    pub loss_events: u64,
    pub loss_published: u64,
    pub alerts_sent: u64,
    pub clears_sent: u64,
    pub alerts_suppressed: u64,
    pub notify_failures: u64,
    pub things_marked_offline: u64,
    pub stop_commands_sent: u64,
    pub commands_issued: u64,
    pub acks_applied: u64,
    pub acks_unknown_component: u64,
}

/// 管道指标。
pub struct TelemetryMetrics {
    reports_received: AtomicU64,
    reports_dropped_invalid: AtomicU64,
    reports_unregistered: AtomicU64,
    records_persisted: AtomicU64,
    loss_events: AtomicU64,
    loss_published: AtomicU64,
    alerts_sent: AtomicU64,
    clears_sent: AtomicU64,
    alerts_suppressed: AtomicU64,
    notify_failures: AtomicU64,
    things_marked_offline: AtomicU64,
    stop_commands_sent: AtomicU64,
    commands_issued: AtomicU64,
    acks_applied: AtomicU64,
    acks_unknown_component: AtomicU64,
}

impl TelemetryMetrics {
    pub fn new() -> Self {
        Self {
            reports_received: AtomicU64::new(0),
            reports_dropped_invalid: AtomicU64::new(0),
            reports_unregistered: AtomicU64::new(0),
            records_persisted: AtomicU64::new(0),
            loss_events: AtomicU64::new(0),
            loss_published: AtomicU64::new(0),
            alerts_sent: AtomicU64::new(0),
            clears_sent: AtomicU64::new(0),
            alerts_suppressed: AtomicU64::new(0),
            notify_failures: AtomicU64::new(0),
            things_marked_offline: AtomicU64::new(0),
            stop_commands_sent: AtomicU64::new(0),
            commands_issued: AtomicU64::new(0),
            acks_applied: AtomicU64::new(0),
            acks_unknown_component: AtomicU64::new(0),
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            reports_received: self.reports_received.load(Ordering::Relaxed),
            reports_dropped_invalid: self.reports_dropped_invalid.load(Ordering::Relaxed),
            reports_unregistered: self.reports_unregistered.load(Ordering::Relaxed),
            records_persisted: self.records_persisted.load(Ordering::Relaxed),
            loss_events: self.loss_events.load(Ordering::Relaxed),
            loss_published: self.loss_published.load(Ordering::Relaxed),
            alerts_sent: self.alerts_sent.load(Ordering::Relaxed),
            clears_sent: self.clears_sent.load(Ordering::Relaxed),
            alerts_suppressed: self.alerts_suppressed.load(Ordering::Relaxed),
            notify_failures: self.notify_failures.load(Ordering::Relaxed),
            things_marked_offline: self.things_marked_offline.load(Ordering::Relaxed),
            stop_commands_sent: self.stop_commands_sent.load(Ordering::Relaxed),
            commands_issued: self.commands_issued.load(Ordering::Relaxed),
            acks_applied: self.acks_applied.load(Ordering::Relaxed),
            acks_unknown_component: self.acks_unknown_component.load(Ordering::Relaxed),
        }
    }
}

static METRICS: OnceLock<TelemetryMetrics> = OnceLock::new();

/// 获取全局指标实例。
pub fn metrics() -> &'static TelemetryMetrics {
    METRICS.get_or_init(TelemetryMetrics::new)
}

/// 初始化 tracing（默认 info）。
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).try_init();
}

/// 生成新的 request_id 与 trace_id。
pub fn new_request_ids() -> RequestIds {
    RequestIds {
        request_id: uuid::Uuid::new_v4().to_string(),
        trace_id: uuid::Uuid::new_v4().to_string(),
    }
}

/// 记录收到的上报报文次数。
pub fn record_report_received() {
    metrics().reports_received.fetch_add(1, Ordering::Relaxed);
}

/// 记录解析失败丢弃的报文次数。
pub fn record_report_dropped_invalid() {
    metrics()
        .reports_dropped_invalid
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录未注册设备的报文次数。
pub fn record_report_unregistered() {
    metrics()
        .reports_unregistered
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录写入时序库的记录条数。
pub fn record_records_persisted(count: u64) {
    metrics()
        .records_persisted
        .fetch_add(count, Ordering::Relaxed);
}

/// 记录检测到的丢包事件次数。
pub fn record_loss_event() {
    metrics().loss_events.fetch_add(1, Ordering::Relaxed);
}

/// 记录丢包事件发布成功次数。
pub fn record_loss_published() {
    metrics().loss_published.fetch_add(1, Ordering::Relaxed);
}

/// 记录越界告警发送次数。
pub fn record_alert_sent() {
    metrics().alerts_sent.fetch_add(1, Ordering::Relaxed);
}

/// 记录恢复通知发送次数。
pub fn record_clear_sent() {
    metrics().clears_sent.fetch_add(1, Ordering::Relaxed);
}

/// 记录去重抑制的告警次数。
pub fn record_alert_suppressed() {
    metrics().alerts_suppressed.fetch_add(1, Ordering::Relaxed);
}

/// 记录通知发送失败次数。
pub fn record_notify_failure() {
    metrics().notify_failures.fetch_add(1, Ordering::Relaxed);
}

/// 记录被扫描标记为离线的设备次数。
pub fn record_thing_marked_offline() {
    metrics()
        .things_marked_offline
        .fetch_add(1, Ordering::Relaxed);
}

/// 记录下发 stop 命令次数。
pub fn record_stop_command_sent() {
    metrics().stop_commands_sent.fetch_add(1, Ordering::Relaxed);
}

/// 记录配置命令下发次数。
pub fn record_command_issued() {
    metrics().commands_issued.fetch_add(1, Ordering::Relaxed);
}

/// 记录回执成功落库次数。
pub fn record_ack_applied() {
    metrics().acks_applied.fetch_add(1, Ordering::Relaxed);
}

/// 记录找不到组件的回执次数。
pub fn record_ack_unknown_component() {
    metrics()
        .acks_unknown_component
        .fetch_add(1, Ordering::Relaxed);
}
