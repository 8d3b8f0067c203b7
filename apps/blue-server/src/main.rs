//! 服务入口
//!
//! 装配顺序：配置 → 日志 → 存储/缓存 → MQTT 发布端 → 命令服务 →
//! 流水线与工作器 → MQTT 订阅端 → HTTP 运维面。
//! 启动期任何一步失败直接退出；稳态故障由各层自行降级。

mod handlers;
mod routes;

use axum::{
    body::Body,
    http::{HeaderValue, Request},
    middleware::{self, Next},
    response::Response,
};
use blue_cache::{InMemoryTtlCache, RedisTtlCache, TtlCache};
use blue_config::AppConfig;
use blue_control::CommandService;
use blue_ingest::{InboundHandler, MqttConfig, MqttPublisher, MqttSource, Publisher};
use blue_notify::{
    AlertPublisher, HttpPushNotifier, MqttAlertPublisher, NoopPushNotifier, PushConfig,
    PushNotifier,
};
use blue_pipeline::{build, PipelineConfig, PipelineDeps};
use blue_storage::{
    connect_pool, PgComponentStore, PgDeviceTokenStore, PgMetricSink, PgNoticeStore, PgThingStore,
    PgThresholdStore,
};
use blue_telemetry::{init_tracing, new_request_ids};
use domain::Threshold;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::Instrument;

#[derive(Clone)]
pub struct AppState {
    pub commands: Arc<CommandService>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 加载本地 .env（如存在），便于直接 cargo run 启动
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    init_tracing();

    let pool = connect_pool(&config.database_url).await?;
    let things = Arc::new(PgThingStore::new(pool.clone()));
    let thresholds = Arc::new(PgThresholdStore::new(pool.clone()));
    let notices = Arc::new(PgNoticeStore::new(pool.clone()));
    let components = Arc::new(PgComponentStore::new(pool.clone()));
    let tokens = Arc::new(PgDeviceTokenStore::new(pool.clone()));
    let sink = Arc::new(PgMetricSink::new(pool));

    // Redis 未配置时退化为进程内缓存（单实例部署可用）
    let cache: Arc<dyn TtlCache> = match &config.redis_url {
        Some(url) => Arc::new(RedisTtlCache::connect(url)?),
        None => Arc::new(InMemoryTtlCache::new()),
    };

    let mqtt = MqttConfig {
        host: config.mqtt_host.clone(),
        port: config.mqtt_port,
        username: config.mqtt_username.clone(),
        password: config.mqtt_password.clone(),
    };
    let (publisher, _publish_loop) = MqttPublisher::connect(mqtt.clone());
    let publisher: Arc<dyn Publisher> = Arc::new(publisher);

    let push: Arc<dyn PushNotifier> = match (
        &config.push_url,
        &config.push_app_key,
        &config.push_master_secret,
    ) {
        (Some(url), Some(app_key), Some(master_secret)) => {
            Arc::new(HttpPushNotifier::new(PushConfig {
                url: url.clone(),
                app_key: app_key.clone(),
                master_secret: master_secret.clone(),
            }))
        }
        _ => Arc::new(NoopPushNotifier),
    };
    let alerts: Arc<dyn AlertPublisher> = Arc::new(MqttAlertPublisher::new(publisher.clone()));
    let commands = Arc::new(CommandService::new(components.clone(), publisher.clone()));

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let pipeline_config = PipelineConfig {
        queue_capacity: config.queue_capacity,
        default_threshold: Threshold {
            temp_min: config.default_temp_min,
            temp_max: config.default_temp_max,
            hum_min: config.default_hum_min,
            hum_max: config.default_hum_max,
        },
        sweep_period: Duration::from_secs(config.sweep_period_seconds),
    };
    let deps = PipelineDeps {
        things,
        components,
        thresholds,
        notices,
        tokens,
        sink,
        cache,
        publisher,
        push,
        alerts,
        commands: commands.clone(),
    };
    let (pipeline, _workers) = build(deps, pipeline_config, shutdown_rx);

    if config.ingest_enabled {
        // 建连/订阅失败属于启动期致命错误，直接退出
        let source = MqttSource::new(mqtt).subscribe().await?;
        let handler: Arc<dyn InboundHandler> = pipeline;
        tokio::spawn(source.run(handler));
    }

    let state = AppState { commands };
    let app = routes::create_router(config.control_enabled)
        .with_state(state)
        // 注入 request_id/trace_id
        .layer(middleware::from_fn(request_context));

    let listener = tokio::net::TcpListener::bind(&config.http_addr).await?;
    tracing::info!(target: "blue.server", addr = %config.http_addr, "listening");
    axum::serve(listener, app).await?;

    let _ = shutdown_tx.send(true);
    Ok(())
}

async fn request_context(mut req: Request<Body>, next: Next) -> Response {
    let ids = new_request_ids();
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    req.extensions_mut().insert(ids.clone());

    let span = tracing::info_span!(
        "request",
        request_id = %ids.request_id,
        trace_id = %ids.trace_id,
        method = %method,
        path = %path
    );

    let mut response = next.run(req).instrument(span).await;
    response.headers_mut().insert(
        "x-request-id",
        HeaderValue::from_str(&ids.request_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response.headers_mut().insert(
        "x-trace-id",
        HeaderValue::from_str(&ids.trace_id).unwrap_or_else(|_| HeaderValue::from_static("")),
    );
    response
}
