//! 设备在线状态扫描
//!
//! 上报路径只负责置为在线；扫描器是唯一把持久化状态置为离线的
//! 地方。缓存故障时跳过该设备，避免一次后端抖动把全部设备打离线。

use crate::PipelineError;
use blue_cache::{keys, TtlCache};
use blue_storage::ThingStore;
use blue_telemetry::record_thing_marked_offline;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

/// 在线状态扫描器。
pub struct LivenessSweeper {
    things: Arc<dyn ThingStore>,
    cache: Arc<dyn TtlCache>,
}

impl LivenessSweeper {
    pub fn new(things: Arc<dyn ThingStore>, cache: Arc<dyn TtlCache>) -> Self {
        Self { things, cache }
    }

    /// 单轮扫描：持久化在线但缓存信号缺失的设备置为离线。
    pub async fn sweep_once(&self) -> Result<(), PipelineError> {
        let online = self
            .things
            .list_online()
            .await
            .map_err(|err| PipelineError::Sweep(err.to_string()))?;
        for thing in online {
            let key = keys::status_key(&thing.name);
            match self.cache.get(&key).await {
                Ok(Some(_)) => {}
                Ok(None) => {
                    if let Err(err) = self.things.update_status(&thing.id, false).await {
                        warn!(
                            target: "blue.pipeline",
                            thing = %thing.name,
                            "offline transition failed: {}",
                            err
                        );
                        continue;
                    }
                    record_thing_marked_offline();
                    info!(target: "blue.pipeline", thing = %thing.name, "thing_offline");
                }
                Err(err) => {
                    warn!(
                        target: "blue.pipeline",
                        thing = %thing.name,
                        "liveness read failed, skipping: {}",
                        err
                    );
                }
            }
        }
        Ok(())
    }
}

/// 周期扫描任务：单轮失败记日志后按周期继续。
pub fn spawn_sweeper(
    sweeper: Arc<LivenessSweeper>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = ticker.tick() => {
                    if let Err(err) = sweeper.sweep_once().await {
                        warn!(target: "blue.pipeline", "sweep cycle failed: {}", err);
                    }
                }
            }
        }
    })
}
