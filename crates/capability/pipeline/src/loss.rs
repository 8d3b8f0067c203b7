//! 丢包事件上报
//!
//! 尽力而为：发布失败只记日志，不重试。

use crate::PipelineError;
use blue_ingest::{topics, Publisher, EVENT_PUBLISH_TIMEOUT};
use blue_telemetry::record_loss_published;
use domain::LossEvent;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{info, warn};

/// 丢包上报器。
pub struct LossReporter {
    publisher: Arc<dyn Publisher>,
}

impl LossReporter {
    pub fn new(publisher: Arc<dyn Publisher>) -> Self {
        Self { publisher }
    }

    pub async fn report(&self, event: &LossEvent) -> Result<(), PipelineError> {
        let payload =
            serde_json::to_vec(event).map_err(|err| PipelineError::Loss(err.to_string()))?;
        self.publisher
            .publish(&topics::loss_topic(&event.thing), payload, EVENT_PUBLISH_TIMEOUT)
            .await
            .map_err(|err| PipelineError::Loss(err.to_string()))?;
        record_loss_published();
        info!(
            target: "blue.pipeline",
            thing = %event.thing,
            session_id = %event.session_id,
            start_seq = event.start_seq,
            end_seq = event.end_seq,
            "loss_published"
        );
        Ok(())
    }
}

/// 丢包工作器。
pub fn spawn_loss_worker(
    reporter: Arc<LossReporter>,
    mut receiver: mpsc::Receiver<LossEvent>,
    mut shutdown: watch::Receiver<bool>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::select! {
                _ = shutdown.changed() => break,
                event = receiver.recv() => {
                    let Some(event) = event else { break };
                    if let Err(err) = reporter.report(&event).await {
                        warn!(target: "blue.pipeline", thing = %event.thing, "loss publish failed: {}", err);
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
    use blue_ingest::IngestError;
    use std::sync::Mutex;
    use std::time::Duration;

    struct RecordingPublisher {
        published: Mutex<Vec<(String, Vec<u8>)>>,
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

    #[tokio::test]
    async fn loss_wire_shape() {
        let publisher = Arc::new(RecordingPublisher {
            published: Mutex::new(Vec::new()),
        });
        let reporter = LossReporter::new(publisher.clone());
        reporter
            .report(&LossEvent {
                thing: "t1".to_string(),
                session_id: "s1".to_string(),
                start_seq: 4,
                end_seq: 6,
            })
            .await
            .expect("report");

        let published = publisher.published.lock().expect("lock");
        assert_eq!(published[0].0, "things/t1/loss");
        let body: serde_json::Value = serde_json::from_slice(&published[0].1).expect("json");
        assert_eq!(body["sess_id"], "s1");
        assert_eq!(body["seq_start"], 4);
        assert_eq!(body["seq_end"], 6);
        // thing 只用于主题，不进线上负载
        assert!(body.get("thing").is_none());
    }
}
