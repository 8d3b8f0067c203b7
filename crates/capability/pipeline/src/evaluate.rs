//! 阈值判定
//!
//! 设备级覆盖优先，否则用进程级默认；存储读失败降级为默认阈值。

use blue_storage::ThresholdStore;
use domain::{Classification, Metric, SensorRecord, Threshold};
use std::sync::Arc;
use tracing::warn;

/// 阈值判定器。
pub struct ThresholdEvaluator {
    store: Arc<dyn ThresholdStore>,
    default: Threshold,
}

impl ThresholdEvaluator {
    pub fn new(store: Arc<dyn ThresholdStore>, default: Threshold) -> Self {
        Self { store, default }
    }

    /// 解析某设备生效的阈值。
    pub async fn resolve(&self, project_id: &str, device: &str) -> Threshold {
        match self.store.find(project_id, device).await {
            Ok(Some(threshold)) => threshold,
            Ok(None) => self.default,
            Err(err) => {
                warn!(
                    target: "blue.pipeline",
                    project_id = %project_id,
                    device = %device,
                    "threshold read failed, using default: {}",
                    err
                );
                self.default
            }
        }
    }

    /// 判定一条记录里出现的全部指标；解析失败（缺失）的指标跳过。
    pub async fn evaluate(&self, record: &SensorRecord) -> Vec<(Metric, f64, Classification)> {
        let threshold = self.resolve(&record.project_id, &record.device).await;
        let mut results = Vec::with_capacity(2);
        for (metric, value) in [
            (Metric::Temperature, record.temperature),
            (Metric::Humidity, record.humidity),
        ] {
            let Some(value) = value else { continue };
            let (min, max) = threshold.bounds(metric);
            results.push((metric, value, Threshold::classify_value(value, min, max)));
        }
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use blue_storage::{InMemoryThresholdStore, ThresholdRecord};

    fn default_threshold() -> Threshold {
        Threshold {
            temp_min: 0.0,
            temp_max: 30.0,
            hum_min: 30.0,
            hum_max: 60.0,
        }
    }

    fn record(temperature: Option<f64>, humidity: Option<f64>) -> SensorRecord {
        SensorRecord {
            project_id: "project-1".to_string(),
            device: "dev-1".to_string(),
            thing: "t1".to_string(),
            timestamp: 1,
            rssi: -60.0,
            temperature,
            humidity,
            device_name: "sensor".to_string(),
            power: 3.0,
            data_type: None,
            data: None,
        }
    }

    #[tokio::test]
    async fn default_applies_without_override() {
        let store = Arc::new(InMemoryThresholdStore::new());
        let evaluator = ThresholdEvaluator::new(store, default_threshold());
        let results = evaluator.evaluate(&record(Some(35.0), Some(45.0))).await;
        assert_eq!(
            results,
            vec![
                (Metric::Temperature, 35.0, Classification::Above),
                (Metric::Humidity, 45.0, Classification::Within),
            ]
        );
    }

    #[tokio::test]
    async fn override_takes_precedence() {
        let store = Arc::new(InMemoryThresholdStore::new());
        store.insert(ThresholdRecord {
            project_id: "project-1".to_string(),
            device: "dev-1".to_string(),
            threshold: Threshold {
                temp_min: -20.0,
                temp_max: 50.0,
                hum_min: 30.0,
                hum_max: 60.0,
            },
        });
        let evaluator = ThresholdEvaluator::new(store, default_threshold());
        let results = evaluator.evaluate(&record(Some(35.0), None)).await;
        assert_eq!(
            results,
            vec![(Metric::Temperature, 35.0, Classification::Within)]
        );
    }

    #[tokio::test]
    async fn boundary_values() {
        let store = Arc::new(InMemoryThresholdStore::new());
        let evaluator = ThresholdEvaluator::new(store, default_threshold());
        // max 不含、min 含
        let results = evaluator.evaluate(&record(Some(30.0), Some(30.0))).await;
        assert_eq!(
            results,
            vec![
                (Metric::Temperature, 30.0, Classification::Above),
                (Metric::Humidity, 30.0, Classification::Within),
            ]
        );
        let results = evaluator.evaluate(&record(Some(-0.5), Some(29.9))).await;
        assert_eq!(
            results,
            vec![
                (Metric::Temperature, -0.5, Classification::Below),
                (Metric::Humidity, 29.9, Classification::Below),
            ]
        );
    }

    #[tokio::test]
    async fn missing_metrics_are_skipped() {
        let store = Arc::new(InMemoryThresholdStore::new());
        let evaluator = ThresholdEvaluator::new(store, default_threshold());
        assert!(evaluator.evaluate(&record(None, None)).await.is_empty());
    }
}
