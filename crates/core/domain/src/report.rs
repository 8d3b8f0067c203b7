//! 遥测报文与入库记录模型。

use serde::{Deserialize, Serialize};

/// 记录类别：传感数据或广播数据。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    Sensor,
    Broadcast,
}

impl ReportKind {
    /// 按报文 `data_type` 字段解析，缺省按传感数据处理。
    pub fn from_wire(data_type: Option<&str>) -> Self {
        match data_type {
            Some("broadcast") => ReportKind::Broadcast,
            _ => ReportKind::Sensor,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Sensor => "sensor",
            ReportKind::Broadcast => "broadcast",
        }
    }
}

/// 单条上报报文（线上格式）。
///
/// 数值字段在不同固件版本里既可能是 JSON 数字也可能是字符串，
/// 这里保留原始值，入库前统一解析为 f64。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReport {
    #[serde(default)]
    pub device: String,
    #[serde(default)]
    pub thing: String,
    #[serde(default)]
    pub timestamp: i64,
    #[serde(default)]
    pub rssi: Option<serde_json::Value>,
    #[serde(default)]
    pub temperature: Option<serde_json::Value>,
    #[serde(default)]
    pub humidity: Option<serde_json::Value>,
    #[serde(default)]
    pub device_name: String,
    #[serde(default)]
    pub power: Option<String>,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub data: Option<String>,
}

/// 带会话的批量上报：对象数组外加会话 ID 和单调递增序号。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionReport {
    #[serde(default)]
    pub objs: Vec<RawReport>,
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub seq: i64,
}

impl SessionReport {
    pub fn has_session(&self) -> bool {
        !self.session_id.is_empty()
    }
}

/// 校验并补全后的记录（统一 f64 表示）。
///
/// 解析失败的指标保持 `None`：既不触发也不清除告警。
#[derive(Debug, Clone, Serialize)]
pub struct SensorRecord {
    pub project_id: String,
    pub device: String,
    pub thing: String,
    pub timestamp: i64,
    pub rssi: f64,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub device_name: String,
    pub power: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

impl SensorRecord {
    pub fn kind(&self) -> ReportKind {
        ReportKind::from_wire(self.data_type.as_deref())
    }
}

/// 从 JSON 数字或字符串解析指标值。
pub fn parse_metric(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_kind_defaults_to_sensor() {
        assert_eq!(ReportKind::from_wire(None), ReportKind::Sensor);
        assert_eq!(ReportKind::from_wire(Some("sensor")), ReportKind::Sensor);
        assert_eq!(
            ReportKind::from_wire(Some("broadcast")),
            ReportKind::Broadcast
        );
    }

    #[test]
    fn parse_metric_accepts_number_and_string() {
        assert_eq!(parse_metric(&serde_json::json!(23.5)), Some(23.5));
        assert_eq!(parse_metric(&serde_json::json!("23.5")), Some(23.5));
        assert_eq!(parse_metric(&serde_json::json!("-61")), Some(-61.0));
        assert_eq!(parse_metric(&serde_json::json!("abc")), None);
        assert_eq!(parse_metric(&serde_json::json!([1])), None);
    }
}
