//! 入站报文解码
//!
//! 解码失败一律丢弃并记日志，不影响后续报文。

use crate::IngestError;
use domain::{RawReport, SessionReport};
use serde::Deserialize;

/// 广播采集报文的 `msg` 标识。
pub const COLLECT_MSG: &str = "adv_data_ind";

/// 上报解码结果：带会话的批量或单条。
#[derive(Debug, Clone)]
pub enum DecodedReport {
    Session(SessionReport),
    Single(RawReport),
}

/// 网关广播采集单元。
#[derive(Debug, Clone, Deserialize)]
pub struct CollectUnit {
    #[serde(default)]
    pub dmac_type: String,
    #[serde(default)]
    pub dmac: String,
    #[serde(default)]
    pub rssi: String,
    #[serde(default)]
    pub data: String,
}

/// 网关广播采集报文。
#[derive(Debug, Clone, Deserialize)]
pub struct CollectInfo {
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub gmac: String,
    #[serde(default)]
    pub obj: Vec<CollectUnit>,
}

/// 网关命令回执报文。
#[derive(Debug, Clone, Deserialize)]
pub struct AckMessage {
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub dmac_type: String,
    #[serde(default)]
    pub dmac: String,
    #[serde(default)]
    pub result: String,
}

/// 解码设备上报：对象里带 `objs` 字段的按会话批量处理，否则按单条。
pub fn decode_report(payload: &[u8]) -> Result<DecodedReport, IngestError> {
    let value: serde_json::Value =
        serde_json::from_slice(payload).map_err(|err| IngestError::Decode(err.to_string()))?;
    if value.get("objs").is_some() {
        let report: SessionReport = serde_json::from_value(value)
            .map_err(|err| IngestError::Decode(err.to_string()))?;
        Ok(DecodedReport::Session(report))
    } else {
        let report: RawReport = serde_json::from_value(value)
            .map_err(|err| IngestError::Decode(err.to_string()))?;
        Ok(DecodedReport::Single(report))
    }
}

/// 解码网关广播采集；`msg` 不是 `adv_data_ind` 视为非法。
pub fn decode_collect(payload: &[u8]) -> Result<CollectInfo, IngestError> {
    if payload.is_empty() {
        return Err(IngestError::Decode("empty payload".to_string()));
    }
    let info: CollectInfo =
        serde_json::from_slice(payload).map_err(|err| IngestError::Decode(err.to_string()))?;
    if info.msg != COLLECT_MSG {
        return Err(IngestError::Decode(format!("unexpected msg: {}", info.msg)));
    }
    Ok(info)
}

/// 解码命令回执。
pub fn decode_ack(payload: &[u8]) -> Result<AckMessage, IngestError> {
    serde_json::from_slice(payload).map_err(|err| IngestError::Decode(err.to_string()))
}
