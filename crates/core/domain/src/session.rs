//! 会话连续性模型。

use serde::Serialize;

/// 一段连续丢失的序号区间（左右闭区间）。
///
/// 线上格式为 `{sess_id, seq_start, seq_end}`。上游 Go 实现中
/// `seq_end` 的 JSON 标签与 `seq_start` 重复，导致两个字段都被
/// encoding/json 丢弃，这里按修正后的格式输出。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LossEvent {
    #[serde(skip)]
    pub thing: String,
    #[serde(rename = "sess_id")]
    pub session_id: String,
    #[serde(rename = "seq_start")]
    pub start_seq: i64,
    #[serde(rename = "seq_end")]
    pub end_seq: i64,
}

/// 会话跟踪结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TrackOutcome {
    /// 接受本条报文；检测到缺口时附带一个丢包事件。
    Accepted { loss: Option<LossEvent> },
    /// 序号不大于游标：重放或乱序重复，丢弃。
    Stale,
}

impl TrackOutcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, TrackOutcome::Accepted { .. })
    }
}
