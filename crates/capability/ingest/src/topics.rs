//! MQTT 主题语法
//!
//! 入站三类：设备上报、网关广播采集、网关命令回执。
//! 出站主题由构建函数拼接，调用方不手写字符串。

/// 设备上报订阅过滤器。
pub const REPORT_FILTER: &str = "things/+/reports";

/// 网关广播采集订阅过滤器。
pub const COLLECT_FILTER: &str = "/GW/+/status";

/// 网关命令回执订阅过滤器。
pub const ACK_FILTER: &str = "/GW/+/action/response";

/// 入站主题分类结果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundTopic {
    Report { thing: String },
    Collect { gw_mac: String },
    Ack { gw_mac: String },
}

/// 解析入站主题；不认识的主题返回 `None`，调用方记日志后跳过。
pub fn classify(topic: &str) -> Option<InboundTopic> {
    let parts: Vec<&str> = topic.trim_matches('/').split('/').collect();
    match parts.as_slice() {
        ["things", thing, "reports"] if !thing.is_empty() => Some(InboundTopic::Report {
            thing: (*thing).to_string(),
        }),
        ["GW", gw_mac, "status"] if !gw_mac.is_empty() => Some(InboundTopic::Collect {
            gw_mac: (*gw_mac).to_string(),
        }),
        ["GW", gw_mac, "action", "response"] if !gw_mac.is_empty() => Some(InboundTopic::Ack {
            gw_mac: (*gw_mac).to_string(),
        }),
        _ => None,
    }
}

/// 丢包事件主题。
pub fn loss_topic(thing: &str) -> String {
    format!("things/{}/loss", thing)
}

/// 停止上报命令主题。
pub fn stop_topic(thing: &str) -> String {
    format!("things/{}/reports/stop", thing)
}

/// 恢复上报命令主题。
pub fn start_topic(thing: &str) -> String {
    format!("things/{}/reports/start", thing)
}

/// 网关配置命令下发主题。
pub fn action_topic(gw_mac: &str) -> String {
    format!("/GW/{}/action", gw_mac)
}

/// 项目告警主题。
pub fn alert_topic(project_id: &str) -> String {
    format!("alerts/{}", project_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_report_topic() {
        assert_eq!(
            classify("things/sensor-a/reports"),
            Some(InboundTopic::Report {
                thing: "sensor-a".to_string()
            })
        );
    }

    #[test]
    fn classify_gateway_topics() {
        assert_eq!(
            classify("/GW/00-50-56-C0-00-01/status"),
            Some(InboundTopic::Collect {
                gw_mac: "00-50-56-C0-00-01".to_string()
            })
        );
        assert_eq!(
            classify("/GW/00-50-56-C0-00-01/action/response"),
            Some(InboundTopic::Ack {
                gw_mac: "00-50-56-C0-00-01".to_string()
            })
        );
    }

    #[test]
    fn classify_rejects_unknown_topics() {
        assert_eq!(classify("things/sensor-a/reports/stop"), None);
        assert_eq!(classify("/GW/mac/action"), None);
        assert_eq!(classify("things//reports"), None);
        assert_eq!(classify("other/topic"), None);
    }

    #[test]
    fn outbound_topic_shapes() {
        assert_eq!(loss_topic("t1"), "things/t1/loss");
        assert_eq!(stop_topic("t1"), "things/t1/reports/stop");
        assert_eq!(start_topic("t1"), "things/t1/reports/start");
        assert_eq!(action_topic("mac-1"), "/GW/mac-1/action");
        assert_eq!(alert_topic("p1"), "alerts/p1");
    }
}
