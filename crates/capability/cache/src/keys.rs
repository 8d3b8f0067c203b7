//! 缓存键构造（与上游实现保持一致的键形状）。

/// 会话游标键。
pub fn session_key(thing: &str, session_id: &str) -> String {
    format!("sess_{}_{}", thing, session_id)
}

/// 设备在线信号键。
pub fn status_key(thing: &str) -> String {
    format!("status_{}", thing)
}

/// 告警去重键，(项目, 设备, 指标, 方向) 唯一。
pub fn notice_key(project_id: &str, device: &str, metric: &str, cause: &str) -> String {
    format!("notice_{}_{}{}{}", project_id, device, metric, cause)
}

/// 停止命令抑制键。
pub fn stop_key(thing: &str) -> String {
    format!("stop_{}", thing)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_are_disjoint_per_dimension() {
        assert_ne!(
            notice_key("p1", "d1", "temperature", "upper"),
            notice_key("p1", "d1", "temperature", "lower")
        );
        assert_ne!(
            notice_key("p1", "d1", "temperature", "upper"),
            notice_key("p1", "d1", "humidity", "upper")
        );
        assert_ne!(session_key("t1", "s1"), session_key("t1", "s2"));
        assert_ne!(status_key("t1"), stop_key("t1"));
    }
}
