//! 网关组件命令状态机模型。

/// 组件类别，对应线上 `dmac_type`（"0" 信标 / "1" 网关）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComponentKind {
    Beacon,
    Gateway,
}

impl ComponentKind {
    pub fn from_wire(proto: &str) -> Option<Self> {
        match proto {
            "0" => Some(ComponentKind::Beacon),
            "1" => Some(ComponentKind::Gateway),
            _ => None,
        }
    }

    pub fn wire_code(&self) -> u8 {
        match self {
            ComponentKind::Beacon => 0,
            ComponentKind::Gateway => 1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ComponentKind::Beacon => "BEACON",
            ComponentKind::Gateway => "GATEWAY",
        }
    }
}

/// 配置命令生命周期：`Idle → Updating → {Success, Cancelled, Failed}`。
///
/// 终止态之间不再流转，新的下发请求把状态重置回 `Updating`。
/// `Failed` 携带网关回执中的结果码（1 鉴权失败、2 没有发现设备、
/// 3 密码错误、4 参数错误、5 超时、6 配置异常）。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Idle,
    Updating,
    Success,
    Cancelled,
    Failed(u8),
}

impl CommandStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            CommandStatus::Success | CommandStatus::Cancelled | CommandStatus::Failed(_)
        )
    }

    /// 对外展示用的状态字符串。
    pub fn as_label(&self) -> String {
        match self {
            CommandStatus::Idle => "idle".to_string(),
            CommandStatus::Updating => "updating".to_string(),
            CommandStatus::Success => "success".to_string(),
            CommandStatus::Cancelled => "cancelled".to_string(),
            CommandStatus::Failed(code) => format!("failed:{}", code),
        }
    }

    /// 从存储的状态字符串还原。
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "idle" => Some(CommandStatus::Idle),
            "updating" => Some(CommandStatus::Updating),
            "success" => Some(CommandStatus::Success),
            "cancelled" => Some(CommandStatus::Cancelled),
            other => other
                .strip_prefix("failed:")
                .and_then(|code| code.parse::<u8>().ok())
                .map(CommandStatus::Failed),
        }
    }
}
