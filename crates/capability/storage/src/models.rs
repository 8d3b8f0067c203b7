//! 存储数据模型。

use domain::{CommandStatus, ComponentKind, Threshold};

/// 设备（thing）记录：接入管道里的逻辑设备身份。
#[derive(Debug, Clone)]
pub struct ThingRecord {
    pub id: String,
    pub name: String,
    pub project_id: String,
    pub online: bool,
}

/// 单设备阈值覆盖。
#[derive(Debug, Clone)]
pub struct ThresholdRecord {
    pub project_id: String,
    pub device: String,
    pub threshold: Threshold,
}

/// 活跃告警记录：(项目, 设备, 指标, 方向) 唯一。
///
/// 与去重缓存互为后备：缓存扛住 TTL 内的重复告警，
/// 记录扛住缓存淘汰和进程重启。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoticeRecord {
    pub project_id: String,
    pub device: String,
    pub metric: String,
    pub cause: String,
}

/// 组件注册记录（信标或网关）。
#[derive(Debug, Clone)]
pub struct ComponentRecord {
    pub id: String,
    pub mac_addr: String,
    pub gw_mac_addr: String,
    pub kind: ComponentKind,
    pub project_id: String,
}

/// 组件配置命令明细。
///
/// `pending_data` 为待生效配置，回执成功后提升为 `applied_data`。
#[derive(Debug, Clone)]
pub struct ComponentDetailRecord {
    pub id: String,
    pub component_id: String,
    pub status: CommandStatus,
    pub applied_data: String,
    pub pending_data: String,
}

impl ComponentDetailRecord {
    pub fn new(component_id: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            component_id: component_id.into(),
            status: CommandStatus::Idle,
            applied_data: String::new(),
            pending_data: String::new(),
        }
    }
}

/// App 推送令牌记录。
#[derive(Debug, Clone)]
pub struct DeviceTokenRecord {
    pub project_id: String,
    pub device_token: String,
}
