//! 存储接口 Trait 定义
//!
//! 定义流水线消费的记录库异步接口：
//! - ThingStore：设备状态读写
//! - ThresholdStore：阈值覆盖查询
//! - NoticeStore：活跃告警记录读写
//! - ComponentStore：组件与配置命令明细
//! - DeviceTokenStore：推送令牌查询
//!
//! 设计原则：
//! - 所有接口返回 StorageError
//! - 使用 async_trait 支持动态分发

use crate::error::StorageError;
use crate::models::{
    ComponentDetailRecord, ComponentRecord, NoticeRecord, ThingRecord,
};
use async_trait::async_trait;
use domain::{CommandStatus, ComponentKind, Threshold};

/// 设备存储接口。
#[async_trait]
pub trait ThingStore: Send + Sync {
    /// 按名称查找设备。
    async fn find_by_name(&self, name: &str) -> Result<Option<ThingRecord>, StorageError>;

    /// 列出持久状态为在线的设备（离线扫描用）。
    async fn list_online(&self) -> Result<Vec<ThingRecord>, StorageError>;

    /// 更新设备持久在线状态。
    async fn update_status(&self, id: &str, online: bool) -> Result<(), StorageError>;
}

/// 阈值存储接口。
#[async_trait]
pub trait ThresholdStore: Send + Sync {
    /// 查找设备级阈值覆盖，不存在时调用方回落到默认阈值。
    async fn find(&self, project_id: &str, device: &str)
    -> Result<Option<Threshold>, StorageError>;
}

/// 告警记录存储接口。
#[async_trait]
pub trait NoticeStore: Send + Sync {
    /// 查找指定方向的活跃告警。
    async fn find(
        &self,
        project_id: &str,
        device: &str,
        metric: &str,
        cause: &str,
    ) -> Result<Option<NoticeRecord>, StorageError>;

    /// 查找该指标任一方向的活跃告警（清除路径的后备判断）。
    async fn find_any_cause(
        &self,
        project_id: &str,
        device: &str,
        metric: &str,
    ) -> Result<Option<NoticeRecord>, StorageError>;

    /// 保存活跃告警，同键重复保存为空操作。
    async fn save(&self, record: NoticeRecord) -> Result<(), StorageError>;

    /// 删除该指标两个方向的告警记录。
    async fn delete(
        &self,
        project_id: &str,
        device: &str,
        metric: &str,
    ) -> Result<(), StorageError>;
}

/// 组件存储接口。
#[async_trait]
pub trait ComponentStore: Send + Sync {
    /// 按 MAC 与类别查找组件（回执定位用）。
    async fn find_by_mac(
        &self,
        mac_addr: &str,
        kind: ComponentKind,
    ) -> Result<Option<ComponentRecord>, StorageError>;

    /// 按 ID 查找组件。
    async fn find(&self, component_id: &str) -> Result<Option<ComponentRecord>, StorageError>;

    /// 查找组件配置命令明细。
    async fn find_detail(
        &self,
        component_id: &str,
    ) -> Result<Option<ComponentDetailRecord>, StorageError>;

    /// 保存配置命令明细（按 component_id upsert）。
    async fn save_detail(&self, record: ComponentDetailRecord) -> Result<(), StorageError>;

    /// 只更新状态字段。
    async fn set_status(
        &self,
        component_id: &str,
        status: CommandStatus,
    ) -> Result<(), StorageError>;
}

/// 推送令牌存储接口。
#[async_trait]
pub trait DeviceTokenStore: Send + Sync {
    /// 列出项目下的所有推送令牌。
    async fn list_tokens(&self, project_id: &str) -> Result<Vec<String>, StorageError>;
}
