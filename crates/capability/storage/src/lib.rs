//! # 记录库与时序写入抽象
//!
//! 流水线把关系库当作按键寻址的记录库使用，这里只暴露它需要的
//! 读写操作；时序库只暴露批量追加接口。
//!
//! ## 架构设计
//!
//! 1. **接口抽象层** (`traits.rs`)：设备、阈值、告警记录、组件、推送令牌
//! 2. **数据模型层** (`models.rs`)：存储相关的数据结构
//! 3. **错误处理层** (`error.rs`)：统一的存储错误类型
//! 4. **连接管理层** (`connection.rs`)：数据库连接池管理
//! 5. **实现层**：
//!    - `in_memory/`：内存实现（用于测试和单机演示）
//!    - `postgres/`：PostgreSQL 实现（生产环境使用）
//! 6. **时序接口** (`sink.rs`)：传感/广播记录的批量追加
//!
//! ## 设计约束
//!
//! - 流水线侧所有外部调用带有界超时，存储慢只降低时延不会死锁
//! - 所有 SQL 使用参数绑定，防止 SQL 注入且支持查询计划缓存

pub mod connection;
pub mod error;
pub mod in_memory;
pub mod models;
pub mod postgres;
pub mod sink;
pub mod traits;

pub use connection::*;
pub use error::*;
pub use models::*;
pub use sink::{InMemoryMetricSink, MetricSink};
pub use traits::*;

pub use in_memory::{
    InMemoryComponentStore, InMemoryDeviceTokenStore, InMemoryNoticeStore, InMemoryThingStore,
    InMemoryThresholdStore,
};

pub use postgres::{
    PgComponentStore, PgDeviceTokenStore, PgMetricSink, PgNoticeStore, PgThingStore,
    PgThresholdStore,
};
