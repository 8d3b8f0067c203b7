//! PostgreSQL 存储实现
//!
//! 生产环境使用；所有查询参数化。

mod component;
mod notice;
mod sink;
mod thing;
mod threshold;
mod token;

pub use component::PgComponentStore;
pub use notice::PgNoticeStore;
pub use sink::PgMetricSink;
pub use thing::PgThingStore;
pub use threshold::PgThresholdStore;
pub use token::PgDeviceTokenStore;
