//! 内存存储实现
//!
//! 仅用于本地测试和单机演示；生产环境使用 `postgres` 实现。

mod component;
mod notice;
mod thing;
mod threshold;
mod token;

pub use component::InMemoryComponentStore;
pub use notice::InMemoryNoticeStore;
pub use thing::InMemoryThingStore;
pub use threshold::InMemoryThresholdStore;
pub use token::InMemoryDeviceTokenStore;
