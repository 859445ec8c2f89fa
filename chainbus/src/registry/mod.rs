//! 事件注册表与分发
//!
//! - `EventRegistry`：处理链表、静态配置、场景规则与处理器工厂；
//! - `dispatcher`：`emit` / `emit_with` / `emit_scene` 的处理链遍历；
//! - `RegistrySnapshot`：`export` 的导出视图。

mod dispatcher;
mod event_registry;
mod snapshot;

pub use event_registry::EventRegistry;
pub use snapshot::RegistrySnapshot;
