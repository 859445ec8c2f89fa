//! 同步、按优先级排序的事件处理链（chainbus）
//!
//! 调用方构造事件并经注册表分发，注册表为该事件类型找到按优先级排序的处理链，
//! 依次执行处理器；任一处理器可以让处理链提前结束：
//! - `Fail`：业务失败，终止处理链；
//! - `SuccessAbort`：成功并中断；
//! - 处理器返回 `Err` 或 panic：被捕获为故障，事件置为 `Fail`。
//!
//! 模块：
//! - `event`：事件结果模型（`ResultState`、`EventState`、`Event`）；
//! - `handler`：处理器（`EventHandler`）、描述（`HandlerDescriptor`）与处理链；
//! - `config`：静态配置（处理器优先级/描述、场景规则）；
//! - `registry`：注册表（`EventRegistry`），负责懒加载与分发；
//! - `error`：`BusError` 与 `EventFault`。
//!
//! 典型用法：
//! 1. 用 `#[event]` 定义事件，实现若干 `EventHandler`；
//! 2. 为配置中的处理器注册工厂（`register_factory`），或直接 `watch`；
//! 3. `import` 静态配置；
//! 4. `emit` / `emit_scene` 分发并检查返回事件的 `result()`。
//!
pub mod config;
pub mod error;
pub mod event;
pub mod handler;
pub mod registry;

pub use config::{BusConfig, HandlerSpec, SceneRule};
pub use error::{BusError, BusResult, EventFault};
pub use event::{Event, EventSnapshot, EventState, ResultCode, ResultState};
pub use handler::{EventHandler, FnHandler, HandlerDescriptor};
pub use registry::{EventRegistry, RegistrySnapshot};

#[cfg(feature = "macros")]
pub use chainbus_macros::event;

// 允许在本 crate 内部通过 ::chainbus 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::chainbus 路径。
extern crate self as chainbus;
