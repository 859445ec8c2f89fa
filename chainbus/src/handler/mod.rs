//! 处理器与处理链
//!
//! - `EventHandler`：处理某一类型事件的逻辑；
//! - `HandlerDescriptor`：优先级与描述；
//! - `HandlerChain`：某一事件类型的、按优先级排序的处理器列表。

mod chain;
mod descriptor;
mod event_handler;

pub use chain::{ChainEntry, HandlerChain};
pub use descriptor::{DEFAULT_PRIORITY, HandlerDescriptor};
pub use event_handler::{EventHandler, FnHandler};

pub(crate) use descriptor::default_priority;
