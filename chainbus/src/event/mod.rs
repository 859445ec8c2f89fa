//! 事件模型
//!
//! - `ResultState` / `ResultCode`：三值执行结果与业务结果码；
//! - `EventState`：内嵌于每个事件的结果状态、故障与执行轨迹；
//! - `Event`：分发器访问事件状态与事件类型名的最小接口。

mod event_trait;
mod result;
mod state;

pub use event_trait::Event;
pub use result::{ResultCode, ResultState};
pub use state::{DEFAULT_RESULT_MESSAGE, EventSnapshot, EventState};
