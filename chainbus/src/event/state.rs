use super::result::{ResultCode, ResultState};
use crate::error::EventFault;
use bon::Builder;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 默认的结果描述
pub const DEFAULT_RESULT_MESSAGE: &str = "OK";

/// 事件结果状态
///
/// 每个事件类型内嵌一份 `EventState`，分发器与处理器只通过它读写执行结果：
/// - `result` / `result_code` / `result_message`：执行结果、业务码与描述；
/// - `error`：处理器故障（仅在故障被捕获或拷贝时存在）；
/// - `trace`：按执行顺序记录每个处理器执行后的事件快照，仅用于审计与调试。
///
/// 携带故障时结果必为 `Fail`。`set_result` / `set_result_message` 等写入口不做校验，
/// 处理器自行写入的组合（如空描述的 `Fail`）原样保留。
///
/// ```rust
/// use chainbus::event::{EventState, ResultState};
///
/// let mut state = EventState::builder().description("login").build();
/// assert_eq!(state.result(), ResultState::Success);
/// assert_eq!(state.result_message(), "OK");
///
/// state.fail("bad input");
/// assert!(!state.is_success());
/// assert!(!state.is_exception());
/// ```
#[derive(Builder, Clone, Debug)]
pub struct EventState {
    #[builder(default, into)]
    description: String,
    #[builder(default)]
    result: ResultState,
    #[builder(default, into)]
    result_code: ResultCode,
    #[builder(default = String::from(DEFAULT_RESULT_MESSAGE), into)]
    result_message: String,
    #[builder(skip)]
    error: Option<Arc<EventFault>>,
    #[builder(skip)]
    trace: IndexMap<String, EventSnapshot>,
}

impl Default for EventState {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl EventState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> &mut Self {
        self.description = description.into();
        self
    }

    pub fn result(&self) -> ResultState {
        self.result
    }

    pub fn set_result(&mut self, result: ResultState) -> &mut Self {
        self.result = result;
        self
    }

    /// 以数值形式设置结果；非法取值（不在 0/1/2 内）被忽略
    pub fn set_result_raw(&mut self, raw: i64) -> &mut Self {
        if let Ok(result) = ResultState::try_from(raw) {
            self.result = result;
        }
        self
    }

    pub fn result_code(&self) -> &ResultCode {
        &self.result_code
    }

    pub fn set_result_code(&mut self, code: impl Into<ResultCode>) -> &mut Self {
        self.result_code = code.into();
        self
    }

    pub fn result_message(&self) -> &str {
        &self.result_message
    }

    pub fn set_result_message(&mut self, message: impl Into<String>) -> &mut Self {
        self.result_message = message.into();
        self
    }

    pub fn error(&self) -> Option<&Arc<EventFault>> {
        self.error.as_ref()
    }

    /// 记录故障：结果置为 `Fail`，写入描述与故障，保留既有结果码
    ///
    /// 故障只由分发器写入，外部只能通过 `copy_exception` 传播。
    pub(crate) fn record_fault(
        &mut self,
        message: impl Into<String>,
        fault: impl Into<Arc<EventFault>>,
    ) -> &mut Self {
        self.result = ResultState::Fail;
        self.result_message = message.into();
        self.error = Some(fault.into());
        self
    }

    /// 无故障且结果不为 `Fail`
    pub fn is_success(&self) -> bool {
        !self.is_exception() && self.result != ResultState::Fail
    }

    /// 是否携带处理器故障
    pub fn is_exception(&self) -> bool {
        self.error.is_some()
    }

    /// 标记业务失败，结果码为 `Fail` 的数值编码（0）
    pub fn fail(&mut self, message: impl Into<String>) -> &mut Self {
        self.fail_with_code(message, ResultState::Fail.as_i64())
    }

    /// 标记业务失败并指定结果码
    pub fn fail_with_code(
        &mut self,
        message: impl Into<String>,
        code: impl Into<ResultCode>,
    ) -> &mut Self {
        self.result = ResultState::Fail;
        self.result_code = code.into();
        self.result_message = message.into();
        self
    }

    /// 标记成功并中断后续处理器
    pub fn abort_with_success(&mut self) -> &mut Self {
        self.result = ResultState::SuccessAbort;
        self
    }

    /// 拷贝另一事件的失败信息：结果码、描述与故障，并强制置为 `Fail`
    ///
    /// 无论来源事件原本处于何种状态（包括 `SuccessAbort`），结果总是 `Fail`。
    pub fn copy_exception(&mut self, source: &EventState) -> &mut Self {
        self.result = ResultState::Fail;
        self.result_code = source.result_code.clone();
        self.result_message = source.result_message.clone();
        self.error = source.error.clone();
        self
    }

    pub fn trace(&self) -> &IndexMap<String, EventSnapshot> {
        &self.trace
    }

    // 同一处理器重复执行时覆盖快照，但保留首次出现的位置
    pub(crate) fn record_trace(&mut self, handler_kind: &str, snapshot: EventSnapshot) {
        self.trace.insert(handler_kind.to_string(), snapshot);
    }

    /// 转换为可序列化快照（不含 trace）
    pub fn to_snapshot(&self, event_kind: &str) -> EventSnapshot {
        EventSnapshot {
            event_kind: event_kind.to_string(),
            description: self.description.clone(),
            result: self.result,
            result_code: self.result_code.clone(),
            result_message: self.result_message.clone(),
            error: self.error.as_ref().map(|e| e.to_string()),
        }
    }
}

/// 事件快照：某一时刻的事件结果信息
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EventSnapshot {
    pub event_kind: String,
    pub description: String,
    pub result: ResultState,
    pub result_code: ResultCode,
    pub result_message: String,
    pub error: Option<String>,
}
