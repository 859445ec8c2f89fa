use super::result::ResultState;
use super::state::{EventSnapshot, EventState};
use indexmap::IndexMap;

/// 事件：在处理链中流转的工作单元
///
/// 实现者只需提供稳定的事件类型名 `KIND`（用作配置键与处理链路由）以及内嵌的
/// `EventState` 访问器；其余方法均为对 `EventState` 的委托。
/// 通常通过 `#[chainbus::event]` 属性宏自动实现。
pub trait Event: Sized + 'static {
    /// 事件类型的稳定名称（建议常量字符串，不随重构变化）
    const KIND: &'static str;

    fn state(&self) -> &EventState;

    fn state_mut(&mut self) -> &mut EventState;

    fn kind(&self) -> &'static str {
        Self::KIND
    }

    fn result(&self) -> ResultState {
        self.state().result()
    }

    fn is_success(&self) -> bool {
        self.state().is_success()
    }

    fn is_exception(&self) -> bool {
        self.state().is_exception()
    }

    /// 拷贝另一事件（可为不同类型）的失败信息，结果强制为 `Fail`
    fn copy_event_exception<O: Event>(&mut self, source: &O) -> &mut Self {
        self.state_mut().copy_exception(source.state());
        self
    }

    fn snapshot(&self) -> EventSnapshot {
        self.state().to_snapshot(Self::KIND)
    }

    /// 各处理器执行后的事件快照，按执行顺序排列
    fn dump(&self) -> IndexMap<String, EventSnapshot> {
        self.state().trace().clone()
    }
}
