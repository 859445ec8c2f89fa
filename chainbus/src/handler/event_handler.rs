use super::descriptor::HandlerDescriptor;
use crate::event::Event;
use std::fmt;

/// 事件处理器：检查并修改某一类型的事件
///
/// - `handle` 原地修改事件；需要整体替换时可直接 `*event = ...`，分发器不假设事件身份不变；
/// - 返回 `Err` 或发生 panic 均被分发器捕获，转换为 `Fail` 结果并终止处理链；
/// - 业务失败应通过 `event.state_mut().fail(..)` 表达，而不是返回 `Err`。
pub trait EventHandler<E: Event>: Send + Sync {
    /// 处理器类型名（用于场景过滤、执行轨迹与日志）
    fn handler_name(&self) -> &str;

    /// 处理器描述，默认优先级为 100
    fn descriptor(&self) -> HandlerDescriptor {
        HandlerDescriptor::default()
    }

    /// 处理事件
    fn handle(&self, event: &mut E) -> anyhow::Result<()>;
}

/// 以闭包实现的处理器
pub struct FnHandler<F> {
    name: String,
    descriptor: HandlerDescriptor,
    f: F,
}

impl<F> FnHandler<F> {
    pub fn new<E>(name: impl Into<String>, descriptor: HandlerDescriptor, f: F) -> Self
    where
        E: Event,
        F: Fn(&mut E) -> anyhow::Result<()> + Send + Sync,
    {
        Self {
            name: name.into(),
            descriptor,
            f,
        }
    }
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler")
            .field("name", &self.name)
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

impl<E, F> EventHandler<E> for FnHandler<F>
where
    E: Event,
    F: Fn(&mut E) -> anyhow::Result<()> + Send + Sync,
{
    fn handler_name(&self) -> &str {
        &self.name
    }

    fn descriptor(&self) -> HandlerDescriptor {
        self.descriptor.clone()
    }

    fn handle(&self, event: &mut E) -> anyhow::Result<()> {
        (self.f)(event)
    }
}
