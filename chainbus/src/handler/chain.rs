use super::descriptor::HandlerDescriptor;
use super::event_handler::EventHandler;
use crate::event::Event;
use std::fmt;
use std::sync::Arc;

/// 处理链中的一项：处理器类型名、描述与实例
pub struct ChainEntry<E: Event> {
    kind: Arc<str>,
    descriptor: HandlerDescriptor,
    handler: Arc<dyn EventHandler<E>>,
}

impl<E: Event> ChainEntry<E> {
    pub fn new(
        kind: impl Into<Arc<str>>,
        descriptor: HandlerDescriptor,
        handler: Arc<dyn EventHandler<E>>,
    ) -> Self {
        Self {
            kind: kind.into(),
            descriptor,
            handler,
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn descriptor(&self) -> &HandlerDescriptor {
        &self.descriptor
    }

    pub fn priority(&self) -> i64 {
        self.descriptor.priority()
    }

    pub fn handler(&self) -> &Arc<dyn EventHandler<E>> {
        &self.handler
    }
}

impl<E: Event> Clone for ChainEntry<E> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind.clone(),
            descriptor: self.descriptor.clone(),
            handler: self.handler.clone(),
        }
    }
}

impl<E: Event> fmt::Debug for ChainEntry<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChainEntry")
            .field("kind", &self.kind)
            .field("descriptor", &self.descriptor)
            .finish_non_exhaustive()
    }
}

/// 某一事件类型的处理链
///
/// - 只增不减：`append` 追加到末尾并标记为未排序；
/// - `sort` 按优先级升序稳定排序，同优先级保持注册顺序；重复排序不改变结果。
pub struct HandlerChain<E: Event> {
    entries: Vec<ChainEntry<E>>,
    sorted: bool,
}

impl<E: Event> Default for HandlerChain<E> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            sorted: true,
        }
    }
}

impl<E: Event> HandlerChain<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, entry: ChainEntry<E>) {
        self.entries.push(entry);
        self.sorted = false;
    }

    pub fn sort(&mut self) {
        if !self.sorted {
            self.entries.sort_by_key(ChainEntry::priority);
            self.sorted = true;
        }
    }

    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 按优先级排列的处理链视图；调用方需保证已 `sort`
    pub fn sorted_view(&self) -> &[ChainEntry<E>] {
        debug_assert!(self.sorted, "handler chain read before sort");
        &self.entries
    }
}
