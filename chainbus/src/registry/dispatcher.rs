//! 分发器：沿处理链依次执行处理器
//!
//! 对每个处理器：
//! 1. 处理器类型命中黑名单则跳过；白名单非空且未命中则跳过；
//! 2. 执行处理器，并以执行后的事件快照记录执行轨迹；
//! 3. 结果为 `Fail` / `SuccessAbort` 时立即返回；
//! 4. 处理器返回 `Err` 或 panic 时，事件置为 `Fail` 并携带故障后立即返回，不重试、不跳过；
//!    处理器已写入的结果码保持不变。
//!
//! 所有失败信息均通过返回的事件携带，不会以 `Err` 或 panic 越过分发边界。
//!
use super::event_registry::EventRegistry;
use crate::config::SceneRule;
use crate::error::EventFault;
use crate::event::Event;
use crate::handler::ChainEntry;
use std::panic::{self, AssertUnwindSafe};

impl EventRegistry {
    /// 分发事件，不做场景过滤
    pub fn emit<E: Event>(&self, event: E) -> E {
        self.emit_with(event, &SceneRule::default())
    }

    /// 按场景分发事件
    ///
    /// 场景名为空时不查询场景表；未配置的场景等价于不过滤。
    pub fn emit_scene<E: Event>(&self, event: E, scene_name: &str) -> E {
        if scene_name.is_empty() {
            return self.emit(event);
        }
        let rule = self.scene(E::KIND, scene_name).unwrap_or_default();
        tracing::trace!(event = E::KIND, scene = scene_name, ?rule, "scene resolved");
        self.emit_with(event, &rule)
    }

    /// 以指定的白名单/黑名单分发事件
    pub fn emit_with<E: Event>(&self, mut event: E, rule: &SceneRule) -> E {
        let span = tracing::debug_span!("emit", event = E::KIND);
        let _enter = span.enter();

        let chain = match self.ensure_loaded::<E>() {
            Ok(chain) => chain,
            Err(err) => {
                tracing::error!(error = %err, "handler chain unavailable");
                let message = err.to_string();
                event
                    .state_mut()
                    .record_fault(message, EventFault::Registry(err));
                return event;
            }
        };

        dispatch(event, &chain, rule)
    }
}

pub(crate) fn dispatch<E: Event>(mut event: E, chain: &[ChainEntry<E>], rule: &SceneRule) -> E {
    for (index, entry) in chain.iter().enumerate() {
        let kind = entry.kind();
        if rule.is_blocked(kind) {
            tracing::trace!(handler = kind, "skipped by block rule");
            continue;
        }
        if !rule.is_whitelisted(kind) {
            tracing::trace!(handler = kind, "skipped by white rule");
            continue;
        }

        tracing::debug!(handler = kind, priority = entry.priority(), "invoking handler");
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| entry.handler().handle(&mut event)));
        let fault = match outcome {
            Ok(Ok(())) => None,
            Ok(Err(err)) => Some(EventFault::Handler(err)),
            Err(payload) => Some(EventFault::from_panic(payload)),
        };

        if let Some(fault) = fault {
            tracing::warn!(handler = kind, index, error = %fault, "handler execution fault");
            event
                .state_mut()
                .record_fault(format!("handler execution fault ({index}): {kind}"), fault);
            record_trace(&mut event, kind);
            return event;
        }

        record_trace(&mut event, kind);
        let result = event.result();
        if result.is_terminal() {
            tracing::info!(handler = kind, %result, "handler chain short-circuited");
            return event;
        }
    }
    event
}

fn record_trace<E: Event>(event: &mut E, handler_kind: &str) {
    let snapshot = event.snapshot();
    event.state_mut().record_trace(handler_kind, snapshot);
}
