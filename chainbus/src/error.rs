//! 统一错误定义
//!
//! - `BusError`：注册表自身的错误（配置解析、处理器物化、事件类型冲突）；
//! - `EventFault`：附着在事件上的故障载荷，由分发器捕获后写入事件，
//!   永远不会以 `Err`/panic 的形式越过 `emit*` 边界。
//!
use thiserror::Error;

/// 注册表错误类型
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum BusError {
    #[error("config error: {source}")]
    Config {
        #[from]
        source: serde_json::Error,
    },
    #[error("handler factory not found: event={event}, handler={handler}")]
    FactoryNotFound { event: String, handler: String },
    #[error("handler materialization failed: event={event}, handler={handler}, reason={reason}")]
    Materialize {
        event: String,
        handler: String,
        reason: String,
    },
    #[error("event type mismatch: event={event}, expected={expected}, found={found}")]
    TypeMismatch {
        event: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// 统一 Result 类型别名
pub type BusResult<T> = Result<T, BusError>;

/// 事件上携带的故障
///
/// 以 `Arc<EventFault>` 形式保存在 `EventState` 中，便于事件克隆与
/// `copy_exception` 在事件之间共享同一份故障。
#[derive(Debug, Error)]
pub enum EventFault {
    /// 处理器返回了 `Err`
    #[error("{0:#}")]
    Handler(anyhow::Error),
    /// 处理器执行中发生 panic
    #[error("handler panicked: {0}")]
    Panic(String),
    /// 注册表在分发前失败（如处理器无法物化）
    #[error(transparent)]
    Registry(#[from] BusError),
}

impl EventFault {
    /// 从 `catch_unwind` 的载荷中提取 panic 信息
    pub(crate) fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "unknown panic payload".to_string()
        };
        EventFault::Panic(message)
    }
}
