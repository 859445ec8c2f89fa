use crate::config::SceneTable;
use crate::handler::HandlerDescriptor;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 注册表导出视图：已物化的处理器描述与场景表，仅用于调试与审计
///
/// 序列化形状与配置一致：顶层为事件类型名，另有保留键 `scene`。
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    #[serde(default)]
    pub scene: SceneTable,
    #[serde(flatten)]
    pub events: IndexMap<String, IndexMap<String, HandlerDescriptor>>,
}

impl RegistrySnapshot {
    /// 某一事件类型已物化的处理器类型名（按物化顺序）
    pub fn handler_kinds(&self, event_kind: &str) -> Vec<&str> {
        self.events
            .get(event_kind)
            .map(|m| m.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }
}
