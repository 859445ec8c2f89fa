//! 静态配置
//!
//! 配置由外部加载（文件、环境、配置中心均可），以嵌套映射交给注册表：
//!
//! ```json
//! {
//!   "login": {
//!     "account_auth": { "priority": 20, "describe": "账户认证处理器" },
//!     "account_menu": { "priority": 80, "describe": "账户菜单信息处理器", "max_items": 10 }
//!   },
//!   "scene": {
//!     "login": {
//!       "auth": { "whiteRule": ["account_auth"], "blockRule": ["account_storage"] }
//!     }
//!   }
//! }
//! ```
//!
//! 顶层除保留键 `scene` 外均为事件类型名；处理器配置中 `priority`/`describe`
//! 以外的键作为参数原样交给处理器工厂。键的顺序被保留。
//!
use crate::error::BusResult;
use crate::handler::{HandlerDescriptor, default_priority};
use indexmap::{IndexMap, IndexSet};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 场景规则表：事件类型 -> 场景名 -> 规则
pub type SceneTable = IndexMap<String, IndexMap<String, SceneRule>>;

/// 处理器配置表：事件类型 -> 处理器类型 -> 配置
pub type HandlerTable = IndexMap<String, IndexMap<String, HandlerSpec>>;

/// 注册表配置
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BusConfig {
    /// 场景规则；缺省时 `import` 保留既有场景表
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<SceneTable>,
    #[serde(flatten)]
    pub events: HandlerTable,
}

impl BusConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(s: &str) -> BusResult<Self> {
        Ok(serde_json::from_str(s)?)
    }

    pub fn from_json_value(value: Value) -> BusResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// 追加一条处理器配置；同名处理器覆盖原配置
    pub fn with_handler(
        mut self,
        event_kind: impl Into<String>,
        handler_kind: impl Into<String>,
        spec: HandlerSpec,
    ) -> Self {
        self.events
            .entry(event_kind.into())
            .or_default()
            .insert(handler_kind.into(), spec);
        self
    }

    /// 追加一条场景规则
    pub fn with_scene(
        mut self,
        event_kind: impl Into<String>,
        scene_name: impl Into<String>,
        rule: SceneRule,
    ) -> Self {
        self.scene
            .get_or_insert_with(SceneTable::new)
            .entry(event_kind.into())
            .or_default()
            .insert(scene_name.into(), rule);
        self
    }
}

/// 单个处理器的配置
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HandlerSpec {
    #[serde(default = "default_priority")]
    pub priority: i64,
    #[serde(default, alias = "describe")]
    pub description: String,
    /// 其余参数，交由处理器工厂解释
    #[serde(flatten)]
    pub params: Map<String, Value>,
}

impl Default for HandlerSpec {
    fn default() -> Self {
        Self {
            priority: default_priority(),
            description: String::new(),
            params: Map::new(),
        }
    }
}

impl HandlerSpec {
    pub fn new(priority: i64, description: impl Into<String>) -> Self {
        Self {
            priority,
            description: description.into(),
            params: Map::new(),
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    pub fn descriptor(&self) -> HandlerDescriptor {
        HandlerDescriptor::new(self.priority, self.description.clone())
    }

    /// 将参数反序列化为处理器自己的配置类型
    pub fn params_as<T: DeserializeOwned>(&self) -> BusResult<T> {
        Ok(serde_json::from_value(Value::Object(self.params.clone()))?)
    }
}

/// 场景规则：白名单与黑名单，均以处理器类型名匹配
///
/// 黑名单优先：命中黑名单的处理器总是被跳过；白名单非空时，不在其中的处理器被跳过。
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneRule {
    #[serde(default)]
    pub white_rule: IndexSet<String>,
    #[serde(default)]
    pub block_rule: IndexSet<String>,
}

impl SceneRule {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn white<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.white_rule.extend(kinds.into_iter().map(Into::into));
        self
    }

    pub fn block<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.block_rule.extend(kinds.into_iter().map(Into::into));
        self
    }

    pub fn is_unrestricted(&self) -> bool {
        self.white_rule.is_empty() && self.block_rule.is_empty()
    }

    pub fn is_blocked(&self, handler_kind: &str) -> bool {
        self.block_rule.contains(handler_kind)
    }

    pub fn is_whitelisted(&self, handler_kind: &str) -> bool {
        self.white_rule.is_empty() || self.white_rule.contains(handler_kind)
    }

    /// 该处理器在此规则下是否执行
    pub fn allows(&self, handler_kind: &str) -> bool {
        !self.is_blocked(handler_kind) && self.is_whitelisted(handler_kind)
    }
}
