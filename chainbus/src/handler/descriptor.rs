use bon::Builder;
use serde::{Deserialize, Serialize};

/// 默认优先级：数值越小越先执行
pub const DEFAULT_PRIORITY: i64 = 100;

/// 处理器描述：优先级与说明
#[derive(Builder, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HandlerDescriptor {
    #[builder(default = DEFAULT_PRIORITY)]
    #[serde(default = "default_priority")]
    priority: i64,
    #[builder(default, into)]
    #[serde(default, alias = "describe")]
    description: String,
}

impl Default for HandlerDescriptor {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl HandlerDescriptor {
    pub fn new(priority: i64, description: impl Into<String>) -> Self {
        Self {
            priority,
            description: description.into(),
        }
    }

    pub fn priority(&self) -> i64 {
        self.priority
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

pub(crate) fn default_priority() -> i64 {
    DEFAULT_PRIORITY
}
