use serde::{Deserialize, Serialize};
use std::fmt;

/// 事件执行结果
///
/// 数值编码与配置/外部系统保持一致：`Fail = 0`、`Success = 1`、`SuccessAbort = 2`。
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultState {
    /// 失败：终止处理链
    Fail,
    /// 成功：继续执行下一个处理器
    #[default]
    Success,
    /// 成功并中断：终止处理链，但整体视为成功
    SuccessAbort,
}

impl ResultState {
    pub fn as_i64(self) -> i64 {
        match self {
            ResultState::Fail => 0,
            ResultState::Success => 1,
            ResultState::SuccessAbort => 2,
        }
    }

    /// 是否会终止处理链
    pub fn is_terminal(self) -> bool {
        matches!(self, ResultState::Fail | ResultState::SuccessAbort)
    }
}

impl TryFrom<i64> for ResultState {
    type Error = i64;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(ResultState::Fail),
            1 => Ok(ResultState::Success),
            2 => Ok(ResultState::SuccessAbort),
            other => Err(other),
        }
    }
}

impl fmt::Display for ResultState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultState::Fail => write!(f, "fail"),
            ResultState::Success => write!(f, "success"),
            ResultState::SuccessAbort => write!(f, "success_abort"),
        }
    }
}

/// 业务结果码：整数或字符串，由应用自行定义
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ResultCode {
    Int(i64),
    Text(String),
}

impl Default for ResultCode {
    fn default() -> Self {
        ResultCode::Int(ResultState::Success.as_i64())
    }
}

impl From<i64> for ResultCode {
    fn from(value: i64) -> Self {
        ResultCode::Int(value)
    }
}

impl From<i32> for ResultCode {
    fn from(value: i32) -> Self {
        ResultCode::Int(value.into())
    }
}

impl From<&str> for ResultCode {
    fn from(value: &str) -> Self {
        ResultCode::Text(value.to_string())
    }
}

impl From<String> for ResultCode {
    fn from(value: String) -> Self {
        ResultCode::Text(value)
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResultCode::Int(n) => write!(f, "{n}"),
            ResultCode::Text(s) => f.write_str(s),
        }
    }
}
