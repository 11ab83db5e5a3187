//! 核心错误类型
//!
//! 请求链路上可能出现的所有错误都汇总在这里。只有配置错误和上游生成错误
//! 会暴露给调用方，其余错误在本地被吸收。

use std::fmt;

use thiserror::Error;

/// Errors that can occur while serving a restyle request
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RestyleError {
    /// 配置错误（缺失或占位的凭据等）
    #[error("Configuration error: {0}")]
    Config(String),

    /// 上游返回非成功状态或网络调用失败
    #[error("{}", upstream_message(.status, .message))]
    Upstream {
        status: Option<u16>,
        message: String,
    },

    /// 上游返回 2xx 但响应结构不符合预期
    #[error("Malformed upstream response: {0}")]
    InvalidResponse(String),

    /// 上游调用超时
    #[error("Upstream request timed out: {0}")]
    Timeout(String),

    /// 快照写入等本地 IO 错误
    #[error("IO error: {0}")]
    Io(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    Internal(String),
}

fn upstream_message(status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("Upstream API error: {} {}", code, message),
        None => format!("Upstream API error: {}", message),
    }
}

/// 错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    Configuration,
    Upstream,
    Timeout,
    Io,
    Internal,
}

impl RestyleError {
    /// 获取错误类别
    pub fn category(&self) -> ErrorCategory {
        match self {
            RestyleError::Config(_) => ErrorCategory::Configuration,
            RestyleError::Upstream { .. } => ErrorCategory::Upstream,
            RestyleError::InvalidResponse(_) => ErrorCategory::Upstream,
            RestyleError::Timeout(_) => ErrorCategory::Timeout,
            RestyleError::Io(_) => ErrorCategory::Io,
            RestyleError::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// 是否需要返回给调用方
    pub fn is_user_visible(&self) -> bool {
        !matches!(self.category(), ErrorCategory::Io)
    }

    /// 创建上游错误
    pub fn upstream<T: fmt::Display>(status: Option<u16>, message: T) -> Self {
        RestyleError::Upstream {
            status,
            message: message.to_string(),
        }
    }

    /// 创建配置错误
    pub fn config<T: fmt::Display>(message: T) -> Self {
        RestyleError::Config(message.to_string())
    }
}

impl From<std::io::Error> for RestyleError {
    fn from(error: std::io::Error) -> Self {
        RestyleError::Io(error.to_string())
    }
}

impl From<reqwest::Error> for RestyleError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_timeout() {
            RestyleError::Timeout(error.to_string())
        } else if error.is_decode() {
            RestyleError::InvalidResponse(error.to_string())
        } else {
            RestyleError::upstream(error.status().map(|s| s.as_u16()), error)
        }
    }
}

/// 错误结果类型别名
pub type RestyleResult<T> = Result<T, RestyleError>;

/// HTML 清理过程中的错误，只存在于清理器边界之内
#[derive(Error, Debug)]
pub enum SanitizeError {
    #[error("failed to parse HTML: {0}")]
    Parse(std::io::Error),

    #[error("failed to serialize DOM: {0}")]
    Serialize(std::io::Error),

    #[error("serialized DOM is not valid UTF-8: {0}")]
    Encoding(#[from] std::string::FromUtf8Error),

    #[error("sanitizer pass panicked: {0}")]
    Panicked(String),
}
