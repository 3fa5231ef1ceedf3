//! 错误类型定义

use ioc_common::{BeanError, BoxError};
use thiserror::Error;

/// Web 分发错误类型
#[derive(Error, Debug)]
pub enum WebError {
    #[error("路由重复: {path}, 已映射到 {existing}, 冲突处理器 {attempted}")]
    DuplicateRoute {
        path: String,
        existing: String,
        attempted: String,
    },

    #[error("缺少必需的请求参数: '{name}'")]
    MissingParameter { name: String },

    #[error("请求参数类型转换失败: '{name}' = '{value}', 目标类型 {target}")]
    TypeConversion {
        name: String,
        value: String,
        target: String,
    },

    #[error("不支持的参数类型: {handler} 的参数 '{parameter}' ({type_name})")]
    UnsupportedParameter {
        handler: String,
        parameter: String,
        type_name: String,
    },

    #[error("处理器参数不匹配: '{parameter}', 期望 {expected}")]
    ArgumentMismatch { parameter: String, expected: String },

    #[error("无效的处理器: {handler}, 原因: {message}")]
    InvalidHandler { handler: String, message: String },

    #[error("无法解析视图: {view_name}")]
    ViewResolution { view_name: String },

    #[error("处理器执行失败: {handler}, 原因: {source}")]
    Dispatch { handler: String, source: BoxError },

    #[error("容器错误: {source}")]
    Context {
        #[from]
        source: BeanError,
    },
}

impl WebError {
    /// 创建缺少参数错误
    pub fn missing_parameter(name: impl Into<String>) -> Self {
        Self::MissingParameter { name: name.into() }
    }

    /// 创建参数不匹配错误
    pub fn argument_mismatch(parameter: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::ArgumentMismatch {
            parameter: parameter.into(),
            expected: expected.into(),
        }
    }

    /// 创建无效处理器错误
    pub fn invalid_handler(handler: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidHandler {
            handler: handler.into(),
            message: message.into(),
        }
    }
}

/// 结果类型别名
pub type WebResult<T> = Result<T, WebError>;
