//! 启动错误

use ioc_common::BeanError;
use thiserror::Error;
use web_mvc::WebError;

/// 应用启动错误
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("配置加载失败: {0}")]
    Config(#[from] config::ConfigError),

    #[error("应用上下文启动失败: {0}")]
    Context(#[from] BeanError),

    #[error("分发器初始化失败: {0}")]
    Web(#[from] WebError),

    #[error("日志初始化失败: {message}")]
    Logging { message: String },
}

impl BootstrapError {
    /// 创建日志初始化错误
    pub fn logging(message: impl Into<String>) -> Self {
        Self::Logging {
            message: message.into(),
        }
    }
}

/// 启动结果类型别名
pub type BootstrapResult<T> = Result<T, BootstrapError>;
