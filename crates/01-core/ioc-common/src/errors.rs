//! 错误类型定义

use thiserror::Error;

/// 任意来源的装箱错误，用于构造器、销毁回调和处理器返回值
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 容器错误类型
#[derive(Error, Debug)]
pub enum BeanError {
    #[error("Bean 不存在: {name}")]
    BeanNotFound { name: String },

    #[error("没有类型为 {type_name} 的 Bean 定义")]
    NoBeanOfType { type_name: String },

    #[error("Bean 实例化失败: {bean_name} ({type_name}), 原因: {source}")]
    Instantiation {
        bean_name: String,
        type_name: String,
        source: BoxError,
    },

    #[error("无法自动装配字段: {bean_name}.{field} (依赖类型 {dependency}), 原因: {source}")]
    DependencyInjection {
        bean_name: String,
        field: String,
        dependency: String,
        source: Box<BeanError>,
    },

    #[error("检测到循环依赖: {chain}")]
    CircularDependency { chain: String },

    #[error("Bean 定义重复: {name}, 已有 {existing}, 新增 {attempted}")]
    DuplicateDefinition {
        name: String,
        existing: String,
        attempted: String,
    },

    #[error("Bean 类型不匹配: {name}, 期望 {expected}")]
    TypeMismatch { name: String, expected: String },

    #[error("容器状态非法: {message}")]
    IllegalState { message: String },
}

impl BeanError {
    /// 创建按名称查找失败错误
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::BeanNotFound { name: name.into() }
    }

    /// 创建按类型查找失败错误
    pub fn no_bean_of_type(type_name: impl Into<String>) -> Self {
        Self::NoBeanOfType {
            type_name: type_name.into(),
        }
    }

    /// 创建状态非法错误
    pub fn illegal_state(message: impl Into<String>) -> Self {
        Self::IllegalState {
            message: message.into(),
        }
    }

    /// 创建类型不匹配错误
    pub fn type_mismatch(name: impl Into<String>, expected: impl Into<String>) -> Self {
        Self::TypeMismatch {
            name: name.into(),
            expected: expected.into(),
        }
    }

    /// 是否为查找失败（按名称或按类型）
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::BeanNotFound { .. } | Self::NoBeanOfType { .. })
    }
}

/// 结果类型别名
pub type BeanResult<T> = Result<T, BeanError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_classification() {
        assert!(BeanError::not_found("x").is_not_found());
        assert!(BeanError::no_bean_of_type("demo::X").is_not_found());
        assert!(!BeanError::illegal_state("closed").is_not_found());
    }

    #[test]
    fn test_injection_error_keeps_cause() {
        let err = BeanError::DependencyInjection {
            bean_name: "controllerBean".to_string(),
            field: "service".to_string(),
            dependency: "demo::ServiceBean".to_string(),
            source: Box::new(BeanError::no_bean_of_type("demo::ServiceBean")),
        };

        let message = err.to_string();
        assert!(message.contains("controllerBean.service"));
        assert!(message.contains("demo::ServiceBean"));
        assert!(std::error::Error::source(&err).is_some());
    }
}
