//! Bean 作用域与生命周期

use crate::errors::BoxError;
use std::fmt;
use std::str::FromStr;

/// Bean 作用域
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BeanScope {
    /// 单例模式 - 容器内只创建一个实例，首次请求时构造并缓存
    #[default]
    Singleton,
    /// 原型模式 - 每次请求都创建新实例，容器不负责销毁
    Prototype,
}

impl BeanScope {
    /// 作用域的文本形式
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Singleton => "singleton",
            Self::Prototype => "prototype",
        }
    }
}

impl fmt::Display for BeanScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BeanScope {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "" | "singleton" => Ok(Self::Singleton),
            "prototype" => Ok(Self::Prototype),
            other => Err(format!("未知的 Bean 作用域: {other}")),
        }
    }
}

/// 可销毁 Bean
///
/// 容器关闭或显式销毁单例时调用；返回的错误只会被记录，不会中断销毁流程。
pub trait DisposableBean: Send + Sync {
    /// 释放资源
    fn destroy(&self) -> Result<(), BoxError>;
}

/// 应用上下文状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ContextState {
    /// 已创建，尚未刷新
    #[default]
    Created,
    /// 刷新完成，可以提供服务
    Active,
    /// 已关闭（终态）
    Closed,
}

impl fmt::Display for ContextState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Created => "created",
            Self::Active => "active",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_parsing() {
        assert_eq!("singleton".parse::<BeanScope>(), Ok(BeanScope::Singleton));
        assert_eq!("Prototype".parse::<BeanScope>(), Ok(BeanScope::Prototype));
        assert_eq!("".parse::<BeanScope>(), Ok(BeanScope::Singleton));
        assert!("request".parse::<BeanScope>().is_err());
    }

    #[test]
    fn test_default_scope_is_singleton() {
        assert_eq!(BeanScope::default(), BeanScope::Singleton);
        assert_eq!(BeanScope::Prototype.to_string(), "prototype");
    }
}
