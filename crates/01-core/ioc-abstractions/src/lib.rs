//! # IoC 抽象层
//!
//! 定义 Bean 工厂、Bean 定义注册表、应用上下文和类型扫描的核心 trait。
//! 具体实现见 `ioc-impl`。

pub mod context;
pub mod factory;
pub mod resolver;
pub mod scanner;

pub use context::*;
pub use factory::*;
pub use resolver::*;
pub use scanner::*;
