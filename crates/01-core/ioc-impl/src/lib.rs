//! # IoC 具体实现
//!
//! 提供默认 Bean 工厂、基于注解的应用上下文以及基于类型注册表的扫描器。

pub mod context;
pub mod factory;
pub mod scanner;

pub use context::{AnnotationConfigApplicationContext, ApplicationContextBuilder};
pub use factory::{DefaultBeanFactory, FactoryOptions};
pub use scanner::{ComponentScanner, RegistryTypeScanner};
