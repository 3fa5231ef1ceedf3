//! # Web MVC
//!
//! 注解驱动的请求分发：路由表、参数解析、视图解析与分发器。
//! 请求与响应模型不依赖任何具体的 HTTP 服务器，由传输层负责转换。
//!
//! ## 核心组件
//!
//! - [`Dispatcher`] - 分发器，传输层入口为 [`Dispatcher::service`]
//! - [`RequestMappingHandlerMapping`] - 惰性构建的路由表
//! - [`RequestParamArgumentResolver`] - 请求参数解析与类型转换
//! - [`InternalResourceViewResolver`] - 前缀/后缀视图解析

pub mod argument;
pub mod dispatcher;
pub mod error;
pub mod handler;
pub mod mapping;
pub mod path;
pub mod request;
pub mod response;
pub mod view;

pub use argument::*;
pub use dispatcher::*;
pub use error::*;
pub use handler::*;
pub use mapping::*;
pub use path::*;
pub use request::*;
pub use response::{status, Forward, WebResponse, TEXT_PLAIN_UTF8};
pub use view::*;

pub use ioc_common::BoxError;
