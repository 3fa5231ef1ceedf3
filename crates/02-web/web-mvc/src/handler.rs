//! 处理器调用约定
//!
//! `#[handlers]` 宏为每个映射方法生成一个 [`HandlerFn`]，参数按声明位置以
//! [`ArgumentValue`] 传入，返回值经 [`IntoHandlerResult`] 统一为 [`HandlerResult`]。

use crate::error::WebError;
use crate::request::WebRequest;
use crate::response::WebResponse;
use ioc_common::BoxError;
use std::any::Any;

/// 处理器函数：目标 Bean、已解析参数、平台请求与响应
pub type HandlerFn = fn(
    &(dyn Any + Send + Sync),
    Vec<ArgumentValue>,
    &WebRequest,
    &mut WebResponse,
) -> Result<HandlerResult, BoxError>;

/// 已解析的处理器参数
#[derive(Debug, Clone, PartialEq)]
pub enum ArgumentValue {
    /// 文本
    Text(String),
    /// 32 位整数
    Int(i32),
    /// 64 位整数
    Long(i64),
    /// 双精度浮点
    Double(f64),
    /// 布尔
    Bool(bool),
    /// 平台请求占位，调用时直接传入请求引用
    Request,
    /// 平台响应占位，调用时直接传入响应引用
    Response,
}

/// 从 [`ArgumentValue`] 取出具体类型
pub trait FromArgument: Sized {
    /// 转换参数；`name` 仅用于错误信息
    fn from_argument(value: Option<ArgumentValue>, name: &str) -> Result<Self, BoxError>;
}

macro_rules! impl_from_argument {
    ($ty:ty, $variant:ident, $expected:literal) => {
        impl FromArgument for $ty {
            fn from_argument(value: Option<ArgumentValue>, name: &str) -> Result<Self, BoxError> {
                match value {
                    Some(ArgumentValue::$variant(v)) => Ok(v),
                    _ => Err(WebError::argument_mismatch(name, $expected).into()),
                }
            }
        }
    };
}

impl_from_argument!(String, Text, "String");
impl_from_argument!(i32, Int, "i32");
impl_from_argument!(i64, Long, "i64");
impl_from_argument!(f64, Double, "f64");
impl_from_argument!(bool, Bool, "bool");

/// 处理器返回值
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerResult {
    /// 逻辑视图名，交给视图解析器
    View(String),
    /// 原样写出的文本
    Raw(String),
    /// 处理器已自行写入响应
    Empty,
}

impl HandlerResult {
    /// 视图结果
    pub fn view(name: impl Into<String>) -> Self {
        Self::View(name.into())
    }

    /// 文本结果
    pub fn raw(text: impl ToString) -> Self {
        Self::Raw(text.to_string())
    }
}

/// 转换为 [`HandlerResult`]
pub trait IntoHandlerResult {
    /// 转换
    fn into_handler_result(self) -> Result<HandlerResult, BoxError>;
}

impl IntoHandlerResult for HandlerResult {
    fn into_handler_result(self) -> Result<HandlerResult, BoxError> {
        Ok(self)
    }
}

impl IntoHandlerResult for () {
    fn into_handler_result(self) -> Result<HandlerResult, BoxError> {
        Ok(HandlerResult::Empty)
    }
}

impl<T: IntoHandlerResult> IntoHandlerResult for Option<T> {
    fn into_handler_result(self) -> Result<HandlerResult, BoxError> {
        self.map_or(Ok(HandlerResult::Empty), IntoHandlerResult::into_handler_result)
    }
}

impl<T, E> IntoHandlerResult for Result<T, E>
where
    T: IntoHandlerResult,
    E: Into<BoxError>,
{
    fn into_handler_result(self) -> Result<HandlerResult, BoxError> {
        match self {
            Ok(value) => value.into_handler_result(),
            Err(err) => Err(err.into()),
        }
    }
}

macro_rules! impl_raw_result {
    ($($ty:ty),*) => {
        $(
            impl IntoHandlerResult for $ty {
                fn into_handler_result(self) -> Result<HandlerResult, BoxError> {
                    Ok(HandlerResult::raw(self))
                }
            }
        )*
    };
}

impl_raw_result!(i32, i64, u32, u64, usize, f64, bool);
