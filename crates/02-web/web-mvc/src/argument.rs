//! 处理器参数解析

use crate::error::{WebError, WebResult};
use crate::handler::ArgumentValue;
use crate::request::WebRequest;
use ioc_common::{MethodParameter, ParameterBinding, ScalarType};
use tracing::debug;

/// 处理器参数解析策略
///
/// 分发器按注册顺序询问每个解析器，第一个支持该参数的解析器负责解析。
pub trait HandlerMethodArgumentResolver: Send + Sync {
    /// 是否支持该参数
    fn supports_parameter(&self, parameter: &MethodParameter) -> bool;

    /// 从请求解析参数值
    fn resolve_argument(
        &self,
        parameter: &MethodParameter,
        request: &WebRequest,
    ) -> WebResult<ArgumentValue>;
}

/// `#[request_param]` 参数解析器
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestParamArgumentResolver;

impl HandlerMethodArgumentResolver for RequestParamArgumentResolver {
    fn supports_parameter(&self, parameter: &MethodParameter) -> bool {
        matches!(
            &parameter.binding,
            ParameterBinding::RequestParam(binding) if binding.target.is_some()
        )
    }

    fn resolve_argument(
        &self,
        parameter: &MethodParameter,
        request: &WebRequest,
    ) -> WebResult<ArgumentValue> {
        let ParameterBinding::RequestParam(binding) = &parameter.binding else {
            return Err(WebError::argument_mismatch(&parameter.name, "request_param"));
        };
        let target = binding
            .target
            .ok_or_else(|| WebError::argument_mismatch(&parameter.name, &parameter.type_name))?;

        let raw = match request.parameter(&binding.name) {
            Some(value) => value,
            None if binding.required => return Err(WebError::missing_parameter(&binding.name)),
            None => {
                debug!("请求参数 '{}' 缺失，使用默认值", binding.name);
                binding.default_value.as_str()
            }
        };

        convert_value(&binding.name, raw, target)
    }
}

/// 把请求参数文本转换为目标类型
///
/// 布尔值只有忽略大小写的 `true` 为真，其余任何文本都为假。
pub fn convert_value(name: &str, raw: &str, target: ScalarType) -> WebResult<ArgumentValue> {
    let conversion_error = || WebError::TypeConversion {
        name: name.to_string(),
        value: raw.to_string(),
        target: format!("{target:?}"),
    };

    match target {
        ScalarType::Text => Ok(ArgumentValue::Text(raw.to_string())),
        ScalarType::Int => raw
            .parse()
            .map(ArgumentValue::Int)
            .map_err(|_| conversion_error()),
        ScalarType::Long => raw
            .parse()
            .map(ArgumentValue::Long)
            .map_err(|_| conversion_error()),
        ScalarType::Double => raw
            .parse()
            .map(ArgumentValue::Double)
            .map_err(|_| conversion_error()),
        ScalarType::Bool => Ok(ArgumentValue::Bool(raw.eq_ignore_ascii_case("true"))),
    }
}
