//! 请求分发器
//!
//! 查找路由、按参数绑定逐个解析参数、调用处理器并处理返回值。
//! [`Dispatcher::service`] 是传输层边界：未命中返回 404，其余失败返回 500。

use crate::argument::{HandlerMethodArgumentResolver, RequestParamArgumentResolver};
use crate::error::{WebError, WebResult};
use crate::handler::{ArgumentValue, HandlerResult};
use crate::mapping::{HandlerMapping, RequestMappingHandlerMapping, RouteEntry};
use crate::request::WebRequest;
use crate::response::{status, WebResponse, TEXT_PLAIN_UTF8};
use crate::view::{InternalResourceViewResolver, Model, ViewResolver};
use ioc_abstractions::ApplicationContext;
use ioc_common::ParameterBinding;
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, info, info_span, warn};
use uuid::Uuid;

/// 分发结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// 已由处理器处理
    Handled,
    /// 没有匹配的路由
    NotFound,
}

/// 请求分发器
pub struct Dispatcher {
    context: Arc<dyn ApplicationContext>,
    handler_mapping: Arc<dyn HandlerMapping>,
    argument_resolvers: Vec<Arc<dyn HandlerMethodArgumentResolver>>,
    view_resolver: Arc<dyn ViewResolver>,
}

impl Dispatcher {
    /// 使用默认组件创建分发器
    pub fn new(context: Arc<dyn ApplicationContext>) -> Self {
        Self::builder(context).build()
    }

    /// 创建分发器构建器
    pub fn builder(context: Arc<dyn ApplicationContext>) -> DispatcherBuilder {
        DispatcherBuilder::new(context)
    }

    /// 应用上下文
    pub fn context(&self) -> &Arc<dyn ApplicationContext> {
        &self.context
    }

    /// 立即构建路由表
    pub fn initialize(&self) -> WebResult<usize> {
        let count = self.handler_mapping.initialize()?;
        info!("分发器初始化完成, 共 {} 条路由", count);
        Ok(count)
    }

    /// 关闭应用上下文
    pub fn destroy(&self) {
        info!("销毁分发器");
        self.context.close();
    }

    /// 处理请求，返回分发结果或失败原因
    pub fn dispatch(
        &self,
        request: &WebRequest,
        response: &mut WebResponse,
    ) -> WebResult<DispatchOutcome> {
        let request_id = Uuid::new_v4();
        let span = info_span!(
            "dispatch",
            %request_id,
            method = %request.method(),
            path = %request.request_uri()
        );
        let _entered = span.enter();

        let Some(route) = self.handler_mapping.get_handler(request)? else {
            return Ok(DispatchOutcome::NotFound);
        };
        debug!("匹配处理器: {}", route.handler_description());

        let arguments = self.resolve_arguments(&route, request)?;
        let result = Self::invoke(&route, arguments, request, response)?;
        self.handle_result(result, request, response)?;
        Ok(DispatchOutcome::Handled)
    }

    /// 传输层入口：把分发结果映射为状态码
    pub fn service(&self, request: &WebRequest, response: &mut WebResponse) {
        match self.dispatch(request, response) {
            Ok(DispatchOutcome::Handled) => {}
            Ok(DispatchOutcome::NotFound) => {
                warn!("未找到处理器: {} {}", request.method(), request.request_uri());
                response.send_error(status::NOT_FOUND);
            }
            Err(err) => {
                error!(
                    "请求处理失败: {} {}: {}",
                    request.method(),
                    request.request_uri(),
                    err
                );
                response.send_error(status::INTERNAL_SERVER_ERROR);
            }
        }
    }

    fn resolve_arguments(
        &self,
        route: &RouteEntry,
        request: &WebRequest,
    ) -> WebResult<Vec<ArgumentValue>> {
        route
            .parameters
            .iter()
            .map(|parameter| -> WebResult<ArgumentValue> {
                match parameter.binding {
                    ParameterBinding::PlatformRequest => Ok(ArgumentValue::Request),
                    ParameterBinding::PlatformResponse => Ok(ArgumentValue::Response),
                    _ => self
                        .argument_resolvers
                        .iter()
                        .find(|resolver| resolver.supports_parameter(parameter))
                        .ok_or_else(|| WebError::UnsupportedParameter {
                            handler: route.handler_description(),
                            parameter: parameter.name.clone(),
                            type_name: parameter.type_name.clone(),
                        })?
                        .resolve_argument(parameter, request),
                }
            })
            .collect()
    }

    fn invoke(
        route: &RouteEntry,
        arguments: Vec<ArgumentValue>,
        request: &WebRequest,
        response: &mut WebResponse,
    ) -> WebResult<HandlerResult> {
        let bean: &(dyn Any + Send + Sync) = route.bean.as_ref();
        let outcome = catch_unwind(AssertUnwindSafe(|| {
            (route.invoker)(bean, arguments, request, response)
        }));

        match outcome {
            Ok(Ok(result)) => Ok(result),
            Ok(Err(source)) => Err(WebError::Dispatch {
                handler: route.handler_description(),
                source,
            }),
            Err(panic) => Err(WebError::Dispatch {
                handler: route.handler_description(),
                source: panic_message(panic.as_ref()).into(),
            }),
        }
    }

    fn handle_result(
        &self,
        result: HandlerResult,
        request: &WebRequest,
        response: &mut WebResponse,
    ) -> WebResult<()> {
        match result {
            HandlerResult::Empty => Ok(()),
            HandlerResult::View(view_name) => {
                let view = self
                    .view_resolver
                    .resolve_view_name(&view_name)?
                    .ok_or(WebError::ViewResolution { view_name })?;
                view.render(&Model::new(), request, response)
            }
            HandlerResult::Raw(text) => {
                response.set_content_type(TEXT_PLAIN_UTF8);
                response.set_character_encoding("UTF-8");
                response.write(&text);
                Ok(())
            }
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    panic
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .map_or_else(|| "处理器发生 panic".to_string(), |m| format!("处理器发生 panic: {m}"))
}

impl std::fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispatcher")
            .field("context_state", &self.context.state())
            .field("argument_resolvers", &self.argument_resolvers.len())
            .finish_non_exhaustive()
    }
}

/// 分发器构建器
pub struct DispatcherBuilder {
    context: Arc<dyn ApplicationContext>,
    handler_mapping: Option<Arc<dyn HandlerMapping>>,
    argument_resolvers: Vec<Arc<dyn HandlerMethodArgumentResolver>>,
    view_resolver: Option<Arc<dyn ViewResolver>>,
}

impl DispatcherBuilder {
    /// 创建构建器
    pub fn new(context: Arc<dyn ApplicationContext>) -> Self {
        Self {
            context,
            handler_mapping: None,
            argument_resolvers: Vec::new(),
            view_resolver: None,
        }
    }

    /// 替换处理器映射
    #[must_use]
    pub fn with_handler_mapping(mut self, mapping: Arc<dyn HandlerMapping>) -> Self {
        self.handler_mapping = Some(mapping);
        self
    }

    /// 追加参数解析器，排在内置解析器之前
    #[must_use]
    pub fn with_argument_resolver(mut self, resolver: Arc<dyn HandlerMethodArgumentResolver>) -> Self {
        self.argument_resolvers.push(resolver);
        self
    }

    /// 替换视图解析器
    #[must_use]
    pub fn with_view_resolver(mut self, resolver: Arc<dyn ViewResolver>) -> Self {
        self.view_resolver = Some(resolver);
        self
    }

    /// 构建分发器
    pub fn build(self) -> Dispatcher {
        let handler_mapping = self.handler_mapping.unwrap_or_else(|| {
            Arc::new(RequestMappingHandlerMapping::new(self.context.clone())) as Arc<dyn HandlerMapping>
        });
        let view_resolver = self.view_resolver.unwrap_or_else(|| {
            Arc::new(InternalResourceViewResolver::default()) as Arc<dyn ViewResolver>
        });

        let mut argument_resolvers = self.argument_resolvers;
        argument_resolvers.push(Arc::new(RequestParamArgumentResolver));

        Dispatcher {
            context: self.context,
            handler_mapping,
            argument_resolvers,
            view_resolver,
        }
    }
}
