//! 视图解析与渲染

use crate::error::WebResult;
use crate::request::WebRequest;
use crate::response::WebResponse;
use serde_json::Value;
use tracing::debug;

/// 视图模型
pub type Model = serde_json::Map<String, Value>;

/// 视图
pub trait View: Send + Sync {
    /// 渲染视图
    fn render(&self, model: &Model, request: &WebRequest, response: &mut WebResponse)
        -> WebResult<()>;
}

/// 视图解析器
pub trait ViewResolver: Send + Sync {
    /// 把逻辑视图名解析为视图；无法解析时返回 `None`
    fn resolve_view_name(&self, view_name: &str) -> WebResult<Option<Box<dyn View>>>;
}

/// 默认模板前缀
pub const DEFAULT_VIEW_PREFIX: &str = "/WEB-INF/views/";
/// 默认模板后缀
pub const DEFAULT_VIEW_SUFFIX: &str = ".jsp";

/// 内部资源视图解析器：`prefix + 视图名 + suffix` 作为转发目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InternalResourceViewResolver {
    prefix: String,
    suffix: String,
}

impl InternalResourceViewResolver {
    /// 创建解析器
    pub fn new(prefix: impl Into<String>, suffix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            suffix: suffix.into(),
        }
    }

    /// 前缀
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// 后缀
    pub fn suffix(&self) -> &str {
        &self.suffix
    }
}

impl Default for InternalResourceViewResolver {
    fn default() -> Self {
        Self::new(DEFAULT_VIEW_PREFIX, DEFAULT_VIEW_SUFFIX)
    }
}

impl ViewResolver for InternalResourceViewResolver {
    fn resolve_view_name(&self, view_name: &str) -> WebResult<Option<Box<dyn View>>> {
        let url = format!("{}{}{}", self.prefix, view_name, self.suffix);
        Ok(Some(Box::new(ForwardView::new(url))))
    }
}

/// 转发视图：把模型写入请求属性并记录转发目标
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForwardView {
    url: String,
}

impl ForwardView {
    /// 创建转发视图
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// 转发目标
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl View for ForwardView {
    fn render(
        &self,
        model: &Model,
        request: &WebRequest,
        response: &mut WebResponse,
    ) -> WebResult<()> {
        for (name, value) in model {
            request.set_attribute(name.clone(), value.clone());
        }
        debug!("转发到视图资源: {}", self.url);
        response.forward(self.url.clone(), model.clone());
        Ok(())
    }
}
