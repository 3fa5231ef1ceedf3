//! 路由表
//!
//! 从应用上下文中带 `controller` 标记的 Bean 收集 `request_mapping` 方法，
//! 以规范化后的完整路径为键建立路由表。

use crate::error::{WebError, WebResult};
use crate::handler::HandlerFn;
use crate::path::{combine_paths, normalize_path};
use crate::request::WebRequest;
use ioc_abstractions::ApplicationContext;
use ioc_common::{markers, BeanRef, MethodParameter, TypeMetadata};
use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

/// 路由条目
#[derive(Clone)]
pub struct RouteEntry {
    /// 规范化后的完整路径
    pub path: String,
    /// 处理器 Bean 名称
    pub bean_name: String,
    /// 处理器类型名
    pub handler_type: String,
    /// 处理器方法名
    pub method_name: String,
    /// 处理器 Bean 实例
    pub bean: BeanRef,
    /// 参数绑定
    pub parameters: Vec<MethodParameter>,
    /// 调用入口
    pub invoker: HandlerFn,
}

impl RouteEntry {
    /// 处理器描述，形如 `app::web::UserController::get_user`
    pub fn handler_description(&self) -> String {
        format!("{}::{}", self.handler_type, self.method_name)
    }
}

impl fmt::Debug for RouteEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RouteEntry")
            .field("path", &self.path)
            .field("bean_name", &self.bean_name)
            .field("handler", &self.handler_description())
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// 处理器映射
pub trait HandlerMapping: Send + Sync {
    /// 立即建立映射，返回路由数量
    fn initialize(&self) -> WebResult<usize>;

    /// 为请求查找处理器
    fn get_handler(&self, request: &WebRequest) -> WebResult<Option<Arc<RouteEntry>>>;
}

/// 基于 `request_mapping` 标记的处理器映射
///
/// 路由表只构建一次；并发的首次查找会等待同一次构建，构建失败不会被缓存。
pub struct RequestMappingHandlerMapping {
    context: Arc<dyn ApplicationContext>,
    routes: OnceCell<HashMap<String, Arc<RouteEntry>>>,
}

impl RequestMappingHandlerMapping {
    /// 创建处理器映射
    pub fn new(context: Arc<dyn ApplicationContext>) -> Self {
        Self {
            context,
            routes: OnceCell::new(),
        }
    }

    /// 路由表（必要时构建）
    pub fn routes(&self) -> WebResult<&HashMap<String, Arc<RouteEntry>>> {
        self.routes.get_or_try_init(|| self.build_routes())
    }

    /// 已映射的路径（有序）
    pub fn route_paths(&self) -> WebResult<Vec<String>> {
        let mut paths: Vec<String> = self.routes()?.keys().cloned().collect();
        paths.sort();
        Ok(paths)
    }

    /// 按路径查找
    pub fn lookup(&self, path: &str) -> WebResult<Option<Arc<RouteEntry>>> {
        Ok(self.routes()?.get(&normalize_path(path)).cloned())
    }

    fn build_routes(&self) -> WebResult<HashMap<String, Arc<RouteEntry>>> {
        info!("构建路由表");
        let index = self.context.annotation_index();
        let mut routes: HashMap<String, Arc<RouteEntry>> = HashMap::new();

        for bean_name in self.context.bean_definition_names() {
            let metadata = self.context.bean_type(&bean_name)?;
            if !index.is_marked(metadata.as_ref(), markers::CONTROLLER) {
                continue;
            }

            let bean = self.context.get_bean(&bean_name)?;
            for entry in Self::routes_of(&bean_name, metadata.as_ref(), &bean)? {
                if let Some(existing) = routes.get(&entry.path) {
                    return Err(WebError::DuplicateRoute {
                        path: entry.path.clone(),
                        existing: existing.handler_description(),
                        attempted: entry.handler_description(),
                    });
                }
                info!("映射路由: {} -> {}", entry.path, entry.handler_description());
                routes.insert(entry.path.clone(), Arc::new(entry));
            }
        }

        info!("路由表构建完成, 共 {} 条路由", routes.len());
        Ok(routes)
    }

    fn routes_of(
        bean_name: &str,
        metadata: &dyn TypeMetadata,
        bean: &BeanRef,
    ) -> WebResult<Vec<RouteEntry>> {
        let base = metadata
            .annotation(markers::REQUEST_MAPPING)
            .and_then(|a| a.value());

        let mut entries = Vec::new();
        for method in metadata.declared_methods() {
            let Some(mapping) = method.find_annotation(markers::REQUEST_MAPPING) else {
                continue;
            };

            let handler = format!("{}::{}", metadata.type_name(), method.name());
            let invoker = method
                .invoker()
                .and_then(|handle| handle.downcast_ref::<HandlerFn>())
                .copied()
                .ok_or_else(|| WebError::invalid_handler(&handler, "缺少可调用的处理器入口"))?;

            entries.push(RouteEntry {
                path: combine_paths(base, mapping.value()),
                bean_name: bean_name.to_string(),
                handler_type: metadata.type_name().to_string(),
                method_name: method.name().to_string(),
                bean: bean.clone(),
                parameters: method.parameters().to_vec(),
                invoker,
            });
        }
        debug!("{} 声明了 {} 个处理器方法", metadata.type_name(), entries.len());
        Ok(entries)
    }
}

impl HandlerMapping for RequestMappingHandlerMapping {
    fn initialize(&self) -> WebResult<usize> {
        Ok(self.routes()?.len())
    }

    fn get_handler(&self, request: &WebRequest) -> WebResult<Option<Arc<RouteEntry>>> {
        let path = request.lookup_path();
        let route = self.routes()?.get(&path).cloned();
        if route.is_none() {
            debug!("没有匹配的路由: {}", path);
        }
        Ok(route)
    }
}

impl fmt::Debug for RequestMappingHandlerMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestMappingHandlerMapping")
            .field("initialized", &self.routes.get().is_some())
            .finish_non_exhaustive()
    }
}
