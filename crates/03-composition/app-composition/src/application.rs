//! Web 应用组装

use crate::error::{BootstrapError, BootstrapResult};
use crate::logging::LoggingConfig;
use crate::settings::ApplicationSettings;
use ioc_abstractions::ApplicationContext;
use ioc_common::{AnnotationIndex, TypeRegistry};
use ioc_impl::{AnnotationConfigApplicationContext, FactoryOptions};
use std::sync::Arc;
use tracing::{error, info};
use web_mvc::{
    Dispatcher, HandlerMethodArgumentResolver, InternalResourceViewResolver, WebRequest,
    WebResponse,
};

/// Web 应用构建器
///
/// 日志只有在显式调用 [`with_logging`](Self::with_logging) 时才会初始化。
pub struct WebApplicationBuilder {
    settings: ApplicationSettings,
    logging: Option<LoggingConfig>,
    registry: Option<Arc<TypeRegistry>>,
    annotation_index: Option<Arc<AnnotationIndex>>,
    factory_options: FactoryOptions,
    argument_resolvers: Vec<Arc<dyn HandlerMethodArgumentResolver>>,
}

impl WebApplicationBuilder {
    /// 使用给定配置创建构建器
    pub fn new(settings: ApplicationSettings) -> Self {
        Self {
            settings,
            logging: None,
            registry: None,
            annotation_index: None,
            factory_options: FactoryOptions::default(),
            argument_resolvers: Vec::new(),
        }
    }

    /// 从默认配置源创建构建器
    pub fn from_config() -> BootstrapResult<Self> {
        Ok(Self::new(ApplicationSettings::load()?))
    }

    /// 覆盖扫描根
    #[must_use]
    pub fn with_scan_packages(mut self, packages: impl Into<String>) -> Self {
        self.settings.scan.package = packages.into();
        self
    }

    /// 配置日志
    #[must_use]
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging = Some(config);
        self
    }

    /// 使用独立的类型注册表
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<TypeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// 使用独立的注解索引
    #[must_use]
    pub fn with_annotation_index(mut self, index: Arc<AnnotationIndex>) -> Self {
        self.annotation_index = Some(index);
        self
    }

    /// 工厂选项
    #[must_use]
    pub fn with_factory_options(mut self, options: FactoryOptions) -> Self {
        self.factory_options = options;
        self
    }

    /// 追加自定义参数解析器
    #[must_use]
    pub fn with_argument_resolver(mut self, resolver: Arc<dyn HandlerMethodArgumentResolver>) -> Self {
        self.argument_resolvers.push(resolver);
        self
    }

    /// 构建并启动 Web 应用
    ///
    /// 依次初始化日志、刷新应用上下文、建立路由表。路由表建立失败时关闭上下文。
    pub fn build(self) -> BootstrapResult<WebApplication> {
        if let Some(logging) = &self.logging {
            logging.init()?;
        }

        if self.settings.scan_packages().is_empty() {
            return Err(BootstrapError::Config(config::ConfigError::NotFound(
                "scan.package".to_string(),
            )));
        }
        info!("启动 Web 应用, 扫描根: {}", self.settings.scan.package);

        let mut context_builder = AnnotationConfigApplicationContext::builder(&self.settings.scan.package)
            .with_factory_options(self.factory_options);
        if let Some(registry) = self.registry {
            context_builder = context_builder.with_registry(registry);
        }
        if let Some(index) = self.annotation_index {
            context_builder = context_builder.with_annotation_index(index);
        }

        let context = context_builder.build();
        context.refresh()?;
        let context: Arc<dyn ApplicationContext> = Arc::new(context);

        let view = &self.settings.mvc.view;
        let mut dispatcher_builder = Dispatcher::builder(context.clone()).with_view_resolver(
            Arc::new(InternalResourceViewResolver::new(&view.prefix, &view.suffix)),
        );
        for resolver in self.argument_resolvers {
            dispatcher_builder = dispatcher_builder.with_argument_resolver(resolver);
        }
        let dispatcher = dispatcher_builder.build();

        if let Err(e) = dispatcher.initialize() {
            error!("路由表建立失败: {}", e);
            context.close();
            return Err(e.into());
        }

        info!("Web 应用启动完成");
        Ok(WebApplication {
            settings: self.settings,
            context,
            dispatcher: Arc::new(dispatcher),
        })
    }
}

/// 已启动的 Web 应用
pub struct WebApplication {
    settings: ApplicationSettings,
    context: Arc<dyn ApplicationContext>,
    dispatcher: Arc<Dispatcher>,
}

impl WebApplication {
    /// 创建构建器
    pub fn builder(settings: ApplicationSettings) -> WebApplicationBuilder {
        WebApplicationBuilder::new(settings)
    }

    /// 生效的配置
    pub fn settings(&self) -> &ApplicationSettings {
        &self.settings
    }

    /// 应用上下文
    pub fn context(&self) -> &Arc<dyn ApplicationContext> {
        &self.context
    }

    /// 分发器，可跨线程共享
    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        self.dispatcher.clone()
    }

    /// 处理一个请求
    pub fn service(&self, request: &WebRequest, response: &mut WebResponse) {
        self.dispatcher.service(request, response);
    }

    /// 关闭应用并销毁单例
    pub fn shutdown(&self) {
        info!("关闭 Web 应用");
        self.dispatcher.destroy();
    }
}

impl std::fmt::Debug for WebApplication {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WebApplication")
            .field("settings", &self.settings)
            .field("context_state", &self.context.state())
            .finish_non_exhaustive()
    }
}
