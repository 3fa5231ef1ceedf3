//! 基于注解的应用上下文

use crate::factory::{DefaultBeanFactory, FactoryOptions};
use crate::scanner::{ComponentScanner, RegistryTypeScanner};
use ioc_abstractions::{
    ApplicationContext, BeanDefinition, BeanDefinitionRegistry, BeanFactory,
    ConfigurableBeanFactory, TypeScanner,
};
use ioc_common::{
    default_bean_name, global_annotation_index, global_type_registry, markers, AnnotationIndex,
    BeanError, BeanRef, BeanResult, ContextState, TypeDescriptor, TypeMetadata, TypeRegistry,
};
use parking_lot::{Mutex, RwLock};
use std::any::TypeId;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{error, info};

/// 基于注解的应用上下文
///
/// 扫描根路径下所有（直接或经由元注解）带有 `component` 标记的类型，
/// 注册为 Bean 定义并在刷新时预实例化全部单例。
pub struct AnnotationConfigApplicationContext {
    base_packages: Vec<String>,
    registry: Arc<TypeRegistry>,
    annotation_index: Arc<AnnotationIndex>,
    component_scanner: ComponentScanner,
    bean_factory: DefaultBeanFactory,
    state: RwLock<ContextState>,
    lifecycle_lock: Mutex<()>,
}

impl AnnotationConfigApplicationContext {
    /// 使用全局类型注册表创建上下文，`base_packages` 以逗号分隔
    pub fn new(base_packages: &str) -> Self {
        Self::builder(base_packages).build()
    }

    /// 创建上下文构建器
    pub fn builder(base_packages: &str) -> ApplicationContextBuilder {
        ApplicationContextBuilder::new(base_packages)
    }

    /// 扫描根路径
    pub fn base_packages(&self) -> &[String] {
        &self.base_packages
    }

    /// 底层 Bean 工厂
    pub const fn bean_factory(&self) -> &DefaultBeanFactory {
        &self.bean_factory
    }

    fn ensure_active(&self) -> BeanResult<()> {
        match *self.state.read() {
            ContextState::Active => Ok(()),
            state => Err(BeanError::illegal_state(format!(
                "应用上下文当前状态为 {state}，无法获取 Bean"
            ))),
        }
    }

    fn scan_components(&self) -> Vec<Arc<TypeDescriptor>> {
        let mut seen = BTreeSet::new();
        let mut components = Vec::new();

        for root in &self.base_packages {
            for metadata in self
                .component_scanner
                .scan_with_marker(root, markers::COMPONENT)
            {
                if seen.insert(metadata.type_name().to_string()) {
                    components.push(metadata);
                }
            }
        }
        components
    }

    /// Bean 名称：组件类标记上的值优先，否则为简单类型名首字母小写
    fn bean_name_of(&self, metadata: &dyn TypeMetadata) -> String {
        metadata
            .annotations()
            .iter()
            .filter(|a| !a.is_platform())
            .filter(|a| {
                self.annotation_index
                    .annotation_carries(a.name(), markers::COMPONENT)
            })
            .find_map(|a| a.value().filter(|v| !v.is_empty()))
            .map_or_else(|| default_bean_name(metadata.simple_name()), String::from)
    }

    fn register_components(&self, components: &[Arc<TypeDescriptor>]) -> BeanResult<()> {
        for metadata in components {
            let name = self.bean_name_of(metadata.as_ref());
            let definition = BeanDefinition::from_metadata(metadata.as_ref(), metadata.scope());
            self.bean_factory.register_bean_definition(&name, definition)?;
        }
        Ok(())
    }

    fn abort_refresh(&self, err: BeanError) -> BeanError {
        error!("应用上下文刷新失败: {}", err);
        self.bean_factory.destroy_singletons();
        *self.state.write() = ContextState::Closed;
        err
    }
}

impl BeanFactory for AnnotationConfigApplicationContext {
    fn get_bean(&self, name: &str) -> BeanResult<BeanRef> {
        self.ensure_active()?;
        self.bean_factory.get_bean(name)
    }

    fn get_bean_by_type(&self, type_id: TypeId, type_name: &str) -> BeanResult<BeanRef> {
        self.ensure_active()?;
        self.bean_factory.get_bean_by_type(type_id, type_name)
    }

    fn contains_bean(&self, name: &str) -> bool {
        self.bean_factory.contains_bean(name)
    }

    fn is_singleton(&self, name: &str) -> BeanResult<bool> {
        self.bean_factory.is_singleton(name)
    }
}

impl ApplicationContext for AnnotationConfigApplicationContext {
    fn refresh(&self) -> BeanResult<()> {
        let _guard = self.lifecycle_lock.lock();

        match *self.state.read() {
            ContextState::Created => {}
            ContextState::Active => return Err(BeanError::illegal_state("应用上下文已经刷新")),
            ContextState::Closed => {
                return Err(BeanError::illegal_state("应用上下文已关闭，不能重新刷新"))
            }
        }

        info!("刷新应用上下文, 扫描路径: {}", self.config_location());

        let components = self.scan_components();
        info!("扫描到 {} 个组件", components.len());

        if let Err(err) = self.register_components(&components) {
            return Err(self.abort_refresh(err));
        }

        match self.bean_factory.preinstantiate_singletons() {
            Ok(count) => {
                *self.state.write() = ContextState::Active;
                info!(
                    "应用上下文刷新完成: {} 个 Bean 定义, {} 个单例",
                    self.bean_factory.bean_definition_count(),
                    count
                );
                Ok(())
            }
            Err(err) => Err(self.abort_refresh(err)),
        }
    }

    fn close(&self) {
        let _guard = self.lifecycle_lock.lock();

        if *self.state.read() != ContextState::Active {
            return;
        }

        info!("关闭应用上下文: {}", self.config_location());
        self.bean_factory.destroy_singletons();
        *self.state.write() = ContextState::Closed;
        info!("应用上下文已关闭");
    }

    fn state(&self) -> ContextState {
        *self.state.read()
    }

    fn config_location(&self) -> String {
        self.base_packages.join(",")
    }

    fn bean_definition_names(&self) -> Vec<String> {
        self.bean_factory.bean_definition_names()
    }

    fn bean_type(&self, name: &str) -> BeanResult<Arc<dyn TypeMetadata>> {
        let definition = self
            .bean_factory
            .get_bean_definition(name)
            .ok_or_else(|| BeanError::not_found(name))?;
        let metadata: Arc<dyn TypeMetadata> = self
            .registry
            .load(definition.type_name())
            .ok_or_else(|| BeanError::no_bean_of_type(definition.type_name()))?;
        Ok(metadata)
    }

    fn annotation_index(&self) -> Arc<AnnotationIndex> {
        self.annotation_index.clone()
    }
}

impl std::fmt::Debug for AnnotationConfigApplicationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnnotationConfigApplicationContext")
            .field("base_packages", &self.base_packages)
            .field("state", &self.state())
            .field("bean_factory", &self.bean_factory)
            .finish_non_exhaustive()
    }
}

/// 应用上下文构建器
pub struct ApplicationContextBuilder {
    base_packages: Vec<String>,
    registry: Option<Arc<TypeRegistry>>,
    annotation_index: Option<Arc<AnnotationIndex>>,
    scanner: Option<Arc<dyn TypeScanner>>,
    factory_options: FactoryOptions,
}

impl ApplicationContextBuilder {
    /// 创建构建器，`base_packages` 以逗号分隔，空白会被去除
    pub fn new(base_packages: &str) -> Self {
        Self {
            base_packages: base_packages
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect(),
            registry: None,
            annotation_index: None,
            scanner: None,
            factory_options: FactoryOptions::default(),
        }
    }

    /// 使用指定类型注册表（默认全局注册表）
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<TypeRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// 使用指定注解类型索引（默认全局索引）
    #[must_use]
    pub fn with_annotation_index(mut self, index: Arc<AnnotationIndex>) -> Self {
        self.annotation_index = Some(index);
        self
    }

    /// 使用自定义类型扫描器（默认按注册表模块路径扫描）
    #[must_use]
    pub fn with_scanner(mut self, scanner: Arc<dyn TypeScanner>) -> Self {
        self.scanner = Some(scanner);
        self
    }

    /// 设置 Bean 工厂选项
    #[must_use]
    pub fn with_factory_options(mut self, options: FactoryOptions) -> Self {
        self.factory_options = options;
        self
    }

    /// 构建上下文（尚未刷新）
    pub fn build(self) -> AnnotationConfigApplicationContext {
        let registry = self.registry.unwrap_or_else(global_type_registry);
        let annotation_index = self
            .annotation_index
            .unwrap_or_else(global_annotation_index);
        let scanner = self
            .scanner
            .unwrap_or_else(|| Arc::new(RegistryTypeScanner::new(registry.clone())) as Arc<dyn TypeScanner>);

        AnnotationConfigApplicationContext {
            base_packages: self.base_packages,
            component_scanner: ComponentScanner::new(
                scanner,
                registry.clone(),
                annotation_index.clone(),
            ),
            bean_factory: DefaultBeanFactory::with_options(registry.clone(), self.factory_options),
            registry,
            annotation_index,
            state: RwLock::new(ContextState::Created),
            lifecycle_lock: Mutex::new(()),
        }
    }
}
