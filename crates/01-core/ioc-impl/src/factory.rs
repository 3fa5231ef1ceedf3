//! 默认 Bean 工厂

use dashmap::DashMap;
use ioc_abstractions::{
    BeanDefinition, BeanDefinitionRegistry, BeanFactory, ConfigurableBeanFactory, ResolveContext,
};
use ioc_common::{
    BeanError, BeanRef, BeanResult, BeanScope, TypeDescriptor, TypeMetadata, TypeRegistry,
};
use once_cell::sync::OnceCell;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// 工厂选项
#[derive(Debug, Clone, Default)]
pub struct FactoryOptions {
    /// 允许同名但不同的 Bean 定义覆盖已有定义
    pub allow_definition_overriding: bool,
}

/// 按注册顺序保存的 Bean 定义
#[derive(Debug, Default)]
struct DefinitionTable {
    by_name: HashMap<String, BeanDefinition>,
    order: Vec<String>,
}

/// 默认 Bean 工厂
///
/// 单例缓存的每个条目是一个 `OnceCell`：并发的首次请求只会构造一次，
/// 构造失败不会写入缓存。
pub struct DefaultBeanFactory {
    registry: Arc<TypeRegistry>,
    options: FactoryOptions,
    definitions: RwLock<DefinitionTable>,
    singletons: DashMap<String, Arc<OnceCell<BeanRef>>>,
}

impl DefaultBeanFactory {
    /// 使用给定类型注册表创建工厂
    pub fn new(registry: Arc<TypeRegistry>) -> Self {
        Self::with_options(registry, FactoryOptions::default())
    }

    /// 使用给定选项创建工厂
    pub fn with_options(registry: Arc<TypeRegistry>, options: FactoryOptions) -> Self {
        Self {
            registry,
            options,
            definitions: RwLock::new(DefinitionTable::default()),
            singletons: DashMap::new(),
        }
    }

    /// 已创建的单例数量
    pub fn singleton_count(&self) -> usize {
        self.singletons
            .iter()
            .filter(|entry| entry.value().get().is_some())
            .count()
    }

    /// 按注册顺序预实例化全部单例
    pub fn preinstantiate_singletons(&self) -> BeanResult<usize> {
        let names: Vec<String> = {
            let table = self.definitions.read();
            table
                .order
                .iter()
                .filter(|name| table.by_name.get(*name).is_some_and(BeanDefinition::is_singleton))
                .cloned()
                .collect()
        };

        info!("预实例化 {} 个单例 Bean", names.len());
        for name in &names {
            self.get_bean(name)?;
        }
        Ok(names.len())
    }

    fn resolve_named(&self, name: &str, ctx: &mut ResolveContext) -> BeanResult<BeanRef> {
        let definition = self
            .get_bean_definition(name)
            .ok_or_else(|| BeanError::not_found(name))?;

        if definition.is_singleton() {
            if let Some(bean) = self.get_singleton(name) {
                return Ok(bean);
            }
        }

        // 必须在进入 OnceCell 初始化之前检测环，同一线程重入同一个 cell 会死锁
        ctx.push_bean(name)?;
        let result = match definition.scope() {
            BeanScope::Singleton => self.resolve_singleton(name, &definition, ctx),
            BeanScope::Prototype => self.create_bean(name, &definition, ctx),
        };
        ctx.pop_bean();
        result
    }

    fn resolve_singleton(
        &self,
        name: &str,
        definition: &BeanDefinition,
        ctx: &mut ResolveContext,
    ) -> BeanResult<BeanRef> {
        let cell = self
            .singletons
            .entry(name.to_string())
            .or_default()
            .value()
            .clone();

        cell.get_or_try_init(|| self.create_bean(name, definition, ctx))
            .cloned()
    }

    fn resolve_by_type(
        &self,
        type_id: TypeId,
        type_name: &str,
        ctx: &mut ResolveContext,
    ) -> BeanResult<BeanRef> {
        let candidates: Vec<String> = {
            let table = self.definitions.read();
            table
                .order
                .iter()
                .filter(|name| {
                    table
                        .by_name
                        .get(*name)
                        .is_some_and(|d| d.type_id() == type_id)
                })
                .cloned()
                .collect()
        };

        let first = candidates
            .first()
            .ok_or_else(|| BeanError::no_bean_of_type(type_name))?;
        if candidates.len() > 1 {
            warn!(
                "类型 {} 有多个 Bean 定义 {:?}，使用第一个: {}",
                type_name, candidates, first
            );
        }
        self.resolve_named(first, ctx)
    }

    fn create_bean(
        &self,
        name: &str,
        definition: &BeanDefinition,
        ctx: &mut ResolveContext,
    ) -> BeanResult<BeanRef> {
        debug!("创建 Bean: {} ({})", name, definition.type_name());

        let metadata = self.load_metadata(name, definition)?;
        let mut instance = metadata
            .instantiate()
            .map_err(|source| BeanError::Instantiation {
                bean_name: name.to_string(),
                type_name: definition.type_name().to_string(),
                source,
            })?;

        self.inject_dependencies(name, &metadata, instance.as_mut(), ctx)?;

        debug!("Bean 创建完成: {}", name);
        Ok(BeanRef::from(instance))
    }

    fn load_metadata(
        &self,
        name: &str,
        definition: &BeanDefinition,
    ) -> BeanResult<Arc<TypeDescriptor>> {
        self.registry
            .load(definition.type_name())
            .ok_or_else(|| BeanError::Instantiation {
                bean_name: name.to_string(),
                type_name: definition.type_name().to_string(),
                source: format!("类型未注册: {}", definition.type_name()).into(),
            })
    }

    fn inject_dependencies(
        &self,
        name: &str,
        metadata: &TypeDescriptor,
        target: &mut (dyn Any + Send + Sync),
        ctx: &mut ResolveContext,
    ) -> BeanResult<()> {
        for field in metadata.declared_fields() {
            let resolved = self.resolve_by_type(
                field.dependency_type_id(),
                field.dependency_type_name(),
                ctx,
            );

            let dependency = match resolved {
                Ok(dependency) => dependency,
                Err(err @ BeanError::CircularDependency { .. }) => return Err(err),
                Err(err) if !field.is_required() => {
                    if err.is_not_found() {
                        debug!("可选依赖缺失，跳过字段 {}.{}", name, field.name());
                    } else {
                        warn!("可选依赖解析失败，跳过字段 {}.{}: {}", name, field.name(), err);
                    }
                    continue;
                }
                Err(err) => {
                    return Err(BeanError::DependencyInjection {
                        bean_name: name.to_string(),
                        field: field.name().to_string(),
                        dependency: field.dependency_type_name().to_string(),
                        source: Box::new(err),
                    })
                }
            };

            field.inject(target, dependency).map_err(|source| {
                BeanError::DependencyInjection {
                    bean_name: name.to_string(),
                    field: field.name().to_string(),
                    dependency: field.dependency_type_name().to_string(),
                    source: Box::new(BeanError::type_mismatch(field.name(), source.to_string())),
                }
            })?;
            debug!("已注入字段 {}.{}", name, field.name());
        }
        Ok(())
    }
}

impl BeanFactory for DefaultBeanFactory {
    fn get_bean(&self, name: &str) -> BeanResult<BeanRef> {
        self.resolve_named(name, &mut ResolveContext::new())
    }

    fn get_bean_by_type(&self, type_id: TypeId, type_name: &str) -> BeanResult<BeanRef> {
        self.resolve_by_type(type_id, type_name, &mut ResolveContext::new())
    }

    fn contains_bean(&self, name: &str) -> bool {
        self.contains_bean_definition(name)
    }

    fn is_singleton(&self, name: &str) -> BeanResult<bool> {
        self.get_bean_definition(name)
            .map(|d| d.is_singleton())
            .ok_or_else(|| BeanError::not_found(name))
    }
}

impl BeanDefinitionRegistry for DefaultBeanFactory {
    fn register_bean_definition(&self, name: &str, definition: BeanDefinition) -> BeanResult<()> {
        let mut table = self.definitions.write();

        if let Some(existing) = table.by_name.get(name) {
            if *existing == definition {
                debug!("重复注册相同的 Bean 定义，忽略: {}", name);
                return Ok(());
            }
            if !self.options.allow_definition_overriding {
                return Err(BeanError::DuplicateDefinition {
                    name: name.to_string(),
                    existing: existing.type_name().to_string(),
                    attempted: definition.type_name().to_string(),
                });
            }
            warn!(
                "覆盖 Bean 定义: {} ({} -> {})",
                name,
                existing.type_name(),
                definition.type_name()
            );
        } else {
            table.order.push(name.to_string());
        }

        info!(
            "注册 Bean 定义: {} ({}, {})",
            name,
            definition.type_name(),
            definition.scope()
        );
        table.by_name.insert(name.to_string(), definition);
        Ok(())
    }

    fn get_bean_definition(&self, name: &str) -> Option<BeanDefinition> {
        self.definitions.read().by_name.get(name).cloned()
    }

    fn contains_bean_definition(&self, name: &str) -> bool {
        self.definitions.read().by_name.contains_key(name)
    }

    fn bean_definition_names(&self) -> Vec<String> {
        self.definitions.read().order.clone()
    }

    fn bean_definition_count(&self) -> usize {
        self.definitions.read().order.len()
    }
}

impl ConfigurableBeanFactory for DefaultBeanFactory {
    fn get_singleton(&self, name: &str) -> Option<BeanRef> {
        self.singletons
            .get(name)
            .and_then(|entry| entry.value().get().cloned())
    }

    fn destroy_bean(&self, name: &str) {
        let Some((_, cell)) = self.singletons.remove(name) else {
            return;
        };
        let Some(bean) = cell.get() else {
            return;
        };

        let disposer = self
            .get_bean_definition(name)
            .and_then(|definition| self.registry.load(definition.type_name()))
            .and_then(|metadata| metadata.disposer().cloned());

        if let Some(disposer) = disposer {
            debug!("销毁 Bean: {}", name);
            if let Err(e) = disposer(bean.as_ref()) {
                warn!("销毁 Bean 失败（已忽略）: {}: {}", name, e);
            }
        }
    }

    fn destroy_singletons(&self) {
        let names = self.bean_definition_names();
        info!("销毁单例 Bean");
        for name in names.iter().rev() {
            self.destroy_bean(name);
        }
        self.clear_singleton_cache();
    }

    fn clear_singleton_cache(&self) {
        self.singletons.clear();
    }
}

impl std::fmt::Debug for DefaultBeanFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DefaultBeanFactory")
            .field("definitions", &self.bean_definition_names())
            .field("singletons", &self.singleton_count())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
