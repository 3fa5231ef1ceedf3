//! Bean 工厂抽象

use ioc_common::{BeanError, BeanRef, BeanResult, BeanScope, TypeMetadata};
use std::any::{type_name, Any, TypeId};
use std::sync::Arc;

/// Bean 定义
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BeanDefinition {
    type_name: String,
    type_id: TypeId,
    scope: BeanScope,
}

impl BeanDefinition {
    /// 创建 Bean 定义
    pub fn new(type_name: impl Into<String>, type_id: TypeId, scope: BeanScope) -> Self {
        Self {
            type_name: type_name.into(),
            type_id,
            scope,
        }
    }

    /// 从类型元数据创建 Bean 定义
    pub fn from_metadata(metadata: &dyn TypeMetadata, scope: BeanScope) -> Self {
        Self::new(metadata.type_name(), metadata.declared_type_id(), scope)
    }

    /// 完整类型名
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// 类型 ID
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// 作用域
    pub const fn scope(&self) -> BeanScope {
        self.scope
    }

    /// 是否单例
    pub fn is_singleton(&self) -> bool {
        self.scope == BeanScope::Singleton
    }
}

/// Bean 工厂 trait
pub trait BeanFactory: Send + Sync {
    /// 按名称获取 Bean
    fn get_bean(&self, name: &str) -> BeanResult<BeanRef>;

    /// 按精确类型获取 Bean（多个匹配时返回注册顺序中的第一个）
    fn get_bean_by_type(&self, type_id: TypeId, type_name: &str) -> BeanResult<BeanRef>;

    /// 是否存在该名称的 Bean 定义
    fn contains_bean(&self, name: &str) -> bool;

    /// 该名称的 Bean 是否为单例
    fn is_singleton(&self, name: &str) -> BeanResult<bool>;
}

/// 类型化的 Bean 获取
pub trait BeanFactoryExt: BeanFactory {
    /// 按类型获取并向下转型
    fn get_bean_of<T: Any + Send + Sync>(&self) -> BeanResult<Arc<T>> {
        self.get_bean_by_type(TypeId::of::<T>(), type_name::<T>())?
            .downcast::<T>()
            .map_err(|_| BeanError::type_mismatch(type_name::<T>(), type_name::<T>()))
    }

    /// 按名称获取并向下转型
    fn get_named<T: Any + Send + Sync>(&self, name: &str) -> BeanResult<Arc<T>> {
        self.get_bean(name)?
            .downcast::<T>()
            .map_err(|_| BeanError::type_mismatch(name, type_name::<T>()))
    }
}

impl<F: BeanFactory + ?Sized> BeanFactoryExt for F {}

/// Bean 定义注册表 trait
pub trait BeanDefinitionRegistry: Send + Sync {
    /// 注册 Bean 定义
    fn register_bean_definition(&self, name: &str, definition: BeanDefinition) -> BeanResult<()>;

    /// 获取 Bean 定义
    fn get_bean_definition(&self, name: &str) -> Option<BeanDefinition>;

    /// 是否存在 Bean 定义
    fn contains_bean_definition(&self, name: &str) -> bool;

    /// 所有 Bean 名称（注册顺序）
    fn bean_definition_names(&self) -> Vec<String>;

    /// Bean 定义数量
    fn bean_definition_count(&self) -> usize {
        self.bean_definition_names().len()
    }
}

/// 可配置的 Bean 工厂：单例缓存与销毁
pub trait ConfigurableBeanFactory: BeanFactory + BeanDefinitionRegistry {
    /// 获取已缓存的单例，不触发创建
    fn get_singleton(&self, name: &str) -> Option<BeanRef>;

    /// 销毁单个单例；销毁回调的错误只记录不传播
    fn destroy_bean(&self, name: &str);

    /// 按注册逆序销毁全部单例
    fn destroy_singletons(&self);

    /// 清空单例缓存（不调用销毁回调）
    fn clear_singleton_cache(&self);
}
