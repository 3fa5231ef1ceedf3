//! # IoC Common
//!
//! MiniSpring RS 的公共模型：类型元数据、注解索引、类型注册表、作用域与错误类型。
//!
//! ## 核心组件
//!
//! - [`TypeMetadata`] - 类型元数据能力（注解、待装配字段、方法）
//! - [`TypeDescriptor`] - 由过程宏生成的类型描述符
//! - [`AnnotationIndex`] - 元注解的传递性判断
//! - [`TypeRegistry`] - 启动时填充的类型注册表
//! - [`BeanError`] - 容器错误

pub mod annotation;
pub mod component;
pub mod discovery;
pub mod errors;
pub mod lifecycle;
pub mod metadata;

pub use annotation::*;
pub use component::*;
pub use discovery::*;
pub use errors::*;
pub use lifecycle::*;
pub use metadata::*;

use std::sync::Arc;

/// 全局类型注册表
static GLOBAL_TYPE_REGISTRY: once_cell::sync::Lazy<Arc<TypeRegistry>> =
    once_cell::sync::Lazy::new(|| Arc::new(TypeRegistry::new()));

/// 全局注解类型索引
static GLOBAL_ANNOTATION_INDEX: once_cell::sync::Lazy<
    parking_lot::RwLock<Arc<AnnotationIndex>>,
> = once_cell::sync::Lazy::new(|| {
    parking_lot::RwLock::new(Arc::new(AnnotationIndex::with_builtin_markers()))
});

/// 获取全局类型注册表
pub fn global_type_registry() -> Arc<TypeRegistry> {
    GLOBAL_TYPE_REGISTRY.clone()
}

/// 获取全局注解类型索引
pub fn global_annotation_index() -> Arc<AnnotationIndex> {
    GLOBAL_ANNOTATION_INDEX.read().clone()
}

/// 替换全局注解类型索引
pub fn set_global_annotation_index(index: Arc<AnnotationIndex>) {
    *GLOBAL_ANNOTATION_INDEX.write() = index;
}
