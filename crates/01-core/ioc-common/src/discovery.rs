//! 类型注册表
//!
//! 过程宏在程序启动时把类型描述符写入全局注册表；上下文通过注册表
//! 按模块路径扫描候选类型并加载元数据。

use crate::metadata::{MethodDescriptor, TypeDescriptor, TypeMetadata};
use dashmap::DashMap;
use std::any::{Any, TypeId};
use std::sync::Arc;
use tracing::debug;

/// 类型注册表
#[derive(Debug, Default)]
pub struct TypeRegistry {
    types: DashMap<String, TypeDescriptor>,
    methods: DashMap<TypeId, Vec<MethodDescriptor>>,
}

impl TypeRegistry {
    /// 创建空注册表
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册类型描述符，同名类型会被覆盖
    pub fn register_type(&self, descriptor: TypeDescriptor) {
        debug!("注册类型: {}", descriptor.type_name());
        self.types
            .insert(descriptor.type_name().to_string(), descriptor);
    }

    /// 为类型追加方法描述
    pub fn register_methods<T: Any>(&self, methods: Vec<MethodDescriptor>) {
        self.register_methods_for(TypeId::of::<T>(), methods);
    }

    /// 按类型 ID 追加方法描述
    pub fn register_methods_for(&self, type_id: TypeId, methods: Vec<MethodDescriptor>) {
        debug!("注册 {} 个方法描述", methods.len());
        self.methods.entry(type_id).or_default().extend(methods);
    }

    /// 加载类型元数据，未注册时返回 `None`
    pub fn load(&self, type_name: &str) -> Option<Arc<TypeDescriptor>> {
        let descriptor = self.types.get(type_name)?.value().clone();
        let methods = self
            .methods
            .get(&descriptor.declared_type_id())
            .map(|m| m.value().clone())
            .unwrap_or_default();
        Some(Arc::new(descriptor.with_methods(methods)))
    }

    /// 是否已注册
    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// 所有已注册类型名（有序）
    pub fn type_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.types.iter().map(|e| e.key().clone()).collect();
        names.sort();
        names
    }

    /// 已注册类型数量
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::markers;
    use crate::metadata::Annotation;

    struct Home;
    struct Away;

    #[test]
    fn test_register_and_load() {
        let registry = TypeRegistry::new();
        registry.register_type(
            TypeDescriptor::builder::<Home>("app::web", "Home")
                .marker(markers::CONTROLLER)
                .build(),
        );

        assert!(registry.contains("app::web::Home"));
        assert_eq!(registry.len(), 1);
        let loaded = registry.load("app::web::Home").unwrap();
        assert!(loaded.has_marker(markers::CONTROLLER));
        assert!(registry.load("app::web::Missing").is_none());
    }

    #[test]
    fn test_methods_registered_before_type_are_merged() {
        let registry = TypeRegistry::new();
        registry.register_methods::<Home>(vec![MethodDescriptor::new("index")
            .annotation(Annotation::new(markers::REQUEST_MAPPING).with_value("/"))]);
        registry.register_type(TypeDescriptor::builder::<Home>("app", "Home").build());

        let loaded = registry.load("app::Home").unwrap();
        assert_eq!(loaded.declared_methods().len(), 1);
        assert_eq!(loaded.declared_methods()[0].name(), "index");
    }

    #[test]
    fn test_type_names_sorted() {
        let registry = TypeRegistry::new();
        registry.register_type(TypeDescriptor::builder::<Away>("b", "Away").build());
        registry.register_type(TypeDescriptor::builder::<Home>("a", "Home").build());
        assert_eq!(registry.type_names(), vec!["a::Home", "b::Away"]);
    }
}
