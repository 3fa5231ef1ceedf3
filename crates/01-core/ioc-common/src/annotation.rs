//! 注解类型索引
//!
//! 记录每种标记的元注解（标记在标记上的标记），用于传递性判断
//! “某类型是否（直接或间接）带有某个标记”。

use crate::metadata::TypeMetadata;
use dashmap::DashMap;
use std::collections::HashSet;
use tracing::debug;

/// 内置标记名称
pub mod markers {
    /// 组件
    pub const COMPONENT: &str = "component";
    /// 服务（元注解为组件）
    pub const SERVICE: &str = "service";
    /// 控制器（元注解为组件）
    pub const CONTROLLER: &str = "controller";
    /// 路由声明
    pub const REQUEST_MAPPING: &str = "request_mapping";
    /// 自动装配
    pub const AUTOWIRED: &str = "autowired";
    /// 请求参数
    pub const REQUEST_PARAM: &str = "request_param";
    /// 作用域
    pub const SCOPE: &str = "scope";
}

/// 语言/编译器自带的属性名，永远不参与元注解遍历
const PLATFORM_ATTRIBUTES: &[&str] = &[
    "derive",
    "doc",
    "allow",
    "warn",
    "deny",
    "cfg",
    "cfg_attr",
    "repr",
    "must_use",
    "non_exhaustive",
    "deprecated",
];

/// 是否为平台属性
pub fn is_platform_attribute(name: &str) -> bool {
    PLATFORM_ATTRIBUTES.contains(&name)
}

/// 注解类型索引
#[derive(Debug, Default)]
pub struct AnnotationIndex {
    meta_annotations: DashMap<String, Vec<String>>,
}

impl AnnotationIndex {
    /// 创建空索引
    pub fn new() -> Self {
        Self::default()
    }

    /// 创建包含内置标记的索引
    pub fn with_builtin_markers() -> Self {
        let index = Self::new();
        index.register(markers::COMPONENT, &[]);
        index.register(markers::SERVICE, &[markers::COMPONENT]);
        index.register(markers::CONTROLLER, &[markers::COMPONENT]);
        index.register(markers::REQUEST_MAPPING, &[]);
        index.register(markers::AUTOWIRED, &[]);
        index.register(markers::REQUEST_PARAM, &[]);
        index.register(markers::SCOPE, &[]);
        index
    }

    /// 注册标记及其元注解；重复注册会覆盖
    pub fn register(&self, marker: &str, meta: &[&str]) {
        debug!("注册注解类型: {} -> {:?}", marker, meta);
        self.meta_annotations.insert(
            marker.to_string(),
            meta.iter().map(|m| (*m).to_string()).collect(),
        );
    }

    /// 是否已知该标记
    pub fn contains(&self, marker: &str) -> bool {
        self.meta_annotations.contains_key(marker)
    }

    /// 标记的元注解
    pub fn meta_annotations_of(&self, marker: &str) -> Vec<String> {
        self.meta_annotations
            .get(marker)
            .map(|m| m.value().clone())
            .unwrap_or_default()
    }

    /// 注解类型本身是否（传递地）带有 `marker`
    pub fn annotation_carries(&self, annotation: &str, marker: &str) -> bool {
        let mut visited = HashSet::new();
        self.walk(annotation, marker, &mut visited)
    }

    /// 类型是否直接或经由元注解带有 `marker`
    ///
    /// 遍历使用已访问集合，元注解之间的环不会导致死循环。
    pub fn is_marked(&self, metadata: &dyn TypeMetadata, marker: &str) -> bool {
        if metadata.has_marker(marker) {
            return true;
        }

        let mut visited = HashSet::new();
        metadata
            .annotations()
            .iter()
            .filter(|a| !a.is_platform())
            .any(|a| self.walk(a.name(), marker, &mut visited))
    }

    fn walk(&self, annotation: &str, marker: &str, visited: &mut HashSet<String>) -> bool {
        if annotation == marker {
            return true;
        }
        if is_platform_attribute(annotation) || !visited.insert(annotation.to_string()) {
            return false;
        }

        self.meta_annotations_of(annotation)
            .iter()
            .any(|meta| self.walk(meta, marker, visited))
    }
}
