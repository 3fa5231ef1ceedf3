//! 基于类型注册表的扫描器

use ioc_abstractions::{is_under_root, TypeScanner};
use ioc_common::{AnnotationIndex, TypeDescriptor, TypeRegistry};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, warn};

/// 默认类型扫描器：按模块路径前缀列出已注册类型
#[derive(Debug, Clone)]
pub struct RegistryTypeScanner {
    registry: Arc<TypeRegistry>,
}

impl RegistryTypeScanner {
    /// 创建扫描器
    pub const fn new(registry: Arc<TypeRegistry>) -> Self {
        Self { registry }
    }
}

impl TypeScanner for RegistryTypeScanner {
    fn scan(&self, root: &str) -> BTreeSet<String> {
        self.registry
            .type_names()
            .into_iter()
            .filter(|name| is_under_root(name, root))
            .collect()
    }
}

/// 组件扫描器：扫描 + 加载 + 传递性标记判断
#[derive(Clone)]
pub struct ComponentScanner {
    scanner: Arc<dyn TypeScanner>,
    registry: Arc<TypeRegistry>,
    index: Arc<AnnotationIndex>,
}

impl ComponentScanner {
    /// 创建组件扫描器
    pub fn new(
        scanner: Arc<dyn TypeScanner>,
        registry: Arc<TypeRegistry>,
        index: Arc<AnnotationIndex>,
    ) -> Self {
        Self {
            scanner,
            registry,
            index,
        }
    }

    /// 扫描根路径下带有 `marker`（直接或经由元注解）的类型
    ///
    /// 无法加载的类型记录警告后跳过。
    pub fn scan_with_marker(&self, root: &str, marker: &str) -> Vec<Arc<TypeDescriptor>> {
        let candidates = self.scanner.scan(root);
        debug!("扫描根路径 {} 得到 {} 个候选类型", root, candidates.len());

        candidates
            .into_iter()
            .filter_map(|name| {
                let loaded = self.registry.load(&name);
                if loaded.is_none() {
                    warn!("无法加载类型 {}，已跳过", name);
                }
                loaded
            })
            .filter(|metadata| self.index.is_marked(metadata.as_ref(), marker))
            .collect()
    }
}
