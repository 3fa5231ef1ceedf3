//! Bean 实例与命名约定

use std::any::Any;
use std::sync::Arc;

/// 容器中共享的 Bean 实例
pub type BeanRef = Arc<dyn Any + Send + Sync>;

/// 默认 Bean 名称：简单类型名首字母小写
pub fn default_bean_name(simple_name: &str) -> String {
    let mut chars = simple_name.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_lowercase().chain(chars).collect()
    })
}
