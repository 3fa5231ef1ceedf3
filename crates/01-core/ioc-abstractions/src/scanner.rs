//! 类型扫描抽象

use std::collections::BTreeSet;

/// 类型扫描器
///
/// 根据根路径（模块路径前缀）列出候选类型名。实现不应因单个条目失败而整体失败。
pub trait TypeScanner: Send + Sync {
    /// 扫描根路径下的全部类型名
    fn scan(&self, root: &str) -> BTreeSet<String>;
}

/// 判断类型名是否位于根路径下（等于根路径或以 `root::` 开头）
///
/// 根路径也接受 `.` 分隔的包名写法，`app.web` 等同于 `app::web`。
pub fn is_under_root(type_name: &str, root: &str) -> bool {
    let root = normalize_root(root);
    if root.is_empty() {
        return false;
    }
    type_name == root
        || type_name
            .strip_prefix(root.as_str())
            .is_some_and(|rest| rest.starts_with("::"))
}

/// 把根路径规整为 `::` 分隔的模块路径
pub fn normalize_root(root: &str) -> String {
    root.trim()
        .replace('.', "::")
        .trim_end_matches("::")
        .to_string()
}
