//! 路径规范化

/// 规范化路径
///
/// 空串变为 `/`；补齐前导 `/`；连续的 `/` 合并为一个；非根路径去掉末尾 `/`。
/// 结果满足 `normalize_path(normalize_path(p)) == normalize_path(p)`。
pub fn normalize_path(path: &str) -> String {
    let mut normalized = String::with_capacity(path.len() + 1);
    normalized.push('/');

    for c in path.chars() {
        if c == '/' && normalized.ends_with('/') {
            continue;
        }
        normalized.push(c);
    }

    if normalized.len() > 1 && normalized.ends_with('/') {
        normalized.pop();
    }
    normalized
}

/// 拼接类型级与方法级路由
pub fn combine_paths(base: Option<&str>, path: Option<&str>) -> String {
    let base = normalize_path(base.unwrap_or_default());
    let path = normalize_path(path.unwrap_or_default());
    normalize_path(&format!("{base}{path}"))
}
