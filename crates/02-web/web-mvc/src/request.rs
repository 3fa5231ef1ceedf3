//! 与传输层无关的请求模型

use crate::path::normalize_path;
use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;

/// Web 请求
#[derive(Debug, Default)]
pub struct WebRequest {
    method: String,
    request_uri: String,
    context_path: String,
    parameters: HashMap<String, Vec<String>>,
    headers: HashMap<String, String>,
    attributes: RwLock<HashMap<String, Value>>,
}

impl WebRequest {
    /// 创建请求，`uri` 可以带查询串
    pub fn new(method: impl Into<String>, uri: &str) -> Self {
        let (path, query) = uri.split_once('?').unwrap_or((uri, ""));
        let mut request = Self {
            method: method.into().to_ascii_uppercase(),
            request_uri: path.to_string(),
            ..Self::default()
        };
        request.add_encoded_parameters(query);
        request
    }

    /// 创建 GET 请求
    pub fn get(uri: &str) -> Self {
        Self::new("GET", uri)
    }

    /// 设置上下文路径
    #[must_use]
    pub fn with_context_path(mut self, context_path: impl Into<String>) -> Self {
        self.context_path = context_path.into();
        self
    }

    /// 追加请求参数
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters
            .entry(name.into())
            .or_default()
            .push(value.into());
        self
    }

    /// 设置请求头（名称不区分大小写）
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
        self
    }

    /// 追加 `application/x-www-form-urlencoded` 表单参数
    #[must_use]
    pub fn with_form_body(mut self, body: &str) -> Self {
        self.add_encoded_parameters(body);
        self
    }

    fn add_encoded_parameters(&mut self, encoded: &str) {
        for (name, value) in url::form_urlencoded::parse(encoded.as_bytes()) {
            self.parameters
                .entry(name.into_owned())
                .or_default()
                .push(value.into_owned());
        }
    }

    /// 请求方法
    pub fn method(&self) -> &str {
        &self.method
    }

    /// 请求路径（不含查询串）
    pub fn request_uri(&self) -> &str {
        &self.request_uri
    }

    /// 上下文路径
    pub fn context_path(&self) -> &str {
        &self.context_path
    }

    /// 用于路由匹配的路径：去掉上下文路径后规范化
    pub fn lookup_path(&self) -> String {
        let context_path = self.context_path.trim_end_matches('/');
        let path = if context_path.is_empty() {
            self.request_uri.as_str()
        } else {
            self.request_uri
                .strip_prefix(context_path)
                .filter(|rest| rest.is_empty() || rest.starts_with('/'))
                .unwrap_or(&self.request_uri)
        };
        normalize_path(path)
    }

    /// 请求参数的第一个值
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters
            .get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// 请求参数的全部值
    pub fn parameter_values(&self, name: &str) -> &[String] {
        self.parameters
            .get(name)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// 所有请求参数名
    pub fn parameter_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.parameters.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// 请求头
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// 设置请求属性
    pub fn set_attribute(&self, name: impl Into<String>, value: Value) {
        self.attributes.write().insert(name.into(), value);
    }

    /// 读取请求属性
    pub fn attribute(&self, name: &str) -> Option<Value> {
        self.attributes.read().get(name).cloned()
    }

    /// 全部请求属性
    pub fn attributes(&self) -> HashMap<String, Value> {
        self.attributes.read().clone()
    }
}
