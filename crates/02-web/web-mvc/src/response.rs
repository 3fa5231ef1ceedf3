//! 与传输层无关的响应模型

use crate::view::Model;

/// 常用状态码
pub mod status {
    /// 200
    pub const OK: u16 = 200;
    /// 404
    pub const NOT_FOUND: u16 = 404;
    /// 500
    pub const INTERNAL_SERVER_ERROR: u16 = 500;
}

/// 纯文本内容类型
pub const TEXT_PLAIN_UTF8: &str = "text/plain;charset=UTF-8";

/// 视图转发目标
#[derive(Debug, Clone, PartialEq)]
pub struct Forward {
    /// 模板资源路径
    pub target: String,
    /// 模型
    pub model: Model,
}

/// Web 响应
#[derive(Debug, Clone, PartialEq)]
pub struct WebResponse {
    status: u16,
    content_type: Option<String>,
    character_encoding: Option<String>,
    headers: Vec<(String, String)>,
    body: String,
    forward: Option<Forward>,
    error_sent: bool,
}

impl Default for WebResponse {
    fn default() -> Self {
        Self::new()
    }
}

impl WebResponse {
    /// 创建 200 空响应
    pub const fn new() -> Self {
        Self {
            status: status::OK,
            content_type: None,
            character_encoding: None,
            headers: Vec::new(),
            body: String::new(),
            forward: None,
            error_sent: false,
        }
    }

    /// 状态码
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// 设置状态码
    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    /// 内容类型
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// 设置内容类型
    pub fn set_content_type(&mut self, content_type: impl Into<String>) {
        self.content_type = Some(content_type.into());
    }

    /// 字符编码
    pub fn character_encoding(&self) -> Option<&str> {
        self.character_encoding.as_deref()
    }

    /// 设置字符编码
    pub fn set_character_encoding(&mut self, encoding: impl Into<String>) {
        self.character_encoding = Some(encoding.into());
    }

    /// 追加响应头
    pub fn add_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.headers.push((name.into(), value.into()));
    }

    /// 响应头
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// 写入响应体
    pub fn write(&mut self, text: &str) {
        self.body.push_str(text);
    }

    /// 响应体
    pub fn body(&self) -> &str {
        &self.body
    }

    /// 记录视图转发
    pub fn forward(&mut self, target: impl Into<String>, model: Model) {
        self.forward = Some(Forward {
            target: target.into(),
            model,
        });
    }

    /// 转发目标
    pub const fn forwarded(&self) -> Option<&Forward> {
        self.forward.as_ref()
    }

    /// 发送错误状态，丢弃已写入的内容
    pub fn send_error(&mut self, status: u16) {
        self.reset();
        self.status = status;
        self.content_type = Some(TEXT_PLAIN_UTF8.to_string());
        self.body = reason_phrase(status).to_string();
        self.error_sent = true;
    }

    /// 是否已发送错误
    pub const fn is_error(&self) -> bool {
        self.error_sent
    }

    /// 重置为初始状态
    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

fn reason_phrase(status: u16) -> &'static str {
    match status {
        status::OK => "OK",
        400 => "Bad Request",
        status::NOT_FOUND => "Not Found",
        405 => "Method Not Allowed",
        status::INTERNAL_SERVER_ERROR => "Internal Server Error",
        _ => "Error",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_error_discards_body() {
        let mut response = WebResponse::new();
        response.write("partial");
        response.add_header("X-Trace", "1");
        response.send_error(status::NOT_FOUND);

        assert_eq!(response.status(), 404);
        assert_eq!(response.body(), "Not Found");
        assert!(response.headers().is_empty());
        assert!(response.is_error());
    }

    #[test]
    fn test_write_appends() {
        let mut response = WebResponse::default();
        response.write("a");
        response.write("b");
        assert_eq!(response.body(), "ab");
        assert_eq!(response.status(), status::OK);
    }
}
