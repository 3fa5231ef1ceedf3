//! axum 传输层适配
//!
//! 把 axum 请求转换为 [`WebRequest`]，在阻塞线程上调用 [`Dispatcher::service`]，
//! 再把 [`WebResponse`] 转换回 axum 响应。转发视图以纯文本描述模板目标。

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::Router;
use std::sync::Arc;
use tracing::error;
use web_mvc::{Dispatcher, WebRequest, WebResponse, TEXT_PLAIN_UTF8};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// 所有路径都交给分发器的路由
pub fn router(dispatcher: Arc<Dispatcher>) -> Router {
    Router::new().fallback(handle).with_state(dispatcher)
}

async fn handle(
    State(dispatcher): State<Arc<Dispatcher>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let request = to_web_request(&method, &uri, &headers, &body);

    let outcome = tokio::task::spawn_blocking(move || {
        let mut response = WebResponse::new();
        dispatcher.service(&request, &mut response);
        (request, response)
    })
    .await;

    match outcome {
        Ok((request, response)) => into_response(&request, &response),
        Err(e) => {
            error!("分发任务异常结束: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

fn to_web_request(method: &Method, uri: &Uri, headers: &HeaderMap, body: &str) -> WebRequest {
    let target = uri.path_and_query().map_or("/", |pq| pq.as_str());
    let mut request = WebRequest::new(method.as_str(), target);

    for (name, value) in headers {
        if let Ok(value) = value.to_str() {
            request = request.with_header(name.as_str(), value);
        }
    }

    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.starts_with(FORM_CONTENT_TYPE));
    if is_form {
        request = request.with_form_body(body);
    }
    request
}

fn into_response(request: &WebRequest, response: &WebResponse) -> Response {
    let status =
        StatusCode::from_u16(response.status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if let Some(forward) = response.forwarded() {
        let attributes = serde_json::to_string(&request.attributes()).unwrap_or_default();
        let text = format!("forward: {}\nattributes: {}\n", forward.target, attributes);
        return (status, [(header::CONTENT_TYPE, TEXT_PLAIN_UTF8)], text).into_response();
    }

    let mut builder = Response::builder().status(status);
    if let Some(content_type) = response.content_type() {
        builder = builder.header(header::CONTENT_TYPE, content_type);
    }
    for (name, value) in response.headers() {
        builder = builder.header(name.as_str(), value.as_str());
    }

    builder
        .body(Body::from(response.body().to_string()))
        .unwrap_or_else(|e| {
            error!("响应转换失败: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        })
}
