//! Request Context - 每个请求独占的上下文
//!
//! 由 Dispatcher 为每个请求新建，中间件和处理器通过 `&mut` 访问，
//! 不同请求之间从不共享。

use std::collections::HashMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::body::Body;
use http::{header, HeaderMap, Method, Request};
use serde_json::Value;
use uuid::Uuid;

use crate::application::SessionRecord;

/// 查询参数（同名参数可出现多次）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams(Vec<(String, String)>);

impl QueryParams {
    pub fn parse(query: &str) -> Self {
        Self(
            url::form_urlencoded::parse(query.as_bytes())
                .into_owned()
                .collect(),
        )
    }

    /// 第一个同名参数
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// 请求上下文
pub struct RequestContext {
    pub method: Method,
    /// 原始请求目标（含查询串）
    pub raw_path: String,
    pub pathname: String,
    pub query: QueryParams,
    /// 路由匹配后填充
    pub params: HashMap<String, String>,
    /// JSON 请求体，默认 `{}`
    pub body: Value,
    pub headers: HeaderMap,
    pub client_addr: IpAddr,
    pub request_id: Uuid,
    /// 由认证中间件填充
    pub session: Option<SessionRecord>,
    raw_body: Option<Body>,
}

impl RequestContext {
    /// 从 HTTP 请求构建上下文；请求体保留为未读的流，由 BodyJson 中间件消费
    pub fn from_request(request: Request<Body>, peer: Option<SocketAddr>) -> Self {
        let (parts, body) = request.into_parts();

        let raw_path = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| parts.uri.path().to_string());
        let query = parts.uri.query().map(QueryParams::parse).unwrap_or_default();

        Self {
            method: parts.method,
            raw_path,
            pathname: parts.uri.path().to_string(),
            query,
            params: HashMap::new(),
            body: Value::Object(Default::default()),
            headers: parts.headers,
            client_addr: peer
                .map(|addr| addr.ip())
                .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST)),
            request_id: Uuid::new_v4(),
            session: None,
            raw_body: Some(body),
        }
    }

    pub fn header(&self, name: impl header::AsHeaderName) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// 读取 Cookie 头中的指定项
    pub fn cookie(&self, name: &str) -> Option<&str> {
        self.headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value.trim())
    }

    pub fn user_agent(&self) -> &str {
        self.header(header::USER_AGENT).unwrap_or_default()
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// 取出原始请求体，只能取一次
    pub fn take_body(&mut self) -> Option<Body> {
        self.raw_body.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(uri: &str) -> Request<Body> {
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .header(header::COOKIE, "theme=dark; sid=abc123")
            .header(header::USER_AGENT, "curl/8")
            .body(Body::empty())
            .unwrap()
    }

    #[test]
    fn test_from_request_defaults() {
        let ctx = RequestContext::from_request(request("/lms/course?page=2&tag=a&tag=b"), None);

        assert_eq!(ctx.method, Method::GET);
        assert_eq!(ctx.pathname, "/lms/course");
        assert_eq!(ctx.raw_path, "/lms/course?page=2&tag=a&tag=b");
        assert_eq!(ctx.query.get("page"), Some("2"));
        assert_eq!(ctx.query.get_all("tag"), vec!["a", "b"]);
        assert!(ctx.params.is_empty());
        assert_eq!(ctx.body, serde_json::json!({}));
        assert_eq!(ctx.client_addr, IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert!(ctx.session.is_none());
    }

    #[test]
    fn test_peer_address_and_headers() {
        let peer: SocketAddr = "10.0.0.7:5123".parse().unwrap();
        let ctx = RequestContext::from_request(request("/"), Some(peer));

        assert_eq!(ctx.client_addr.to_string(), "10.0.0.7");
        assert_eq!(ctx.cookie("sid"), Some("abc123"));
        assert_eq!(ctx.cookie("missing"), None);
        assert_eq!(ctx.user_agent(), "curl/8");
    }

    #[test]
    fn test_query_is_percent_decoded() {
        let ctx = RequestContext::from_request(request("/search?q=caf%C3%A9+au+lait"), None);
        assert_eq!(ctx.query.get("q"), Some("café au lait"));
    }

    #[test]
    fn test_body_taken_once() {
        let mut ctx = RequestContext::from_request(request("/"), None);
        assert!(ctx.take_body().is_some());
        assert!(ctx.take_body().is_none());
    }
}
