//! Response Writer - 处理器写响应的接口
//!
//! 状态码可链式设置，`json` / `text` 写入响应体后响应即完成。

use std::fmt;

use axum::body::{Body, Bytes};
use axum::http::{header, HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::Response;
use serde::Serialize;

use super::error::ErrorSignal;

pub const APPLICATION_JSON: &str = "application/json";
pub const TEXT_PLAIN: &str = "text/plain; charset=utf-8";

/// Set-Cookie 构造器，默认 `HttpOnly; Path=/; SameSite=Lax`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    name: String,
    value: String,
    max_age: Option<i64>,
    secure: bool,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            max_age: None,
            secure: false,
        }
    }

    /// 立即过期的同名 cookie
    pub fn removal(name: impl Into<String>) -> Self {
        Self::new(name, "").max_age(0)
    }

    pub fn max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }
}

impl fmt::Display for Cookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}; HttpOnly; Path=/; SameSite=Lax", self.name, self.value)?;
        if let Some(max_age) = self.max_age {
            write!(f, "; Max-Age={}", max_age)?;
        }
        if self.secure {
            write!(f, "; Secure")?;
        }
        Ok(())
    }
}

/// 响应写入器
#[derive(Debug)]
pub struct ResponseWriter {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<Bytes>,
}

impl Default for ResponseWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self {
            status: StatusCode::OK,
            headers: HeaderMap::new(),
            body: None,
        }
    }

    pub fn status(&mut self, status: StatusCode) -> &mut Self {
        self.status = status;
        self
    }

    /// 当前（待发送的）状态码
    pub fn pending_status(&self) -> StatusCode {
        self.status
    }

    pub fn header(&mut self, name: HeaderName, value: HeaderValue) -> &mut Self {
        self.headers.insert(name, value);
        self
    }

    pub fn set_cookie(&mut self, cookie: &Cookie) -> Result<&mut Self, ErrorSignal> {
        let value = HeaderValue::from_str(&cookie.to_string())
            .map_err(|e| ErrorSignal::internal(format!("invalid cookie: {}", e)))?;
        self.headers.append(header::SET_COOKIE, value);
        Ok(self)
    }

    pub fn clear_cookie(&mut self, name: &str) -> Result<&mut Self, ErrorSignal> {
        self.set_cookie(&Cookie::removal(name))
    }

    /// 序列化为 JSON 并完成响应；序列化失败时降级为 500 纯文本
    pub fn json<T: Serialize + ?Sized>(&mut self, value: &T) {
        match serde_json::to_vec(value) {
            Ok(body) => self.finish(APPLICATION_JSON, body),
            Err(e) => {
                tracing::error!(error = %e, "Response serialization failed");
                self.status = StatusCode::INTERNAL_SERVER_ERROR;
                self.finish(TEXT_PLAIN, b"error".to_vec());
            }
        }
    }

    pub fn text(&mut self, body: impl Into<String>) {
        self.finish(TEXT_PLAIN, body.into().into_bytes());
    }

    pub fn is_finished(&self) -> bool {
        self.body.is_some()
    }

    fn finish(&mut self, content_type: &'static str, body: Vec<u8>) {
        if self.is_finished() {
            tracing::warn!(status = self.status.as_u16(), "Response already written, ignoring");
            return;
        }
        self.headers
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(content_type));
        self.body = Some(Bytes::from(body));
    }

    /// 未写入响应体时返回空体和当前状态码
    pub fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.body.unwrap_or_default()));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers;
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_status_then_json() {
        let mut res = ResponseWriter::new();
        res.status(StatusCode::CREATED)
            .json(&serde_json::json!({"id": 1, "title": "created"}));
        assert!(res.is_finished());

        let response = res.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(response.headers()[header::CONTENT_TYPE], APPLICATION_JSON);
        assert_eq!(body_string(response).await, r#"{"id":1,"title":"created"}"#);
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("nope"))
        }
    }

    #[tokio::test]
    async fn test_serialization_failure_degrades_to_500() {
        let mut res = ResponseWriter::new();
        res.json(&Unserializable);

        let response = res.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(response.headers()[header::CONTENT_TYPE], TEXT_PLAIN);
        assert_eq!(body_string(response).await, "error");
    }

    #[tokio::test]
    async fn test_unwritten_response_is_empty() {
        let mut res = ResponseWriter::new();
        res.status(StatusCode::NO_CONTENT);
        assert!(!res.is_finished());

        let response = res.into_response();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        assert_eq!(body_string(response).await, "");
    }

    #[tokio::test]
    async fn test_second_write_is_ignored() {
        let mut res = ResponseWriter::new();
        res.text("first");
        res.json(&serde_json::json!({"second": true}));
        assert_eq!(body_string(res.into_response()).await, "first");
    }

    #[test]
    fn test_cookie_rendering() {
        let cookie = Cookie::new("sid", "tok").max_age(1_296_000);
        assert_eq!(
            cookie.to_string(),
            "sid=tok; HttpOnly; Path=/; SameSite=Lax; Max-Age=1296000"
        );

        let secure = Cookie::new("sid", "tok").secure(true);
        assert_eq!(secure.to_string(), "sid=tok; HttpOnly; Path=/; SameSite=Lax; Secure");

        assert_eq!(
            Cookie::removal("sid").to_string(),
            "sid=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0"
        );
    }

    #[test]
    fn test_set_cookie_appends() {
        let mut res = ResponseWriter::new();
        res.set_cookie(&Cookie::new("a", "1")).unwrap();
        res.set_cookie(&Cookie::new("b", "2")).unwrap();
        let response = res.into_response();
        assert_eq!(response.headers().get_all(header::SET_COOKIE).iter().count(), 2);
    }
}
