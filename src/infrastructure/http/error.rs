//! HTTP Error Handling - problem+json 错误信封
//!
//! 中间件和处理器通过 `Err(ErrorSignal)` 中止请求，
//! 由 Dispatcher 统一转换为 `{"status": <int>, "title": "<message>"}`。

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::application::ApplicationError;

/// problem+json 内容类型
pub const PROBLEM_JSON: &str = "application/problem+json";

/// 内部错误对外统一的标题
pub const INTERNAL_TITLE: &str = "error";

/// 错误响应体
#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct ProblemDetails {
    pub status: u16,
    pub title: String,
}

/// 请求处理失败信号
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorSignal {
    /// 预期内的失败，状态码和消息直接返回客户端
    Status { status: StatusCode, title: String },
    /// 内部错误，细节只写日志，客户端只看到 500 "error"
    Internal(String),
}

impl ErrorSignal {
    pub fn new(status: StatusCode, title: impl Into<String>) -> Self {
        if status.is_server_error() {
            return Self::Internal(title.into());
        }
        Self::Status {
            status,
            title: title.into(),
        }
    }

    pub fn bad_request(title: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, title)
    }

    pub fn unauthorized(title: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, title)
    }

    pub fn not_found(title: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, title)
    }

    pub fn request_timeout(title: impl Into<String>) -> Self {
        Self::new(StatusCode::REQUEST_TIMEOUT, title)
    }

    pub fn conflict(title: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, title)
    }

    pub fn payload_too_large(title: impl Into<String>) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, title)
    }

    pub fn unprocessable(title: impl Into<String>) -> Self {
        Self::new(StatusCode::UNPROCESSABLE_ENTITY, title)
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal(detail.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::Status { status, .. } => *status,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 对客户端可见的标题
    pub fn title(&self) -> &str {
        match self {
            Self::Status { title, .. } => title,
            Self::Internal(_) => INTERNAL_TITLE,
        }
    }

    pub fn problem(&self) -> ProblemDetails {
        ProblemDetails {
            status: self.status().as_u16(),
            title: self.title().to_string(),
        }
    }
}

impl std::fmt::Display for ErrorSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Status { status, title } => write!(f, "{} {}", status.as_u16(), title),
            Self::Internal(detail) => write!(f, "500 {}", detail),
        }
    }
}

impl std::error::Error for ErrorSignal {}

impl IntoResponse for ErrorSignal {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match serde_json::to_vec(&self.problem()) {
            Ok(body) => body,
            Err(_) => br#"{"status":500,"title":"error"}"#.to_vec(),
        };

        let mut response = (status, body).into_response();
        response
            .headers_mut()
            .insert(header::CONTENT_TYPE, HeaderValue::from_static(PROBLEM_JSON));
        response
    }
}

impl From<ApplicationError> for ErrorSignal {
    fn from(e: ApplicationError) -> Self {
        match e {
            ApplicationError::NotFound { resource_type, .. } => {
                ErrorSignal::not_found(format!("{} not found", resource_type.to_lowercase()))
            }
            ApplicationError::ValidationError(msg) => ErrorSignal::unprocessable(msg),
            ApplicationError::Conflict(msg) => ErrorSignal::conflict(msg),
            ApplicationError::Unauthorized(msg) => ErrorSignal::unauthorized(msg),
            other => ErrorSignal::internal(other.to_string()),
        }
    }
}
