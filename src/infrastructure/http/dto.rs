//! Data Transfer Objects
//!
//! 请求体在处理器边界由校验函数转换为强类型 DTO。

use serde::Serialize;
use serde_json::Value;

use super::error::ErrorSignal;
use super::validate;

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn from_body(body: &Value) -> Result<Self, ErrorSignal> {
        Ok(Self {
            email: validate::email(body.get("email"))?,
            name: validate::string(body.get("name"))?,
            password: validate::password(body.get("password"))?,
        })
    }
}

/// 登录只要求字段存在，强度规则只在注册时检查
#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn from_body(body: &Value) -> Result<Self, ErrorSignal> {
        let password = body
            .get("password")
            .and_then(Value::as_str)
            .filter(|p| !p.is_empty())
            .ok_or_else(|| ErrorSignal::unprocessable("invalid password"))?;

        Ok(Self {
            email: validate::email(body.get("email"))?,
            password: password.to_string(),
        })
    }
}

// ============================================================================
// Responses
// ============================================================================

/// 写操作响应
#[derive(Debug, Serialize)]
pub struct WriteResponse {
    pub id: i64,
    pub changes: u64,
    pub title: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user_id: i64,
    pub expires_at_ms: i64,
    pub title: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TitleResponse {
    pub title: &'static str,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub created_at: String,
}

#[derive(Debug, Serialize)]
pub struct SessionStatusResponse {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at_ms: Option<i64>,
}
