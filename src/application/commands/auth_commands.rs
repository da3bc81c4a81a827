//! Auth Commands - 注册与登录命令

use crate::domain::session::SessionToken;

/// 注册用户命令（字段已通过 HTTP 层校验）
#[derive(Debug, Clone)]
pub struct RegisterUserCommand {
    pub email: String,
    pub name: String,
    pub password: String,
}

/// 注册用户响应
#[derive(Debug, Clone)]
pub struct RegisterUserResponse {
    pub user_id: i64,
}

/// 登录命令
#[derive(Debug, Clone)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
    pub ip: String,
    pub user_agent: String,
}

/// 登录响应
#[derive(Debug, Clone)]
pub struct LoginResponse {
    pub user_id: i64,
    pub token: SessionToken,
    pub expires_at_ms: i64,
}
