//! Session Commands - 会话相关命令

use crate::domain::session::SessionToken;

/// 创建会话命令（登录成功后调用）
#[derive(Debug, Clone)]
pub struct CreateSessionCommand {
    pub user_id: i64,
    pub ip: String,
    pub user_agent: String,
}

/// 创建会话响应
///
/// `token` 写入客户端 cookie，服务端只保存其摘要。
#[derive(Debug, Clone)]
pub struct CreateSessionResponse {
    pub token: SessionToken,
    pub expires_at_ms: i64,
}

/// 注销会话命令
#[derive(Debug, Clone)]
pub struct RevokeSessionCommand {
    pub token: SessionToken,
}

/// 注销会话响应
#[derive(Debug, Clone)]
pub struct RevokeSessionResponse {
    pub revoked: bool,
}
