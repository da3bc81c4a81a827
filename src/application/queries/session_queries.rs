//! Session Queries

use crate::domain::session::SessionToken;

/// 根据客户端令牌查找有效会话
#[derive(Debug, Clone)]
pub struct AuthenticateSessionQuery {
    pub token: SessionToken,
}
