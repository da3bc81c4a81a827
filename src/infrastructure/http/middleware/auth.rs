//! 会话认证中间件

use std::sync::Arc;

use async_trait::async_trait;

use super::Middleware;
use crate::application::{AuthenticateSessionHandler, AuthenticateSessionQuery};
use crate::domain::session::SessionToken;
use crate::infrastructure::http::context::RequestContext;
use crate::infrastructure::http::error::ErrorSignal;

/// 会话 cookie 名称
pub const SESSION_COOKIE: &str = "sid";

/// 从 `sid` cookie 解析会话并写入 `ctx.session`
///
/// `optional` 模式下无会话也放行；`required` 模式下无有效会话返回 401。
pub struct SessionAuth {
    authenticator: Arc<AuthenticateSessionHandler>,
    required: bool,
}

impl SessionAuth {
    pub fn optional(authenticator: Arc<AuthenticateSessionHandler>) -> Self {
        Self {
            authenticator,
            required: false,
        }
    }

    pub fn required(authenticator: Arc<AuthenticateSessionHandler>) -> Self {
        Self {
            authenticator,
            required: true,
        }
    }
}

#[async_trait]
impl Middleware for SessionAuth {
    fn name(&self) -> &'static str {
        if self.required {
            "require_auth"
        } else {
            "optional_auth"
        }
    }

    async fn handle(&self, ctx: &mut RequestContext) -> Result<(), ErrorSignal> {
        let token = ctx.cookie(SESSION_COOKIE).and_then(SessionToken::parse);

        if let Some(token) = token {
            ctx.session = self
                .authenticator
                .handle(AuthenticateSessionQuery { token })
                .await?;
        }

        if self.required && ctx.session.is_none() {
            return Err(ErrorSignal::unauthorized("not authenticated"));
        }
        Ok(())
    }
}
