//! Auth Handlers - 注册、登录、注销与会话查询

use std::sync::Arc;

use async_trait::async_trait;
use axum::http::StatusCode;

use crate::application::{GetUserQuery, LoginCommand, RegisterUserCommand, RevokeSessionCommand};
use crate::domain::session::SessionToken;
use crate::infrastructure::http::context::RequestContext;
use crate::infrastructure::http::dto::{
    LoginRequest, LoginResponse, RegisterRequest, SessionStatusResponse, TitleResponse,
    UserResponse, WriteResponse,
};
use crate::infrastructure::http::error::ErrorSignal;
use crate::infrastructure::http::middleware::SESSION_COOKIE;
use crate::infrastructure::http::response::{Cookie, ResponseWriter};
use crate::infrastructure::http::router::Handler;
use crate::infrastructure::http::state::AppState;

/// POST /auth/register
pub struct RegisterEndpoint(pub Arc<AppState>);

#[async_trait]
impl Handler for RegisterEndpoint {
    async fn handle(
        &self,
        ctx: &mut RequestContext,
        res: &mut ResponseWriter,
    ) -> Result<(), ErrorSignal> {
        let req = RegisterRequest::from_body(&ctx.body)?;

        let registered = self
            .0
            .register_handler
            .handle(RegisterUserCommand {
                email: req.email,
                name: req.name,
                password: req.password,
            })
            .await?;

        res.status(StatusCode::CREATED).json(&WriteResponse {
            id: registered.user_id,
            changes: 1,
            title: "user created",
        });
        Ok(())
    }
}

/// POST /auth/login
pub struct LoginEndpoint(pub Arc<AppState>);

#[async_trait]
impl Handler for LoginEndpoint {
    async fn handle(
        &self,
        ctx: &mut RequestContext,
        res: &mut ResponseWriter,
    ) -> Result<(), ErrorSignal> {
        let req = LoginRequest::from_body(&ctx.body)?;
        let state = &self.0;

        let login = state
            .login_handler
            .handle(LoginCommand {
                email: req.email,
                password: req.password,
                ip: ctx.client_addr.to_string(),
                user_agent: ctx.user_agent().to_string(),
            })
            .await?;

        let cookie = Cookie::new(SESSION_COOKIE, login.token.as_str())
            .max_age(state.cookie_max_age())
            .secure(state.session_settings.cookie_secure);
        res.set_cookie(&cookie)?.json(&LoginResponse {
            user_id: login.user_id,
            expires_at_ms: login.expires_at_ms,
            title: "logged in",
        });
        Ok(())
    }
}

/// POST /auth/logout（需要登录）
pub struct LogoutEndpoint(pub Arc<AppState>);

#[async_trait]
impl Handler for LogoutEndpoint {
    async fn handle(
        &self,
        ctx: &mut RequestContext,
        res: &mut ResponseWriter,
    ) -> Result<(), ErrorSignal> {
        let token = ctx
            .cookie(SESSION_COOKIE)
            .and_then(SessionToken::parse)
            .ok_or_else(|| ErrorSignal::unauthorized("not authenticated"))?;

        self.0
            .revoke_session_handler
            .handle(RevokeSessionCommand { token })
            .await?;
        ctx.session = None;

        res.clear_cookie(SESSION_COOKIE)?
            .json(&TitleResponse { title: "logged out" });
        Ok(())
    }
}

/// GET /auth/me（需要登录）
pub struct MeEndpoint(pub Arc<AppState>);

#[async_trait]
impl Handler for MeEndpoint {
    async fn handle(
        &self,
        ctx: &mut RequestContext,
        res: &mut ResponseWriter,
    ) -> Result<(), ErrorSignal> {
        let user_id = ctx
            .session
            .as_ref()
            .map(|s| s.user_id)
            .ok_or_else(|| ErrorSignal::unauthorized("not authenticated"))?;

        let user = self.0.get_user_handler.handle(GetUserQuery { user_id }).await?;

        res.json(&UserResponse {
            id: user.id,
            email: user.email,
            name: user.name,
            created_at: user.created_at.to_rfc3339(),
        });
        Ok(())
    }
}

/// GET /auth/session（可选登录）
pub struct SessionStatusEndpoint;

#[async_trait]
impl Handler for SessionStatusEndpoint {
    async fn handle(
        &self,
        ctx: &mut RequestContext,
        res: &mut ResponseWriter,
    ) -> Result<(), ErrorSignal> {
        res.json(&SessionStatusResponse {
            authenticated: ctx.session.is_some(),
            user_id: ctx.session.as_ref().map(|s| s.user_id),
            expires_at_ms: ctx.session.as_ref().map(|s| s.expires_at_ms),
        });
        Ok(())
    }
}
