//! HTTP Routes
//!
//! API Endpoints:
//! - /ping           GET   健康检查
//! - /auth/register  POST  注册
//! - /auth/login     POST  登录（写入 sid cookie）
//! - /auth/logout    POST  注销（需要登录）
//! - /auth/me        GET   当前用户（需要登录）
//! - /auth/session   GET   会话状态（可选登录）

use std::sync::Arc;

use axum::http::Method;

use super::handlers;
use super::middleware::{BodyJson, Middleware, RequestLogger, SessionAuth};
use super::router::Router;
use super::state::AppState;

/// 创建所有路由
pub fn create_routes(state: Arc<AppState>, body_json: BodyJson) -> Router {
    let mut router = Router::new();
    router.use_global(RequestLogger).use_global(body_json);

    router.get("/ping", handlers::Ping);
    auth_routes(&mut router, state);
    router
}

/// Auth 路由
fn auth_routes(router: &mut Router, state: Arc<AppState>) {
    let authenticator = state.authenticate_session_handler.clone();
    let require_auth: Arc<dyn Middleware> = Arc::new(SessionAuth::required(authenticator.clone()));
    let optional_auth: Arc<dyn Middleware> = Arc::new(SessionAuth::optional(authenticator));

    router
        .post("/auth/register", handlers::RegisterEndpoint(state.clone()))
        .post("/auth/login", handlers::LoginEndpoint(state.clone()))
        .register(
            Method::POST,
            "/auth/logout",
            handlers::LogoutEndpoint(state.clone()),
            vec![require_auth.clone()],
        )
        .register(
            Method::GET,
            "/auth/me",
            handlers::MeEndpoint(state),
            vec![require_auth],
        )
        .register(
            Method::GET,
            "/auth/session",
            handlers::SessionStatusEndpoint,
            vec![optional_auth],
        );
}
