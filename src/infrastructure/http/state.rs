//! Application State
//!
//! 包含所有 Command/Query Handlers 的应用状态

use std::sync::Arc;

use chrono::Duration;

use crate::application::{
    // Command handlers
    CreateSessionHandler, LoginHandler, RegisterUserHandler, RevokeSessionHandler,
    // Query handlers
    AuthenticateSessionHandler, GetUserHandler,
    // Ports
    PasswordHasherPort, SessionRepositoryPort, UserRepositoryPort,
};
use crate::domain::session::DEFAULT_SESSION_TTL_DAYS;

/// 会话 cookie 设置
#[derive(Debug, Clone)]
pub struct SessionSettings {
    pub ttl: Duration,
    pub cookie_secure: bool,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            ttl: Duration::days(DEFAULT_SESSION_TTL_DAYS),
            cookie_secure: false,
        }
    }
}

/// 应用状态
pub struct AppState {
    pub session_settings: SessionSettings,

    // ========== Command Handlers ==========
    pub register_handler: RegisterUserHandler,
    pub login_handler: LoginHandler,
    pub revoke_session_handler: RevokeSessionHandler,

    // ========== Query Handlers ==========
    pub authenticate_session_handler: Arc<AuthenticateSessionHandler>,
    pub get_user_handler: GetUserHandler,
}

impl AppState {
    /// 创建应用状态
    pub fn new(
        user_repo: Arc<dyn UserRepositoryPort>,
        session_repo: Arc<dyn SessionRepositoryPort>,
        password_hasher: Arc<dyn PasswordHasherPort>,
        session_settings: SessionSettings,
    ) -> Self {
        let session_issuer = Arc::new(CreateSessionHandler::with_ttl(
            session_repo.clone(),
            session_settings.ttl,
        ));

        Self {
            register_handler: RegisterUserHandler::new(user_repo.clone(), password_hasher.clone()),
            login_handler: LoginHandler::new(user_repo.clone(), password_hasher, session_issuer),
            revoke_session_handler: RevokeSessionHandler::new(session_repo.clone()),
            authenticate_session_handler: Arc::new(AuthenticateSessionHandler::new(session_repo)),
            get_user_handler: GetUserHandler::new(user_repo),
            session_settings,
        }
    }

    /// cookie 的 Max-Age（秒）
    pub fn cookie_max_age(&self) -> i64 {
        self.session_settings.ttl.num_seconds()
    }
}
