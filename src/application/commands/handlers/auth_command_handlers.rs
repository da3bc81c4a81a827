//! Auth Command Handlers - 注册与登录

use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::application::commands::auth_commands::*;
use crate::application::commands::session_commands::CreateSessionCommand;
use crate::application::error::ApplicationError;
use crate::application::ports::{NewUser, PasswordHasherPort, UserRepositoryPort};

use super::CreateSessionHandler;

/// 登录失败时统一的提示，不区分邮箱不存在和密码错误
pub const INVALID_CREDENTIALS: &str = "invalid credentials";

/// 邮箱不存在时用来做一次等价校验的占位密码
const PLACEHOLDER_PASSWORD: &str = "placeholder-password-never-matches";

/// Register User Handler - 创建账户
pub struct RegisterUserHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
    password_hasher: Arc<dyn PasswordHasherPort>,
}

impl RegisterUserHandler {
    pub fn new(
        user_repo: Arc<dyn UserRepositoryPort>,
        password_hasher: Arc<dyn PasswordHasherPort>,
    ) -> Self {
        Self {
            user_repo,
            password_hasher,
        }
    }

    pub async fn handle(
        &self,
        cmd: RegisterUserCommand,
    ) -> Result<RegisterUserResponse, ApplicationError> {
        if self.user_repo.find_by_email(&cmd.email).await?.is_some() {
            return Err(ApplicationError::conflict("email already registered"));
        }

        let password_hash = self.password_hasher.hash(&cmd.password).await?;

        // 并发注册同一邮箱时由唯一约束兜底，RepositoryError::Duplicate 映射为 Conflict
        let result = self
            .user_repo
            .create(&NewUser {
                email: cmd.email.clone(),
                name: cmd.name,
                password_hash,
            })
            .await?;

        if result.changes == 0 {
            return Err(ApplicationError::internal("user was not created"));
        }

        tracing::info!(user_id = result.last_insert_rowid, email = %cmd.email, "User registered");

        Ok(RegisterUserResponse {
            user_id: result.last_insert_rowid,
        })
    }
}

/// Login Handler - 校验凭据并签发会话
pub struct LoginHandler {
    user_repo: Arc<dyn UserRepositoryPort>,
    password_hasher: Arc<dyn PasswordHasherPort>,
    session_issuer: Arc<CreateSessionHandler>,
    /// 当前参数下的占位哈希，首次遇到未知邮箱时生成
    placeholder_hash: OnceCell<String>,
}

impl LoginHandler {
    pub fn new(
        user_repo: Arc<dyn UserRepositoryPort>,
        password_hasher: Arc<dyn PasswordHasherPort>,
        session_issuer: Arc<CreateSessionHandler>,
    ) -> Self {
        Self {
            user_repo,
            password_hasher,
            session_issuer,
            placeholder_hash: OnceCell::new(),
        }
    }

    pub async fn handle(&self, cmd: LoginCommand) -> Result<LoginResponse, ApplicationError> {
        let Some(user) = self.user_repo.find_by_email(&cmd.email).await? else {
            tracing::debug!(email = %cmd.email, "Login for unknown email");
            // 与真实账户走同样的派生开销，响应耗时不暴露邮箱是否注册
            self.verify_placeholder(&cmd.password).await;
            return Err(ApplicationError::unauthorized(INVALID_CREDENTIALS));
        };

        if !self
            .password_hasher
            .verify(&cmd.password, &user.password_hash)
            .await
        {
            tracing::warn!(user_id = user.id, ip = %cmd.ip, "Login with wrong password");
            return Err(ApplicationError::unauthorized(INVALID_CREDENTIALS));
        }

        if self.password_hasher.needs_rehash(&user.password_hash) {
            self.rehash(user.id, &cmd.password).await;
        }

        let session = self
            .session_issuer
            .handle(CreateSessionCommand {
                user_id: user.id,
                ip: cmd.ip,
                user_agent: cmd.user_agent,
            })
            .await?;

        Ok(LoginResponse {
            user_id: user.id,
            token: session.token,
            expires_at_ms: session.expires_at_ms,
        })
    }

    async fn verify_placeholder(&self, password: &str) {
        let placeholder = self
            .placeholder_hash
            .get_or_try_init(|| self.password_hasher.hash(PLACEHOLDER_PASSWORD))
            .await;

        match placeholder {
            Ok(hash) => {
                self.password_hasher.verify(password, hash).await;
            }
            Err(e) => tracing::warn!(error = %e, "Placeholder hash unavailable"),
        }
    }

    /// 用当前默认参数重新哈希；失败不影响本次登录
    async fn rehash(&self, user_id: i64, password: &str) {
        let hash = match self.password_hasher.hash(password).await {
            Ok(hash) => hash,
            Err(e) => {
                tracing::warn!(user_id = user_id, error = %e, "Password rehash failed");
                return;
            }
        };

        match self.user_repo.update_password_hash(user_id, &hash).await {
            Ok(_) => tracing::info!(user_id = user_id, "Password hash upgraded"),
            Err(e) => tracing::warn!(user_id = user_id, error = %e, "Password rehash not stored"),
        }
    }
}
