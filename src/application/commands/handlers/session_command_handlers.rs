//! Session Command Handlers

use std::sync::Arc;

use chrono::{Duration, Utc};

use crate::application::commands::session_commands::*;
use crate::application::error::ApplicationError;
use crate::application::ports::{SessionRecord, SessionRepositoryPort};
use crate::domain::session::{SessionToken, DEFAULT_SESSION_TTL_DAYS};

/// Create Session Handler - 为已认证用户签发会话
pub struct CreateSessionHandler {
    session_repo: Arc<dyn SessionRepositoryPort>,
    ttl: Duration,
}

impl CreateSessionHandler {
    pub fn new(session_repo: Arc<dyn SessionRepositoryPort>) -> Self {
        Self::with_ttl(session_repo, Duration::days(DEFAULT_SESSION_TTL_DAYS))
    }

    pub fn with_ttl(session_repo: Arc<dyn SessionRepositoryPort>, ttl: Duration) -> Self {
        Self { session_repo, ttl }
    }

    /// 会话有效期
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn handle(
        &self,
        cmd: CreateSessionCommand,
    ) -> Result<CreateSessionResponse, ApplicationError> {
        let token = SessionToken::generate()
            .map_err(|e| ApplicationError::internal(format!("token generation failed: {}", e)))?;

        let now = Utc::now();
        let expires_at_ms = (now + self.ttl).timestamp_millis();
        let record = SessionRecord {
            id_hash: token.id_hash().into_string(),
            user_id: cmd.user_id,
            expires_at_ms,
            ip: cmd.ip,
            user_agent: cmd.user_agent,
            created_at_ms: now.timestamp_millis(),
        };

        let result = self.session_repo.save(&record).await?;
        if result.changes == 0 {
            return Err(ApplicationError::internal("session was not persisted"));
        }

        tracing::info!(
            user_id = cmd.user_id,
            ip = %record.ip,
            expires_at_ms = expires_at_ms,
            "Session created"
        );

        Ok(CreateSessionResponse {
            token,
            expires_at_ms,
        })
    }
}

/// Revoke Session Handler - 注销会话
pub struct RevokeSessionHandler {
    session_repo: Arc<dyn SessionRepositoryPort>,
}

impl RevokeSessionHandler {
    pub fn new(session_repo: Arc<dyn SessionRepositoryPort>) -> Self {
        Self { session_repo }
    }

    pub async fn handle(
        &self,
        cmd: RevokeSessionCommand,
    ) -> Result<RevokeSessionResponse, ApplicationError> {
        let result = self
            .session_repo
            .delete_by_id_hash(cmd.token.id_hash().as_str())
            .await?;

        tracing::info!(revoked = result.changes > 0, "Session revoked");

        Ok(RevokeSessionResponse {
            revoked: result.changes > 0,
        })
    }
}
