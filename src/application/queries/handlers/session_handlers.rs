//! Session Query Handlers

use std::sync::Arc;

use chrono::Utc;

use crate::application::error::ApplicationError;
use crate::application::ports::{SessionRecord, SessionRepositoryPort};
use crate::application::queries::AuthenticateSessionQuery;

/// Authenticate Session Handler
///
/// 过期会话在读取时惰性删除，返回 `None`。
pub struct AuthenticateSessionHandler {
    session_repo: Arc<dyn SessionRepositoryPort>,
}

impl AuthenticateSessionHandler {
    pub fn new(session_repo: Arc<dyn SessionRepositoryPort>) -> Self {
        Self { session_repo }
    }

    pub async fn handle(
        &self,
        query: AuthenticateSessionQuery,
    ) -> Result<Option<SessionRecord>, ApplicationError> {
        let id_hash = query.token.id_hash();
        let Some(session) = self.session_repo.find_by_id_hash(id_hash.as_str()).await? else {
            return Ok(None);
        };

        if session.is_expired_at(Utc::now().timestamp_millis()) {
            tracing::debug!(user_id = session.user_id, "Session expired, removing");
            self.session_repo.delete_by_id_hash(id_hash.as_str()).await?;
            return Ok(None);
        }

        Ok(Some(session))
    }
}
