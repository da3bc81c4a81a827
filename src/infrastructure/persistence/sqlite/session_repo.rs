//! SQLite Session Repository

use async_trait::async_trait;
use sqlx::FromRow;

use super::user_repo::map_write_error;
use super::DbPool;
use crate::application::ports::{
    RepositoryError, SessionRecord, SessionRepositoryPort, WriteResult,
};

/// SQLite Session Repository
pub struct SqliteSessionRepository {
    pool: DbPool,
}

impl SqliteSessionRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct SessionRow {
    sid_hash: String,
    user_id: i64,
    expires_ms: i64,
    ip: String,
    ua: String,
    created_ms: i64,
}

impl From<SessionRow> for SessionRecord {
    fn from(row: SessionRow) -> Self {
        SessionRecord {
            id_hash: row.sid_hash,
            user_id: row.user_id,
            expires_at_ms: row.expires_ms,
            ip: row.ip,
            user_agent: row.ua,
            created_at_ms: row.created_ms,
        }
    }
}

#[async_trait]
impl SessionRepositoryPort for SqliteSessionRepository {
    async fn save(&self, session: &SessionRecord) -> Result<WriteResult, RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO sessions (sid_hash, user_id, expires_ms, ip, ua, created_ms)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&session.id_hash)
        .bind(session.user_id)
        .bind(session.expires_at_ms)
        .bind(&session.ip)
        .bind(&session.user_agent)
        .bind(session.created_at_ms)
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, "session"))?;

        Ok(WriteResult {
            changes: result.rows_affected(),
            last_insert_rowid: result.last_insert_rowid(),
        })
    }

    async fn find_by_id_hash(&self, id_hash: &str) -> Result<Option<SessionRecord>, RepositoryError> {
        let row: Option<SessionRow> = sqlx::query_as(
            "SELECT sid_hash, user_id, expires_ms, ip, ua, created_ms FROM sessions WHERE sid_hash = ?",
        )
        .bind(id_hash)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(row.map(SessionRecord::from))
    }

    async fn delete_by_id_hash(&self, id_hash: &str) -> Result<WriteResult, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE sid_hash = ?")
            .bind(id_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(WriteResult {
            changes: result.rows_affected(),
            last_insert_rowid: result.last_insert_rowid(),
        })
    }

    async fn delete_by_user(&self, user_id: i64) -> Result<WriteResult, RepositoryError> {
        let result = sqlx::query("DELETE FROM sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(WriteResult {
            changes: result.rows_affected(),
            last_insert_rowid: result.last_insert_rowid(),
        })
    }
}
