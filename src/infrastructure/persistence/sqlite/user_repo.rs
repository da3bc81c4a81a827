//! SQLite User Repository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

use super::DbPool;
use crate::application::ports::{
    NewUser, RepositoryError, UserRecord, UserRepositoryPort, WriteResult,
};

/// SQLite User Repository
pub struct SqliteUserRepository {
    pool: DbPool,
}

impl SqliteUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct UserRow {
    id: i64,
    email: String,
    name: String,
    password_hash: String,
    created_at: String,
}

impl TryFrom<UserRow> for UserRecord {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        Ok(UserRecord {
            id: row.id,
            email: row.email,
            name: row.name,
            password_hash: row.password_hash,
            created_at: DateTime::parse_from_rfc3339(&row.created_at)
                .map_err(|e| RepositoryError::SerializationError(e.to_string()))?
                .with_timezone(&Utc),
        })
    }
}

/// 唯一约束冲突映射为 Duplicate，其余为 DatabaseError
pub(crate) fn map_write_error(e: sqlx::Error, what: &str) -> RepositoryError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            RepositoryError::Duplicate(what.to_string())
        }
        _ => RepositoryError::DatabaseError(e.to_string()),
    }
}

#[async_trait]
impl UserRepositoryPort for SqliteUserRepository {
    async fn create(&self, user: &NewUser) -> Result<WriteResult, RepositoryError> {
        let result = sqlx::query(
            r#"
            INSERT INTO users (email, name, password_hash, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &format!("user with email {}", user.email)))?;

        Ok(WriteResult {
            changes: result.rows_affected(),
            last_insert_rowid: result.last_insert_rowid(),
        })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, name, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(UserRecord::try_from).transpose()
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError> {
        let row: Option<UserRow> = sqlx::query_as(
            "SELECT id, email, name, password_hash, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        row.map(UserRecord::try_from).transpose()
    }

    async fn update_password_hash(
        &self,
        id: i64,
        password_hash: &str,
    ) -> Result<WriteResult, RepositoryError> {
        let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
            .bind(password_hash)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| RepositoryError::DatabaseError(e.to_string()))?;

        Ok(WriteResult {
            changes: result.rows_affected(),
            last_insert_rowid: result.last_insert_rowid(),
        })
    }
}
