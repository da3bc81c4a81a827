//! SQLite Database - 数据库连接和迁移

use sqlx::{sqlite::SqlitePoolOptions, Pool, Sqlite};
use std::path::Path;

/// 数据库配置
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// 数据库 URL
    pub database_url: String,
    /// 最大连接数
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:./data/lms.db?mode=rwc".to_string(),
            max_connections: 5,
        }
    }
}

impl DatabaseConfig {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            database_url: format!("sqlite:{}?mode=rwc", path.as_ref().display()),
            max_connections: 5,
        }
    }

    pub fn in_memory() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            max_connections: 1,
        }
    }
}

/// 数据库连接池
pub type DbPool = Pool<Sqlite>;

/// 创建数据库连接池
pub async fn create_pool(config: &DatabaseConfig) -> Result<DbPool, sqlx::Error> {
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.database_url)
        .await?;

    // 启用 WAL 模式，允许并发读写
    sqlx::query("PRAGMA journal_mode=WAL")
        .execute(&pool)
        .await?;

    // 遇到锁时等待而不是立即失败
    sqlx::query("PRAGMA busy_timeout=5000")
        .execute(&pool)
        .await?;

    sqlx::query("PRAGMA synchronous=NORMAL")
        .execute(&pool)
        .await?;

    tracing::info!("SQLite pool created with WAL mode and busy_timeout=5000ms");

    Ok(pool)
}

/// 运行数据库迁移
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            email TEXT NOT NULL UNIQUE,
            name TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    // sid_hash 是令牌的 SHA-256 摘要，原始令牌不落库
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS sessions (
            sid_hash TEXT PRIMARY KEY,
            user_id INTEGER NOT NULL,
            expires_ms INTEGER NOT NULL,
            ip TEXT NOT NULL,
            ua TEXT NOT NULL,
            created_ms INTEGER NOT NULL,
            FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_sessions_user_id
        ON sessions(user_id)
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_sessions_expires_ms
        ON sessions(expires_ms)
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database migrations completed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_in_memory_db() {
        let config = DatabaseConfig::in_memory();
        let pool = create_pool(&config).await.unwrap();
        run_migrations(&pool).await.unwrap();
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();
        run_migrations(&pool).await.unwrap();
    }

    #[test]
    fn test_database_url_from_path() {
        let config = DatabaseConfig::new("data/test.db");
        assert_eq!(config.database_url, "sqlite:data/test.db?mode=rwc");
    }
}
