//! Repository Ports - 出站端口
//!
//! 定义数据持久化的抽象接口
//! 具体实现在 infrastructure 层（如 SQLite）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// 写操作结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteResult {
    /// 受影响的行数
    pub changes: u64,
    /// 最后插入行的 rowid
    pub last_insert_rowid: i64,
}

// ============================================================================
// User Repository
// ============================================================================

/// 用户实体（用于持久化）
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// 待插入的用户
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub password_hash: String,
}

/// User Repository Port
#[async_trait]
pub trait UserRepositoryPort: Send + Sync {
    /// 插入用户，邮箱重复时返回 `RepositoryError::Duplicate`
    async fn create(&self, user: &NewUser) -> Result<WriteResult, RepositoryError>;

    /// 根据 ID 查找用户
    async fn find_by_id(&self, id: i64) -> Result<Option<UserRecord>, RepositoryError>;

    /// 根据邮箱查找用户
    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>, RepositoryError>;

    /// 替换密码哈希（成本参数升级后重新哈希）
    async fn update_password_hash(
        &self,
        id: i64,
        password_hash: &str,
    ) -> Result<WriteResult, RepositoryError>;
}

// ============================================================================
// Session Repository
// ============================================================================

/// 会话实体（用于持久化）
///
/// `id_hash` 是客户端令牌的摘要，原始令牌从不落库。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionRecord {
    pub id_hash: String,
    pub user_id: i64,
    pub expires_at_ms: i64,
    pub ip: String,
    pub user_agent: String,
    pub created_at_ms: i64,
}

impl SessionRecord {
    /// 在给定时刻是否已过期
    pub fn is_expired_at(&self, now_ms: i64) -> bool {
        self.expires_at_ms <= now_ms
    }
}

/// Session Repository Port
#[async_trait]
pub trait SessionRepositoryPort: Send + Sync {
    /// 保存会话
    async fn save(&self, session: &SessionRecord) -> Result<WriteResult, RepositoryError>;

    /// 根据令牌摘要查找会话（不检查过期）
    async fn find_by_id_hash(&self, id_hash: &str) -> Result<Option<SessionRecord>, RepositoryError>;

    /// 删除会话
    async fn delete_by_id_hash(&self, id_hash: &str) -> Result<WriteResult, RepositoryError>;

    /// 删除某用户的全部会话
    async fn delete_by_user(&self, user_id: i64) -> Result<WriteResult, RepositoryError>;
}
