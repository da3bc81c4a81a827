//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 验证错误
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 资源冲突
    #[error("Conflict: {0}")]
    Conflict(String),

    /// 认证失败
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// 仓储错误
    #[error("Repository error: {0}")]
    RepositoryError(String),

    /// 凭据子系统错误
    #[error("Credential error: {0}")]
    CredentialError(String),

    /// 内部错误
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// 创建验证错误
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    /// 创建冲突错误
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    /// 创建认证失败错误
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Unauthorized(message.into())
    }

    /// 创建内部错误
    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(message.into())
    }
}

impl From<crate::application::ports::RepositoryError> for ApplicationError {
    fn from(err: crate::application::ports::RepositoryError) -> Self {
        match err {
            crate::application::ports::RepositoryError::Duplicate(msg) => Self::Conflict(msg),
            other => Self::RepositoryError(other.to_string()),
        }
    }
}

impl From<crate::application::ports::CredentialError> for ApplicationError {
    fn from(err: crate::application::ports::CredentialError) -> Self {
        Self::CredentialError(err.to_string())
    }
}
