//! Credential Context - Errors

use thiserror::Error;

/// 密码哈希记录解析错误
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PasswordHashError {
    #[error("malformed password hash: {0}")]
    Malformed(&'static str),

    #[error("unknown hash scheme: {0}")]
    UnknownScheme(String),

    #[error("unsupported hash version: {0}")]
    UnsupportedVersion(u32),

    #[error("unknown normalization form: {0}")]
    UnknownNormalization(String),

    #[error("invalid cost parameters: {0}")]
    InvalidParams(String),
}
