//! Password Hasher Port - 凭据派生与校验
//!
//! 具体实现见 infrastructure/adapters/password

use async_trait::async_trait;
use thiserror::Error;

/// 凭据错误
#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("Password pepper is not configured")]
    MissingPepper,

    #[error("Invalid cost parameters: {0}")]
    InvalidParams(String),

    #[error("Random source failure: {0}")]
    Random(String),

    #[error("Key derivation failed: {0}")]
    Derivation(String),
}

/// Password Hasher Port
///
/// `verify` 从不返回错误：记录损坏、参数非法、派生失败都视为不匹配。
#[async_trait]
pub trait PasswordHasherPort: Send + Sync {
    /// 生成自描述的密码哈希字符串
    async fn hash(&self, password: &str) -> Result<String, CredentialError>;

    /// 校验密码与已保存的哈希是否匹配
    async fn verify(&self, password: &str, stored: &str) -> bool;

    /// 已保存的哈希是否与当前默认参数不一致，需要在下次登录时重新哈希
    fn needs_rehash(&self, stored: &str) -> bool;
}
