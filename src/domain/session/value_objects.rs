//! Session Context - Value Objects

use std::fmt;

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::{Digest, Sha256};

/// 会话默认有效期（天）
pub const DEFAULT_SESSION_TTL_DAYS: i64 = 15;

/// 令牌随机字节数
pub const TOKEN_BYTES: usize = 32;

/// base64url（无填充）编码后的令牌长度
const TOKEN_ENCODED_LEN: usize = 43;

/// 会话令牌 - 只下发给客户端，永不落库
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// 从操作系统随机源生成新令牌
    pub fn generate() -> Result<Self, rand::Error> {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.try_fill_bytes(&mut bytes)?;
        Ok(Self(URL_SAFE_NO_PAD.encode(bytes)))
    }

    /// 解析客户端提交的令牌（例如 cookie 值），格式不符时返回 None
    pub fn parse(value: &str) -> Option<Self> {
        let well_formed = value.len() == TOKEN_ENCODED_LEN
            && value
                .bytes()
                .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_');
        well_formed.then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 服务端保存的摘要
    pub fn id_hash(&self) -> SessionIdHash {
        SessionIdHash(hex::encode(Sha256::digest(self.0.as_bytes())))
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(..)")
    }
}

/// 会话标识摘要（SHA-256 hex）
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionIdHash(String);

impl SessionIdHash {
    pub fn from_string(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SessionIdHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_are_unique_and_parseable() {
        let a = SessionToken::generate().unwrap();
        let b = SessionToken::generate().unwrap();
        assert_ne!(a, b);
        assert_eq!(a.as_str().len(), TOKEN_ENCODED_LEN);
        assert_eq!(SessionToken::parse(a.as_str()), Some(a));
    }

    #[test]
    fn test_parse_rejects_foreign_values() {
        assert!(SessionToken::parse("").is_none());
        assert!(SessionToken::parse("1").is_none());
        assert!(SessionToken::parse(&"a".repeat(42)).is_none());
        assert!(SessionToken::parse(&format!("{}=", "a".repeat(42))).is_none());
        assert!(SessionToken::parse(&"a".repeat(43)).is_some());
    }

    #[test]
    fn test_id_hash_is_sha256_hex_and_not_the_token() {
        let token = SessionToken::generate().unwrap();
        let hash = token.id_hash();
        assert_eq!(hash.as_str().len(), 64);
        assert_ne!(hash.as_str(), token.as_str());
        assert_eq!(hash, token.id_hash());
    }

    #[test]
    fn test_debug_redacts_token() {
        let token = SessionToken::generate().unwrap();
        assert!(!format!("{:?}", token).contains(token.as_str()));
    }
}
