//! Scrypt Password Hasher
//!
//! 派生流程:
//! 1. 按规范化形式（新哈希使用 NFC）规范化密码
//! 2. 以服务端 pepper 为密钥计算 HMAC-SHA-256 预哈希，慢速 KDF 只接触定长的预哈希
//! 3. 16 字节随机盐 + scrypt 派生 32 字节密钥
//! 4. 序列化为 `scrypt$v=1$norm=NFC$N=..,r=..,p=..$<salt>$<dk>`
//!
//! 验证时使用记录中保存的规范化形式、成本参数和盐，而不是当前默认值。
//! 记录中的成本参数超出上限（见 `check_cost`）时不做派生，直接判定为不匹配。

use std::fmt;

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use rand::rngs::OsRng;
use rand::RngCore;
use sha2::Sha256;
use subtle::ConstantTimeEq;

use crate::application::ports::{CredentialError, PasswordHasherPort};
use crate::domain::credential::{NormalizationForm, PasswordHash, ScryptParams, CURRENT_VERSION};

type HmacSha256 = Hmac<Sha256>;

/// 盐长度（字节）
pub const SALT_LEN: usize = 16;

/// 派生密钥长度（字节）
pub const DERIVED_KEY_LEN: usize = 32;

/// 接受的最大 log2(N)
pub const MAX_VERIFY_LOG_N: u8 = 20;

/// 接受的最大块大小 r
pub const MAX_VERIFY_R: u32 = 32;

/// 接受的最大并行度 p
pub const MAX_VERIFY_P: u32 = 16;

/// 接受的最大总工作量 `128 * r * N * p`（1 GiB）
pub const MAX_VERIFY_COST_BYTES: u128 = 1 << 30;

/// 成本上限检查，在分配内存之前拒绝损坏或恶意的参数
pub fn check_cost(params: ScryptParams) -> Result<(), CredentialError> {
    if params.log_n() > MAX_VERIFY_LOG_N {
        return Err(CredentialError::InvalidParams(format!(
            "log2(N)={} exceeds limit {}",
            params.log_n(),
            MAX_VERIFY_LOG_N
        )));
    }
    if params.r() > MAX_VERIFY_R {
        return Err(CredentialError::InvalidParams(format!(
            "r={} exceeds limit {}",
            params.r(),
            MAX_VERIFY_R
        )));
    }
    if params.p() > MAX_VERIFY_P {
        return Err(CredentialError::InvalidParams(format!(
            "p={} exceeds limit {}",
            params.p(),
            MAX_VERIFY_P
        )));
    }
    if params.cost_bytes() > MAX_VERIFY_COST_BYTES {
        return Err(CredentialError::InvalidParams(format!(
            "cost {} bytes exceeds limit {}",
            params.cost_bytes(),
            MAX_VERIFY_COST_BYTES
        )));
    }
    Ok(())
}

/// Scrypt 哈希器配置
#[derive(Clone)]
pub struct ScryptHasherConfig {
    /// 服务端 pepper
    pub pepper: String,
    /// 新哈希使用的成本参数
    pub params: ScryptParams,
}

impl fmt::Debug for ScryptHasherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScryptHasherConfig")
            .field("pepper", &"<redacted>")
            .field("params", &self.params)
            .finish()
    }
}

/// Scrypt 密码哈希器
pub struct ScryptPasswordHasher {
    pepper: Vec<u8>,
    params: ScryptParams,
}

impl ScryptPasswordHasher {
    pub fn new(config: ScryptHasherConfig) -> Result<Self, CredentialError> {
        if config.pepper.is_empty() {
            return Err(CredentialError::MissingPepper);
        }
        check_cost(config.params)?;
        Ok(Self {
            pepper: config.pepper.into_bytes(),
            params: config.params,
        })
    }

    /// 新哈希使用的成本参数
    pub fn params(&self) -> ScryptParams {
        self.params
    }

    /// 计算密码哈希记录
    pub async fn hash_password(&self, password: &str) -> Result<PasswordHash, CredentialError> {
        let normalization = NormalizationForm::Nfc;
        let pre_hash = self.pre_hash(&normalization.apply(password))?;

        let mut salt = vec![0u8; SALT_LEN];
        OsRng
            .try_fill_bytes(&mut salt)
            .map_err(|e| CredentialError::Random(e.to_string()))?;

        let derived_key = derive_key(pre_hash, salt.clone(), self.params).await?;

        Ok(PasswordHash::new(normalization, self.params, salt, derived_key))
    }

    /// 校验密码与已解析的记录
    pub async fn verify_record(
        &self,
        password: &str,
        record: &PasswordHash,
    ) -> Result<bool, CredentialError> {
        let params = record.params();
        check_cost(params)?;

        let pre_hash = self.pre_hash(&record.normalization().apply(password))?;
        let derived_key = derive_key(pre_hash, record.salt().to_vec(), params).await?;

        // 长度不同无法泄露有用的时间信息，直接返回
        if derived_key.len() != record.derived_key().len() {
            return Ok(false);
        }

        Ok(derived_key.as_slice().ct_eq(record.derived_key()).into())
    }

    fn pre_hash(&self, normalized: &str) -> Result<[u8; 32], CredentialError> {
        let mut mac = HmacSha256::new_from_slice(&self.pepper)
            .map_err(|e| CredentialError::Derivation(e.to_string()))?;
        mac.update(normalized.as_bytes());

        let mut out = [0u8; 32];
        out.copy_from_slice(&mac.finalize().into_bytes());
        Ok(out)
    }
}

/// 在阻塞线程池中运行 scrypt，避免占用异步调度器
async fn derive_key(
    pre_hash: [u8; 32],
    salt: Vec<u8>,
    params: ScryptParams,
) -> Result<Vec<u8>, CredentialError> {
    tokio::task::spawn_blocking(move || {
        let scrypt_params =
            scrypt::Params::new(params.log_n(), params.r(), params.p(), DERIVED_KEY_LEN)
                .map_err(|e| CredentialError::InvalidParams(e.to_string()))?;

        let mut output = vec![0u8; DERIVED_KEY_LEN];
        scrypt::scrypt(&pre_hash, &salt, &scrypt_params, &mut output)
            .map_err(|e| CredentialError::Derivation(e.to_string()))?;
        Ok(output)
    })
    .await
    .map_err(|e| CredentialError::Derivation(e.to_string()))?
}

#[async_trait]
impl PasswordHasherPort for ScryptPasswordHasher {
    async fn hash(&self, password: &str) -> Result<String, CredentialError> {
        let record = self.hash_password(password).await?;
        Ok(record.to_string())
    }

    async fn verify(&self, password: &str, stored: &str) -> bool {
        let record: PasswordHash = match stored.parse() {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, "Stored password hash could not be parsed");
                return false;
            }
        };

        match self.verify_record(password, &record).await {
            Ok(matched) => matched,
            Err(e) => {
                tracing::error!(error = %e, "Password verification failed");
                false
            }
        }
    }

    fn needs_rehash(&self, stored: &str) -> bool {
        match stored.parse::<PasswordHash>() {
            Ok(record) => {
                record.version() != CURRENT_VERSION
                    || record.normalization() != NormalizationForm::Nfc
                    || record.params() != self.params
                    || record.salt().len() != SALT_LEN
                    || record.derived_key().len() != DERIVED_KEY_LEN
            }
            Err(_) => true,
        }
    }
}
