//! Credential Context - Value Objects

use std::fmt;
use std::str::FromStr;

use unicode_normalization::UnicodeNormalization;

use super::PasswordHashError;

/// 哈希方案标识
pub const SCHEME_ID: &str = "scrypt";

/// 当前记录格式版本
pub const CURRENT_VERSION: u32 = 1;

/// Unicode 规范化形式
///
/// 记录中保存的是哈希时使用的形式，验证时按记录中的形式重新规范化。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizationForm {
    #[default]
    Nfc,
    Nfd,
    Nfkc,
    Nfkd,
}

impl NormalizationForm {
    pub fn as_str(&self) -> &'static str {
        match self {
            NormalizationForm::Nfc => "NFC",
            NormalizationForm::Nfd => "NFD",
            NormalizationForm::Nfkc => "NFKC",
            NormalizationForm::Nfkd => "NFKD",
        }
    }

    /// 按此形式规范化输入
    pub fn apply(&self, input: &str) -> String {
        match self {
            NormalizationForm::Nfc => input.nfc().collect(),
            NormalizationForm::Nfd => input.nfd().collect(),
            NormalizationForm::Nfkc => input.nfkc().collect(),
            NormalizationForm::Nfkd => input.nfkd().collect(),
        }
    }
}

impl FromStr for NormalizationForm {
    type Err = PasswordHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NFC" => Ok(NormalizationForm::Nfc),
            "NFD" => Ok(NormalizationForm::Nfd),
            "NFKC" => Ok(NormalizationForm::Nfkc),
            "NFKD" => Ok(NormalizationForm::Nfkd),
            _ => Err(PasswordHashError::UnknownNormalization(s.to_string())),
        }
    }
}

/// scrypt 成本参数
///
/// 不变量:
/// - N 是大于 1 的 2 的幂
/// - r、p 均大于 0
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScryptParams {
    n: u64,
    r: u32,
    p: u32,
}

impl ScryptParams {
    pub const DEFAULT_LOG_N: u8 = 14;
    pub const DEFAULT_R: u32 = 8;
    pub const DEFAULT_P: u32 = 1;

    pub fn new(n: u64, r: u32, p: u32) -> Result<Self, PasswordHashError> {
        if n < 2 || !n.is_power_of_two() {
            return Err(PasswordHashError::InvalidParams(format!(
                "N must be a power of two greater than 1, got {}",
                n
            )));
        }
        if r == 0 || p == 0 {
            return Err(PasswordHashError::InvalidParams(format!(
                "r and p must be positive, got r={} p={}",
                r, p
            )));
        }
        Ok(Self { n, r, p })
    }

    pub fn from_log_n(log_n: u8, r: u32, p: u32) -> Result<Self, PasswordHashError> {
        let n = 1u64
            .checked_shl(u32::from(log_n))
            .ok_or_else(|| PasswordHashError::InvalidParams(format!("log2(N) too large: {}", log_n)))?;
        Self::new(n, r, p)
    }

    pub fn n(&self) -> u64 {
        self.n
    }

    pub fn log_n(&self) -> u8 {
        self.n.trailing_zeros() as u8
    }

    pub fn r(&self) -> u32 {
        self.r
    }

    pub fn p(&self) -> u32 {
        self.p
    }

    /// 派生的总工作量估计（字节）：`128 * r * N * p`，溢出时取最大值
    pub fn cost_bytes(&self) -> u128 {
        128u128
            .saturating_mul(u128::from(self.r))
            .saturating_mul(u128::from(self.n))
            .saturating_mul(u128::from(self.p))
    }
}

impl Default for ScryptParams {
    fn default() -> Self {
        Self {
            n: 1 << Self::DEFAULT_LOG_N,
            r: Self::DEFAULT_R,
            p: Self::DEFAULT_P,
        }
    }
}

/// 密码哈希记录
///
/// 线格式: `scrypt$v=1$norm=NFC$N=16384,r=8,p=1$<salt hex>$<derived key hex>`
///
/// 成本参数与盐和派生密钥保存在一起，验证不依赖服务端当前的默认配置。
/// 解析是严格的：只接受 `to_string` 可能产生的文本，因此解析后再序列化得到原字符串。
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordHash {
    version: u32,
    normalization: NormalizationForm,
    params: ScryptParams,
    salt: Vec<u8>,
    derived_key: Vec<u8>,
}

impl PasswordHash {
    pub fn new(
        normalization: NormalizationForm,
        params: ScryptParams,
        salt: Vec<u8>,
        derived_key: Vec<u8>,
    ) -> Self {
        Self {
            version: CURRENT_VERSION,
            normalization,
            params,
            salt,
            derived_key,
        }
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn normalization(&self) -> NormalizationForm {
        self.normalization
    }

    pub fn params(&self) -> ScryptParams {
        self.params
    }

    pub fn salt(&self) -> &[u8] {
        &self.salt
    }

    pub fn derived_key(&self) -> &[u8] {
        &self.derived_key
    }
}

// 不在日志中泄露派生密钥
impl fmt::Debug for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHash")
            .field("version", &self.version)
            .field("normalization", &self.normalization)
            .field("params", &self.params)
            .field("salt_len", &self.salt.len())
            .field("derived_key_len", &self.derived_key.len())
            .finish()
    }
}

impl fmt::Display for PasswordHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}$v={}$norm={}$N={},r={},p={}${}${}",
            SCHEME_ID,
            self.version,
            self.normalization.as_str(),
            self.params.n,
            self.params.r,
            self.params.p,
            hex::encode(&self.salt),
            hex::encode(&self.derived_key),
        )
    }
}

impl FromStr for PasswordHash {
    type Err = PasswordHashError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split('$').collect();
        let [scheme, version, norm, cost, salt, derived_key] = fields.as_slice() else {
            return Err(PasswordHashError::Malformed("expected 6 '$'-separated fields"));
        };

        if *scheme != SCHEME_ID {
            return Err(PasswordHashError::UnknownScheme(scheme.to_string()));
        }

        let version: u32 = field_number(version, "v=")?;
        if version != CURRENT_VERSION {
            return Err(PasswordHashError::UnsupportedVersion(version));
        }

        let norm = norm
            .strip_prefix("norm=")
            .ok_or(PasswordHashError::Malformed("missing norm= field"))?;
        let normalization: NormalizationForm = norm.parse()?;

        let cost: Vec<&str> = cost.split(',').collect();
        let [n, r, p] = cost.as_slice() else {
            return Err(PasswordHashError::Malformed("expected N=,r=,p= cost parameters"));
        };
        let params = ScryptParams::new(
            field_number(n, "N=")?,
            field_number(r, "r=")?,
            field_number(p, "p=")?,
        )?;

        Ok(Self {
            version,
            normalization,
            params,
            salt: decode_lower_hex(salt)?,
            derived_key: decode_lower_hex(derived_key)?,
        })
    }
}

/// 解析 `<prefix><十进制数>`，拒绝前导零和符号等非规范写法
fn field_number<T>(field: &str, prefix: &'static str) -> Result<T, PasswordHashError>
where
    T: FromStr + ToString,
{
    let raw = field
        .strip_prefix(prefix)
        .ok_or(PasswordHashError::Malformed("missing field prefix"))?;
    let value: T = raw
        .parse()
        .map_err(|_| PasswordHashError::Malformed("field is not a number"))?;
    if value.to_string() != raw {
        return Err(PasswordHashError::Malformed("number is not in canonical form"));
    }
    Ok(value)
}

fn decode_lower_hex(field: &str) -> Result<Vec<u8>, PasswordHashError> {
    if field.is_empty() {
        return Err(PasswordHashError::Malformed("empty hex field"));
    }
    if field.bytes().any(|b| b.is_ascii_uppercase()) {
        return Err(PasswordHashError::Malformed("hex must be lowercase"));
    }
    hex::decode(field).map_err(|_| PasswordHashError::Malformed("invalid hex"))
}
