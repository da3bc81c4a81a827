//! Credential Context - 凭据限界上下文
//!
//! 职责:
//! - 密码哈希记录的结构与线格式
//! - 规范化形式与 scrypt 成本参数
//!
//! 哈希本身的计算（HMAC 预哈希 + scrypt）在 infrastructure/adapters/password 中实现，
//! 这里只描述记录，保证 `parse` 与 `to_string` 精确往返。

mod errors;
mod value_objects;

pub use errors::PasswordHashError;
pub use value_objects::{NormalizationForm, PasswordHash, ScryptParams, CURRENT_VERSION, SCHEME_ID};
