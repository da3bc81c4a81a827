//! Session Context - 会话限界上下文
//!
//! 客户端持有随机令牌，服务端只保存令牌的 SHA-256 摘要。

mod value_objects;

pub use value_objects::{SessionIdHash, SessionToken, DEFAULT_SESSION_TTL_DAYS, TOKEN_BYTES};
