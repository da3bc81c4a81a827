//! Domain Layer - 领域层
//!
//! 包含两个限界上下文:
//! - Credential Context: 自描述的密码哈希记录
//! - Session Context: 会话令牌及其服务端摘要

pub mod credential;
pub mod session;
