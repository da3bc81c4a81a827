//! LMS Server - 认证服务与请求处理管线
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Credential Context: 版本化、自描述的密码哈希
//! - Session Context: 会话令牌
//!
//! 应用层 (application/):
//! - Ports: 端口定义（UserRepository, SessionRepository, PasswordHasher）
//! - Commands: 注册、登录、签发/注销会话
//! - Queries: 会话认证、用户查询
//!
//! 基础设施层 (infrastructure/):
//! - HTTP: 路由、中间件、Dispatcher、problem+json 错误信封
//! - Persistence: SQLite 存储
//! - Adapters: scrypt 密码哈希

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
