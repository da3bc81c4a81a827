//! 应用层 - 用例编排
//!
//! 包含：
//! - ports: 六边形架构端口定义（UserRepository、SessionRepository、PasswordHasher）
//! - commands: CQRS 命令及处理器
//! - queries: CQRS 查询及处理器
//! - error: 应用层错误定义

pub mod commands;
pub mod error;
pub mod ports;
pub mod queries;

// Re-exports
pub use commands::{
    // Auth commands
    LoginCommand,
    LoginResponse,
    RegisterUserCommand,
    RegisterUserResponse,
    // Session commands
    CreateSessionCommand,
    CreateSessionResponse,
    RevokeSessionCommand,
    RevokeSessionResponse,
    // Handlers
    handlers::{CreateSessionHandler, LoginHandler, RegisterUserHandler, RevokeSessionHandler},
};

pub use error::ApplicationError;

pub use ports::{
    // Password hasher
    CredentialError,
    PasswordHasherPort,
    // Repositories
    NewUser,
    RepositoryError,
    SessionRecord,
    SessionRepositoryPort,
    UserRecord,
    UserRepositoryPort,
    WriteResult,
};

pub use queries::{
    AuthenticateSessionQuery,
    GetUserQuery,
    // Handlers
    handlers::{AuthenticateSessionHandler, GetUserHandler},
};
