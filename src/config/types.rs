//! Configuration Types
//!
//! 定义所有配置结构体

use std::fmt;
use std::time::Duration;

use serde::Deserialize;

use crate::domain::credential::{PasswordHashError, ScryptParams};
use crate::domain::session::DEFAULT_SESSION_TTL_DAYS;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 认证配置
    #[serde(default)]
    pub auth: AuthConfig,

    /// 请求处理配置
    #[serde(default)]
    pub http: HttpConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取监听地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/lms.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// 获取数据库 URL
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

/// 认证配置
///
/// `pepper` 没有默认值，启动前必须通过配置文件或 `LMS_AUTH__PEPPER` 提供。
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub pepper: String,

    /// scrypt 成本参数 N = 2^scrypt_log_n
    #[serde(default = "default_scrypt_log_n")]
    pub scrypt_log_n: u8,

    #[serde(default = "default_scrypt_r")]
    pub scrypt_r: u32,

    #[serde(default = "default_scrypt_p")]
    pub scrypt_p: u32,

    /// 会话有效期（天）
    #[serde(default = "default_session_ttl_days")]
    pub session_ttl_days: i64,

    /// cookie 是否带 Secure 属性
    #[serde(default)]
    pub cookie_secure: bool,
}

fn default_scrypt_log_n() -> u8 {
    ScryptParams::DEFAULT_LOG_N
}

fn default_scrypt_r() -> u32 {
    ScryptParams::DEFAULT_R
}

fn default_scrypt_p() -> u32 {
    ScryptParams::DEFAULT_P
}

fn default_session_ttl_days() -> i64 {
    DEFAULT_SESSION_TTL_DAYS
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            pepper: String::new(),
            scrypt_log_n: default_scrypt_log_n(),
            scrypt_r: default_scrypt_r(),
            scrypt_p: default_scrypt_p(),
            session_ttl_days: default_session_ttl_days(),
            cookie_secure: false,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("pepper", &"<redacted>")
            .field("scrypt_log_n", &self.scrypt_log_n)
            .field("scrypt_r", &self.scrypt_r)
            .field("scrypt_p", &self.scrypt_p)
            .field("session_ttl_days", &self.session_ttl_days)
            .field("cookie_secure", &self.cookie_secure)
            .finish()
    }
}

impl AuthConfig {
    pub fn scrypt_params(&self) -> Result<ScryptParams, PasswordHashError> {
        ScryptParams::from_log_n(self.scrypt_log_n, self.scrypt_r, self.scrypt_p)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::days(self.session_ttl_days)
    }
}

/// 请求处理配置
#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    /// 读取请求体时两次收到数据的最长间隔（秒）
    #[serde(default = "default_body_read_timeout")]
    pub body_read_timeout_secs: u64,
}

fn default_body_read_timeout() -> u64 {
    30
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            body_read_timeout_secs: default_body_read_timeout(),
        }
    }
}

impl HttpConfig {
    pub fn body_read_timeout(&self) -> Duration {
        Duration::from_secs(self.body_read_timeout_secs)
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.http.body_read_timeout_secs, 30);
        assert_eq!(config.auth.session_ttl_days, 15);
        assert!(config.auth.pepper.is_empty());
    }

    #[test]
    fn test_server_addr() {
        let config = ServerConfig::default();
        assert_eq!(config.addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_database_url() {
        let config = DatabaseConfig::default();
        assert_eq!(config.database_url(), "sqlite:data/lms.db?mode=rwc");
    }

    #[test]
    fn test_auth_defaults_match_hasher_defaults() {
        let auth = AuthConfig::default();
        assert_eq!(auth.scrypt_params().unwrap(), ScryptParams::default());
        assert_eq!(auth.session_ttl().num_seconds(), 1_296_000);
    }

    #[test]
    fn test_auth_debug_redacts_pepper() {
        let auth = AuthConfig {
            pepper: "super-secret".to_string(),
            ..AuthConfig::default()
        };
        assert!(!format!("{:?}", auth).contains("super-secret"));
    }
}
