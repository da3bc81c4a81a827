//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（config.toml）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::AppConfig;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 配置文件搜索路径
const CONFIG_FILE_NAMES: &[&str] = &["config", "config.local"];

/// 加载应用配置
///
/// # 环境变量示例
/// - `LMS_SERVER__PORT=8080`
/// - `LMS_DATABASE__PATH=/data/lms.db`
/// - `LMS_AUTH__PEPPER=...`
/// - `LMS_HTTP__BODY_READ_TIMEOUT_SECS=10`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径，如果为 None 则使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值（最低优先级）
    builder = builder
        .set_default("server.host", "0.0.0.0")?
        .set_default("server.port", 3000)?
        .set_default("database.path", "data/lms.db")?
        .set_default("database.max_connections", 5)?
        .set_default("auth.pepper", "")?
        .set_default("auth.scrypt_log_n", 14)?
        .set_default("auth.scrypt_r", 8)?
        .set_default("auth.scrypt_p", 1)?
        .set_default("auth.session_ttl_days", 15)?
        .set_default("auth.cookie_secure", false)?
        .set_default("http.body_read_timeout_secs", 30)?
        .set_default("log.level", "info")?
        .set_default("log.json", false)?;

    // 2. 配置文件（如果存在）
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
    }

    // 3. 环境变量（最高优先级），前缀 LMS_，层级分隔符 __
    builder = builder.add_source(
        Environment::with_prefix("LMS")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "Server port cannot be 0".to_string(),
        ));
    }

    if config.database.path.is_empty() {
        return Err(ConfigError::ValidationError(
            "Database path cannot be empty".to_string(),
        ));
    }

    if config.auth.pepper.is_empty() {
        return Err(ConfigError::ValidationError(
            "Auth pepper must be set (LMS_AUTH__PEPPER)".to_string(),
        ));
    }

    config
        .auth
        .scrypt_params()
        .map_err(|e| ConfigError::ValidationError(format!("Invalid scrypt parameters: {}", e)))?;

    if config.auth.session_ttl_days <= 0 {
        return Err(ConfigError::ValidationError(
            "Session TTL must be positive".to_string(),
        ));
    }

    if config.http.body_read_timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "Body read timeout cannot be 0".to_string(),
        ));
    }

    Ok(())
}

/// 打印配置信息（用于启动时日志）
pub fn print_config(config: &AppConfig) {
    tracing::info!("=== Application Configuration ===");
    tracing::info!("Server: {}:{}", config.server.host, config.server.port);
    tracing::info!("Database: {}", config.database.path);
    tracing::info!("Database Max Connections: {}", config.database.max_connections);
    tracing::info!("Auth Pepper: <redacted, {} bytes>", config.auth.pepper.len());
    tracing::info!(
        "Scrypt: N=2^{}, r={}, p={}",
        config.auth.scrypt_log_n,
        config.auth.scrypt_r,
        config.auth.scrypt_p
    );
    tracing::info!("Session TTL: {} days", config.auth.session_ttl_days);
    tracing::info!("Cookie Secure: {}", config.auth.cookie_secure);
    tracing::info!("Body Read Timeout: {}s", config.http.body_read_timeout_secs);
    tracing::info!("Log Level: {}", config.log.level);
    tracing::info!("=================================");
}
