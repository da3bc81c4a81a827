//! LMS Server
//!
//! 启动顺序：配置 → 日志 → 数据库 → 仓储与密码哈希 → 路由 → HTTP 服务器

use std::sync::Arc;

use lms_server::config::{load_config, print_config, LogConfig};
use lms_server::infrastructure::adapters::{ScryptHasherConfig, ScryptPasswordHasher};
use lms_server::infrastructure::http::middleware::BodyJson;
use lms_server::infrastructure::http::{
    create_routes, AppState, HttpServer, ServerConfig, SessionSettings,
};
use lms_server::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteSessionRepository, SqliteUserRepository,
};

fn init_tracing(log: &LogConfig) {
    let log_filter = format!("{},lms_server={},tower_http=debug", log.level, log.level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if log.json {
        tracing_subscriber::fmt().json().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config.log);

    tracing::info!("LMS Server v{}", env!("CARGO_PKG_VERSION"));
    print_config(&config);

    // 确保数据目录存在
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // 初始化数据库
    let db_config = DatabaseConfig {
        database_url: config.database.database_url(),
        max_connections: config.database.max_connections,
    };
    let pool = create_pool(&db_config).await?;
    run_migrations(&pool).await?;

    // 创建 Repository 适配器
    let user_repo = Arc::new(SqliteUserRepository::new(pool.clone()));
    let session_repo = Arc::new(SqliteSessionRepository::new(pool));

    // 创建密码哈希器
    let password_hasher = Arc::new(ScryptPasswordHasher::new(ScryptHasherConfig {
        pepper: config.auth.pepper.clone(),
        params: config.auth.scrypt_params()?,
    })?);

    let state = Arc::new(AppState::new(
        user_repo,
        session_repo,
        password_hasher,
        SessionSettings {
            ttl: config.auth.session_ttl(),
            cookie_secure: config.auth.cookie_secure,
        },
    ));

    let body_json = BodyJson::new(config.http.body_read_timeout());
    let router = create_routes(state, body_json);

    let server_config = ServerConfig::new(&config.server.host, config.server.port);
    let server = HttpServer::new(server_config, router);

    // 启动服务器（带优雅关闭）
    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
                std::future::pending::<()>().await;
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}
