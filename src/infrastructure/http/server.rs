//! HTTP Server
//!
//! axum 只负责传输：所有请求经兜底处理器交给 Dispatcher。

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::dispatcher::{dispatch_request, Dispatcher};
use super::router::Router;

/// 服务器配置
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// HTTP 服务器
pub struct HttpServer {
    config: ServerConfig,
    dispatcher: Arc<Dispatcher>,
}

impl HttpServer {
    /// 创建新的 HTTP 服务器
    pub fn new(config: ServerConfig, router: Router) -> Self {
        Self {
            config,
            dispatcher: Arc::new(Dispatcher::new(router)),
        }
    }

    /// 构建 axum 应用
    pub fn build_app(&self) -> axum::Router {
        axum::Router::new()
            .fallback(dispatch_request)
            .with_state(self.dispatcher.clone())
            .layer(TraceLayer::new_for_http())
    }

    /// 启动服务器
    pub async fn run(self) -> Result<(), std::io::Error> {
        let app = self.build_app();
        let addr = self.config.addr();

        info!("Starting HTTP server on {}", addr);

        let listener = TcpListener::bind(&addr).await?;
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await?;

        Ok(())
    }

    /// 启动服务器（带优雅关闭）
    pub async fn run_with_shutdown<F>(self, shutdown_signal: F) -> Result<(), std::io::Error>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let app = self.build_app();
        let addr = self.config.addr();

        info!("Starting HTTP server on {} (with graceful shutdown)", addr);

        let listener = TcpListener::bind(&addr).await?;
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(shutdown_signal)
        .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::credential::ScryptParams;
    use crate::infrastructure::adapters::{ScryptHasherConfig, ScryptPasswordHasher};
    use crate::infrastructure::http::middleware::BodyJson;
    use crate::infrastructure::http::routes::create_routes;
    use crate::infrastructure::http::state::{AppState, SessionSettings};
    use crate::infrastructure::persistence::sqlite::{
        create_pool, run_migrations, DatabaseConfig, SqliteSessionRepository,
        SqliteUserRepository,
    };
    use axum::body::Body;
    use axum::http::{header, Method, Request, StatusCode};
    use axum::response::Response;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn app() -> axum::Router {
        let pool = create_pool(&DatabaseConfig::in_memory()).await.unwrap();
        run_migrations(&pool).await.unwrap();

        let hasher = ScryptPasswordHasher::new(ScryptHasherConfig {
            pepper: "test-pepper".to_string(),
            params: ScryptParams::from_log_n(4, 8, 1).unwrap(),
        })
        .unwrap();
        let state = Arc::new(AppState::new(
            Arc::new(SqliteUserRepository::new(pool.clone())),
            Arc::new(SqliteSessionRepository::new(pool)),
            Arc::new(hasher),
            SessionSettings::default(),
        ));

        HttpServer::new(
            ServerConfig::default(),
            create_routes(state, BodyJson::default()),
        )
        .build_app()
    }

    fn json_request(method: Method, uri: &str, body: Value, cookie: Option<&str>) -> Request<Body> {
        let raw = body.to_string();
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, raw.len());
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::from(raw)).unwrap()
    }

    fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn registration() -> Value {
        json!({
            "email": "ada@example.com",
            "name": "Ada",
            "password": "Analytical1Engine"
        })
    }

    /// 注册并登录，返回 `sid=<token>`
    async fn login(app: &axum::Router) -> String {
        let response = app
            .clone()
            .oneshot(json_request(Method::POST, "/auth/register", registration(), None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);

        let response = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/auth/login",
                json!({"email": "ada@example.com", "password": "Analytical1Engine"}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("Max-Age=1296000"));
        set_cookie.split(';').next().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_ping() {
        let response = app().await.oneshot(get("/ping", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_unknown_route_is_problem_json() {
        let response = app().await.oneshot(get("/lms/unknown", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/problem+json"
        );
        assert_eq!(
            body_json(response).await,
            json!({"status": 404, "title": "not found"})
        );
    }

    #[tokio::test]
    async fn test_register_validation_and_conflict() {
        let app = app().await;

        let invalid = app
            .clone()
            .oneshot(json_request(
                Method::POST,
                "/auth/register",
                json!({"email": "not-an-email", "name": "Ada", "password": "Analytical1Engine"}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(invalid.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let created = app
            .clone()
            .oneshot(json_request(Method::POST, "/auth/register", registration(), None))
            .await
            .unwrap();
        assert_eq!(created.status(), StatusCode::CREATED);
        let body = body_json(created).await;
        assert!(body["id"].as_i64().unwrap() > 0);

        let duplicate = app
            .oneshot(json_request(Method::POST, "/auth/register", registration(), None))
            .await
            .unwrap();
        assert_eq!(duplicate.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_invalid_json_is_400() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/auth/register")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, "9")
            .body(Body::from("{not json"))
            .unwrap();
        let response = app().await.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({"status": 400, "title": "invalid json"})
        );
    }

    #[tokio::test]
    async fn test_json_without_content_length_is_413() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/auth/register")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from_stream(futures_util::stream::iter(vec![
                Ok::<_, std::io::Error>(axum::body::Bytes::from_static(b"{}")),
            ])))
            .unwrap();
        let response = app().await.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(
            body_json(response).await,
            json!({"status": 413, "title": "invalid content-length"})
        );
    }

    #[tokio::test]
    async fn test_oversized_body_is_413() {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/auth/register")
            .header(header::CONTENT_TYPE, "application/json")
            .header(header::CONTENT_LENGTH, "5000001")
            .body(Body::from("{}"))
            .unwrap();
        let response = app().await.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_wrong_password_is_401() {
        let app = app().await;
        app.clone()
            .oneshot(json_request(Method::POST, "/auth/register", registration(), None))
            .await
            .unwrap();

        let response = app
            .oneshot(json_request(
                Method::POST,
                "/auth/login",
                json!({"email": "ada@example.com", "password": "Wrong1Password"}),
                None,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            json!({"status": 401, "title": "invalid credentials"})
        );
    }

    #[tokio::test]
    async fn test_session_lifecycle() {
        let app = app().await;
        let cookie = login(&app).await;

        let me = app.clone().oneshot(get("/auth/me", Some(cookie.as_str()))).await.unwrap();
        assert_eq!(me.status(), StatusCode::OK);
        let me = body_json(me).await;
        assert_eq!(me["email"], "ada@example.com");
        assert_eq!(me["name"], "Ada");

        let status = app
            .clone()
            .oneshot(get("/auth/session", Some(cookie.as_str())))
            .await
            .unwrap();
        assert_eq!(body_json(status).await["authenticated"], true);

        let logout = app
            .clone()
            .oneshot(json_request(Method::POST, "/auth/logout", json!({}), Some(cookie.as_str())))
            .await
            .unwrap();
        assert_eq!(logout.status(), StatusCode::OK);
        assert!(logout.headers()[header::SET_COOKIE]
            .to_str()
            .unwrap()
            .contains("Max-Age=0"));

        let me = app.clone().oneshot(get("/auth/me", Some(cookie.as_str()))).await.unwrap();
        assert_eq!(me.status(), StatusCode::UNAUTHORIZED);

        let status = app.oneshot(get("/auth/session", Some(cookie.as_str()))).await.unwrap();
        assert_eq!(
            body_json(status).await,
            json!({"authenticated": false})
        );
    }

    #[tokio::test]
    async fn test_me_requires_session() {
        let response = app().await.oneshot(get("/auth/me", None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            json!({"status": 401, "title": "not authenticated"})
        );
    }
}
