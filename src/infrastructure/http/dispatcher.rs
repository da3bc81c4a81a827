//! Dispatcher - 单个请求的处理流程
//!
//! 全局中间件 → 路由匹配 → 局部中间件 → 处理器，任一阶段失败都中止后续阶段，
//! 失败（包括处理器 panic）统一在这里转换为 problem+json 响应。

use std::any::Any;
use std::net::SocketAddr;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::Request;
use axum::response::{IntoResponse, Response};
use futures_util::FutureExt;

use super::context::RequestContext;
use super::error::ErrorSignal;
use super::response::ResponseWriter;
use super::router::{RouteMatch, Router};

/// 请求分发器，持有只读的路由表
pub struct Dispatcher {
    router: Router,
}

impl Dispatcher {
    pub fn new(router: Router) -> Self {
        Self { router }
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    /// 处理一个请求，总是返回完整的响应
    pub async fn dispatch(&self, request: Request<Body>, peer: Option<SocketAddr>) -> Response {
        let mut ctx = RequestContext::from_request(request, peer);
        let mut res = ResponseWriter::new();

        let outcome = AssertUnwindSafe(self.run(&mut ctx, &mut res))
            .catch_unwind()
            .await;

        let signal = match outcome {
            Ok(Ok(())) => {
                tracing::debug!(
                    request_id = %ctx.request_id,
                    status = res.pending_status().as_u16(),
                    "Request completed"
                );
                return res.into_response();
            }
            Ok(Err(signal)) => signal,
            Err(panic) => {
                ErrorSignal::internal(format!("handler panicked: {}", panic_message(&*panic)))
            }
        };

        log_failure(&ctx, &signal);
        signal.into_response()
    }

    async fn run(
        &self,
        ctx: &mut RequestContext,
        res: &mut ResponseWriter,
    ) -> Result<(), ErrorSignal> {
        for middleware in self.router.global_middleware() {
            middleware.handle(ctx).await?;
        }

        let RouteMatch { route, params } = self
            .router
            .find(&ctx.method, &ctx.pathname)
            .ok_or_else(|| ErrorSignal::not_found("not found"))?;
        ctx.params = params;

        for middleware in route.middleware() {
            middleware.handle(ctx).await?;
        }

        route.handler().handle(ctx, res).await
    }
}

fn log_failure(ctx: &RequestContext, signal: &ErrorSignal) {
    match signal {
        ErrorSignal::Status { status, title } => {
            tracing::warn!(
                request_id = %ctx.request_id,
                status = status.as_u16(),
                title = %title,
                method = %ctx.method,
                url = %ctx.raw_path,
                "Request rejected"
            );
        }
        ErrorSignal::Internal(detail) => {
            tracing::error!(
                request_id = %ctx.request_id,
                status = 500,
                error = %detail,
                method = %ctx.method,
                url = %ctx.raw_path,
                "Request failed"
            );
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> &str {
    if let Some(msg) = panic.downcast_ref::<&str>() {
        msg
    } else if let Some(msg) = panic.downcast_ref::<String>() {
        msg
    } else {
        "unknown panic"
    }
}

/// axum 兜底处理器：所有请求都交给 Dispatcher
pub async fn dispatch_request(
    State(dispatcher): State<Arc<Dispatcher>>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request<Body>,
) -> Response {
    dispatcher
        .dispatch(request, connect_info.map(|ConnectInfo(addr)| addr))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::http::middleware::{BodyJson, Middleware};
    use crate::infrastructure::http::router::Handler;
    use async_trait::async_trait;
    use axum::http::{header, Method, StatusCode};
    use serde_json::{json, Value};
    use std::sync::Mutex;

    type Log = Arc<Mutex<Vec<&'static str>>>;

    struct Record {
        name: &'static str,
        log: Log,
        fail: bool,
    }

    #[async_trait]
    impl Middleware for Record {
        fn name(&self) -> &'static str {
            self.name
        }

        async fn handle(&self, _ctx: &mut RequestContext) -> Result<(), ErrorSignal> {
            self.log.lock().unwrap().push(self.name);
            if self.fail {
                return Err(ErrorSignal::unauthorized("blocked"));
            }
            Ok(())
        }
    }

    struct RecordHandler(Log);

    #[async_trait]
    impl Handler for RecordHandler {
        async fn handle(
            &self,
            _ctx: &mut RequestContext,
            res: &mut ResponseWriter,
        ) -> Result<(), ErrorSignal> {
            self.0.lock().unwrap().push("handler");
            res.json(&json!({"ok": true}));
            Ok(())
        }
    }

    /// 回显 params 和 body，中途让出调度
    struct Echo;

    #[async_trait]
    impl Handler for Echo {
        async fn handle(
            &self,
            ctx: &mut RequestContext,
            res: &mut ResponseWriter,
        ) -> Result<(), ErrorSignal> {
            tokio::task::yield_now().await;
            res.json(&json!({"params": ctx.params, "body": ctx.body}));
            Ok(())
        }
    }

    struct Panics;

    #[async_trait]
    impl Handler for Panics {
        async fn handle(
            &self,
            _ctx: &mut RequestContext,
            _res: &mut ResponseWriter,
        ) -> Result<(), ErrorSignal> {
            panic!("boom");
        }
    }

    struct FailsInternally;

    #[async_trait]
    impl Handler for FailsInternally {
        async fn handle(
            &self,
            _ctx: &mut RequestContext,
            _res: &mut ResponseWriter,
        ) -> Result<(), ErrorSignal> {
            Err(ErrorSignal::internal("secret connection string"))
        }
    }

    struct Silent;

    #[async_trait]
    impl Handler for Silent {
        async fn handle(
            &self,
            _ctx: &mut RequestContext,
            res: &mut ResponseWriter,
        ) -> Result<(), ErrorSignal> {
            res.status(StatusCode::NO_CONTENT);
            Ok(())
        }
    }

    fn record(name: &'static str, log: &Log, fail: bool) -> Record {
        Record {
            name,
            log: log.clone(),
            fail,
        }
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder()
            .method(Method::GET)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn body_json(response: Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_unmatched_route_is_404_problem() {
        let dispatcher = Dispatcher::new(Router::new());
        let response = dispatcher.dispatch(get("/lms/unknown"), None).await;

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
    async fn test_stage_order() {
        let log: Log = Arc::default();
        let mut router = Router::new();
        router
            .use_global(record("global-1", &log, false))
            .use_global(record("global-2", &log, false))
            .register(
                Method::GET,
                "/a",
                RecordHandler(log.clone()),
                vec![
                    Arc::new(record("local-1", &log, false)),
                    Arc::new(record("local-2", &log, false)),
                ],
            );

        let response = Dispatcher::new(router).dispatch(get("/a"), None).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            *log.lock().unwrap(),
            vec!["global-1", "global-2", "local-1", "local-2", "handler"]
        );
    }

    #[tokio::test]
    async fn test_failing_middleware_aborts_later_stages() {
        let log: Log = Arc::default();
        let mut router = Router::new();
        router
            .use_global(record("global-1", &log, true))
            .use_global(record("global-2", &log, false))
            .get("/a", RecordHandler(log.clone()));

        let response = Dispatcher::new(router).dispatch(get("/a"), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            body_json(response).await,
            json!({"status": 401, "title": "blocked"})
        );
        assert_eq!(*log.lock().unwrap(), vec!["global-1"]);
    }

    #[tokio::test]
    async fn test_global_middleware_runs_before_404() {
        let log: Log = Arc::default();
        let mut router = Router::new();
        router.use_global(record("global", &log, false));

        let response = Dispatcher::new(router).dispatch(get("/missing"), None).await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(*log.lock().unwrap(), vec!["global"]);
    }

    #[tokio::test]
    async fn test_local_middleware_only_for_its_route() {
        let log: Log = Arc::default();
        let mut router = Router::new();
        router
            .register(
                Method::GET,
                "/guarded",
                RecordHandler(log.clone()),
                vec![Arc::new(record("guard", &log, true))],
            )
            .get("/open", RecordHandler(log.clone()));
        let dispatcher = Dispatcher::new(router);

        let open = dispatcher.dispatch(get("/open"), None).await;
        assert_eq!(open.status(), StatusCode::OK);
        assert_eq!(*log.lock().unwrap(), vec!["handler"]);

        let guarded = dispatcher.dispatch(get("/guarded"), None).await;
        assert_eq!(guarded.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(*log.lock().unwrap(), vec!["handler", "guard"]);
    }

    #[tokio::test]
    async fn test_panic_becomes_500() {
        let mut router = Router::new();
        router.get("/panic", Panics);

        let response = Dispatcher::new(router).dispatch(get("/panic"), None).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"status": 500, "title": "error"})
        );
    }

    #[tokio::test]
    async fn test_internal_error_detail_not_leaked() {
        let mut router = Router::new();
        router.get("/fail", FailsInternally);

        let response = Dispatcher::new(router).dispatch(get("/fail"), None).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({"status": 500, "title": "error"})
        );
    }

    #[tokio::test]
    async fn test_handler_without_output_gets_empty_response() {
        let mut router = Router::new();
        router.get("/silent", Silent);

        let response = Dispatcher::new(router).dispatch(get("/silent"), None).await;
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(bytes.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_requests_are_isolated() {
        let mut router = Router::new();
        router
            .use_global(BodyJson::default())
            .register(Method::POST, "/items/:id", Echo, Vec::new());
        let dispatcher = Arc::new(Dispatcher::new(router));

        let post = |id: &str, body: Value| {
            let raw = body.to_string();
            Request::builder()
                .method(Method::POST)
                .uri(format!("/items/{}", id))
                .header(header::CONTENT_TYPE, "application/json")
                .header(header::CONTENT_LENGTH, raw.len())
                .body(Body::from(raw))
                .unwrap()
        };

        let (a, b) = tokio::join!(
            dispatcher.dispatch(post("a", json!({"n": 1})), None),
            dispatcher.dispatch(post("b", json!({"n": 2})), None),
        );

        assert_eq!(
            body_json(a).await,
            json!({"params": {"id": "a"}, "body": {"n": 1}})
        );
        assert_eq!(
            body_json(b).await,
            json!({"params": {"id": "b"}, "body": {"n": 2}})
        );
    }
}
