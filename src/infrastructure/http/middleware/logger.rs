//! 请求日志中间件

use async_trait::async_trait;

use super::Middleware;
use crate::infrastructure::http::context::RequestContext;
use crate::infrastructure::http::error::ErrorSignal;

/// 记录每个进入的请求
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestLogger;

#[async_trait]
impl Middleware for RequestLogger {
    fn name(&self) -> &'static str {
        "request_logger"
    }

    async fn handle(&self, ctx: &mut RequestContext) -> Result<(), ErrorSignal> {
        tracing::info!(
            request_id = %ctx.request_id,
            method = %ctx.method,
            path = %ctx.pathname,
            client = %ctx.client_addr,
            user_agent = ctx.user_agent(),
            "Request received"
        );
        Ok(())
    }
}
