//! HTTP Middleware
//!
//! 中间件只接收请求上下文：正常返回即继续，返回 `Err(ErrorSignal)` 即中止请求。

mod auth;
mod body_json;
mod logger;

use async_trait::async_trait;

use super::context::RequestContext;
use super::error::ErrorSignal;

pub use auth::{SessionAuth, SESSION_COOKIE};
pub use body_json::{BodyJson, DEFAULT_READ_TIMEOUT, MAX_BODY_BYTES};
pub use logger::RequestLogger;

/// 请求中间件
#[async_trait]
pub trait Middleware: Send + Sync {
    /// 日志中使用的名称
    fn name(&self) -> &'static str;

    async fn handle(&self, ctx: &mut RequestContext) -> Result<(), ErrorSignal>;
}
