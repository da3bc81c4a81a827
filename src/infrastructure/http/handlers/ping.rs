//! Ping Handler

use async_trait::async_trait;
use serde::Serialize;

use crate::infrastructure::http::context::RequestContext;
use crate::infrastructure::http::error::ErrorSignal;
use crate::infrastructure::http::response::ResponseWriter;
use crate::infrastructure::http::router::Handler;

/// Ping 响应
#[derive(Serialize)]
pub struct PingResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Ping endpoint - 健康检查
pub struct Ping;

#[async_trait]
impl Handler for Ping {
    async fn handle(
        &self,
        _ctx: &mut RequestContext,
        res: &mut ResponseWriter,
    ) -> Result<(), ErrorSignal> {
        res.json(&PingResponse {
            status: "ok",
            version: env!("CARGO_PKG_VERSION"),
        });
        Ok(())
    }
}
