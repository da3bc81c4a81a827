//! JSON 请求体解析中间件

use std::time::Duration;

use async_trait::async_trait;
use axum::http::header;
use futures_util::StreamExt;
use serde_json::Value;

use super::Middleware;
use crate::infrastructure::http::context::RequestContext;
use crate::infrastructure::http::error::ErrorSignal;

/// 请求体上限（字节），固定值
pub const MAX_BODY_BYTES: usize = 5_000_000;

/// 两次读到数据之间允许的最长间隔
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// 把 `application/json` 请求体解析到 `ctx.body`
///
/// 其它内容类型直接放行，`ctx.body` 保持 `{}`。
#[derive(Debug, Clone)]
pub struct BodyJson {
    read_timeout: Duration,
}

impl Default for BodyJson {
    fn default() -> Self {
        Self::new(DEFAULT_READ_TIMEOUT)
    }
}

impl BodyJson {
    pub fn new(read_timeout: Duration) -> Self {
        Self { read_timeout }
    }

    pub fn read_timeout(&self) -> Duration {
        self.read_timeout
    }

    async fn read_limited(&self, ctx: &mut RequestContext) -> Result<Vec<u8>, ErrorSignal> {
        let Some(body) = ctx.take_body() else {
            return Ok(Vec::new());
        };

        let mut stream = body.into_data_stream();
        let mut buf = Vec::new();
        loop {
            let next = tokio::time::timeout(self.read_timeout, stream.next())
                .await
                .map_err(|_| ErrorSignal::request_timeout("request timeout"))?;

            match next {
                None => return Ok(buf),
                Some(Ok(chunk)) => {
                    if buf.len() + chunk.len() > MAX_BODY_BYTES {
                        return Err(ErrorSignal::payload_too_large("payload too large"));
                    }
                    buf.extend_from_slice(&chunk);
                }
                Some(Err(e)) => {
                    tracing::debug!(request_id = %ctx.request_id, error = %e, "Body read failed");
                    return Err(ErrorSignal::bad_request("request aborted"));
                }
            }
        }
    }
}

/// 仅接受 `application/json`，可带 `charset=utf-8`
pub fn is_json_content_type(value: &str) -> bool {
    let mut parts = value.split(';').map(str::trim);
    if !parts
        .next()
        .is_some_and(|mime| mime.eq_ignore_ascii_case("application/json"))
    {
        return false;
    }

    match (parts.next(), parts.next()) {
        (None, _) => true,
        (Some(param), None) => param
            .split_once('=')
            .is_some_and(|(k, v)| {
                k.trim().eq_ignore_ascii_case("charset")
                    && v.trim().trim_matches('"').eq_ignore_ascii_case("utf-8")
            }),
        _ => false,
    }
}

/// 十进制无符号整数，其它形式视为非法
pub fn parse_content_length(value: &str) -> Option<u64> {
    let value = value.trim();
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}

#[async_trait]
impl Middleware for BodyJson {
    fn name(&self) -> &'static str {
        "body_json"
    }

    async fn handle(&self, ctx: &mut RequestContext) -> Result<(), ErrorSignal> {
        if !ctx
            .header(header::CONTENT_TYPE)
            .is_some_and(is_json_content_type)
        {
            return Ok(());
        }

        // 缺失与格式错误同样拒绝；声明的长度不可信，读取时仍按上限截断
        let declared = ctx
            .header(header::CONTENT_LENGTH)
            .and_then(parse_content_length)
            .ok_or_else(|| ErrorSignal::payload_too_large("invalid content-length"))?;
        if declared > MAX_BODY_BYTES as u64 {
            return Err(ErrorSignal::payload_too_large("payload too large"));
        }

        let buf = self.read_limited(ctx).await?;
        if buf.is_empty() {
            ctx.body = Value::Object(Default::default());
            return Ok(());
        }

        ctx.body =
            serde_json::from_slice(&buf).map_err(|_| ErrorSignal::bad_request("invalid json"))?;
        Ok(())
    }
}
