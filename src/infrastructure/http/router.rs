//! Router - 路由表与路径匹配
//!
//! 路径模板按 `/` 切分为字面量段和 `:name` 参数段，
//! 匹配要求段数相同、字面量大小写敏感；重叠模板按注册顺序先到先得。

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use http::Method;
use percent_encoding::percent_decode_str;

use super::context::RequestContext;
use super::error::ErrorSignal;
use super::middleware::Middleware;
use super::response::ResponseWriter;

/// 路由处理器
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(
        &self,
        ctx: &mut RequestContext,
        res: &mut ResponseWriter,
    ) -> Result<(), ErrorSignal>;
}

/// 路由支持的方法
pub const SUPPORTED_METHODS: [Method; 7] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::PATCH,
    Method::DELETE,
    Method::HEAD,
    Method::OPTIONS,
];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

/// 路径模板，例如 `/lms/course/:slug`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPattern {
    raw: String,
    segments: Vec<Segment>,
}

impl PathPattern {
    pub fn parse(pattern: &str) -> Self {
        let segments = pattern
            .split('/')
            .map(|seg| match seg.strip_prefix(':') {
                Some(name) if !name.is_empty() => Segment::Param(name.to_string()),
                _ => Segment::Literal(seg.to_string()),
            })
            .collect();

        Self {
            raw: pattern.to_string(),
            segments,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// 匹配成功返回解码后的参数；参数段不能为空，且解码后必须是合法 UTF-8
    pub fn matches(&self, pathname: &str) -> Option<HashMap<String, String>> {
        let parts: Vec<&str> = pathname.split('/').collect();
        if parts.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (segment, part) in self.segments.iter().zip(parts) {
            match segment {
                Segment::Literal(literal) => {
                    if literal != part {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    if part.is_empty() {
                        return None;
                    }
                    let value = percent_decode_str(part).decode_utf8().ok()?;
                    params.insert(name.clone(), value.into_owned());
                }
            }
        }
        Some(params)
    }
}

/// 已注册的路由，注册后不可变
pub struct Route {
    method: Method,
    pattern: PathPattern,
    handler: Arc<dyn Handler>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Route {
    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn pattern(&self) -> &PathPattern {
        &self.pattern
    }

    pub fn handler(&self) -> &Arc<dyn Handler> {
        &self.handler
    }

    /// 局部中间件，按注册顺序执行
    pub fn middleware(&self) -> &[Arc<dyn Middleware>] {
        &self.middleware
    }
}

/// 路由匹配结果
pub struct RouteMatch<'a> {
    pub route: &'a Route,
    pub params: HashMap<String, String>,
}

/// 路由器
#[derive(Default)]
pub struct Router {
    global: Vec<Arc<dyn Middleware>>,
    routes: Vec<Route>,
}

impl Router {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加全局中间件，对所有请求按注册顺序执行
    pub fn use_global(&mut self, middleware: impl Middleware + 'static) -> &mut Self {
        self.global.push(Arc::new(middleware));
        self
    }

    pub fn global_middleware(&self) -> &[Arc<dyn Middleware>] {
        &self.global
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    pub fn register(
        &mut self,
        method: Method,
        pattern: &str,
        handler: impl Handler + 'static,
        middleware: Vec<Arc<dyn Middleware>>,
    ) -> &mut Self {
        if !SUPPORTED_METHODS.contains(&method) {
            tracing::warn!(method = %method, pattern = pattern, "Unsupported method, route skipped");
            return self;
        }

        let pattern = PathPattern::parse(pattern);
        if self
            .routes
            .iter()
            .any(|r| r.method == method && r.pattern == pattern)
        {
            tracing::warn!(
                method = %method,
                pattern = pattern.as_str(),
                "Duplicate route, the earlier registration wins"
            );
        }

        tracing::debug!(method = %method, pattern = pattern.as_str(), "Route registered");
        self.routes.push(Route {
            method,
            pattern,
            handler: Arc::new(handler),
            middleware,
        });
        self
    }

    pub fn get(&mut self, pattern: &str, handler: impl Handler + 'static) -> &mut Self {
        self.register(Method::GET, pattern, handler, Vec::new())
    }

    pub fn post(&mut self, pattern: &str, handler: impl Handler + 'static) -> &mut Self {
        self.register(Method::POST, pattern, handler, Vec::new())
    }

    pub fn put(&mut self, pattern: &str, handler: impl Handler + 'static) -> &mut Self {
        self.register(Method::PUT, pattern, handler, Vec::new())
    }

    pub fn patch(&mut self, pattern: &str, handler: impl Handler + 'static) -> &mut Self {
        self.register(Method::PATCH, pattern, handler, Vec::new())
    }

    pub fn delete(&mut self, pattern: &str, handler: impl Handler + 'static) -> &mut Self {
        self.register(Method::DELETE, pattern, handler, Vec::new())
    }

    /// 查找第一个匹配的路由
    pub fn find(&self, method: &Method, pathname: &str) -> Option<RouteMatch<'_>> {
        self.routes
            .iter()
            .filter(|route| route.method == *method)
            .find_map(|route| {
                route
                    .pattern
                    .matches(pathname)
                    .map(|params| RouteMatch { route, params })
            })
    }
}
