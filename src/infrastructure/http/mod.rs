//! HTTP Layer
//!
//! 请求处理管线：路由、中间件、请求/响应封装、problem+json 错误信封。

pub mod context;
pub mod dispatcher;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod router;
pub mod routes;
pub mod server;
pub mod state;
pub mod validate;

pub use context::RequestContext;
pub use dispatcher::Dispatcher;
pub use error::ErrorSignal;
pub use response::{Cookie, ResponseWriter};
pub use router::{Handler, Router};
pub use routes::create_routes;
pub use server::{HttpServer, ServerConfig};
pub use state::{AppState, SessionSettings};
