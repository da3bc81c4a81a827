//! Query Handlers 实现

mod session_handlers;
mod user_handlers;

pub use session_handlers::*;
pub use user_handlers::*;
