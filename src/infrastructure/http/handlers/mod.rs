//! HTTP Handlers

mod auth;
mod ping;

pub use auth::*;
pub use ping::*;
