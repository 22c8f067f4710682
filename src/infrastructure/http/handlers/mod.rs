//! HTTP Handlers

mod chapter;
mod editor;
mod ping;
mod route;
mod story;
mod websocket;

pub use chapter::*;
pub use editor::*;
pub use ping::*;
pub use route::*;
pub use story::*;
pub use websocket::*;
