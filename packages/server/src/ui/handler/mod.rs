//! Request handlers.

mod http;
mod websocket;

pub use http::{create_room, get_room, health_check};
pub use websocket::websocket_handler;
