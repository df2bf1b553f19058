//! Data Transfer Objects (DTOs).
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket message DTOs (inbound `ClientMessage`, outbound `ServerMessage`)
//! - `http`: HTTP API request / response DTOs

pub mod conversion;
pub mod http;
pub mod websocket;
