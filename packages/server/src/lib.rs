//! Room coordination and real-time synchronization server.
//!
//! Rooms bring a creator and guests together over WebSocket: presence with a
//! reconnection grace window, deduplicated chat and leader-driven playback
//! state. The crate is layered the usual way:
//!
//! - `domain`: entities, value objects and the interfaces the domain needs
//! - `usecase`: one use case per room operation
//! - `infrastructure`: in-memory stores, the ended-room ledger, the WebSocket pusher and wire DTOs
//! - `ui`: the Axum router, handlers and the server runner

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;
