//! UI 層: axum による HTTP / WebSocket の公開面

mod handler;
mod server;
mod signal;
pub mod state;

pub use server::Server;
pub use state::AppState;
