//! Client for codepair rooms.
//!
//! A command-line client that creates or joins a room, chats, and follows the
//! room's playback with delay compensation and convergence checks. The
//! follower is usable on its own with any [`follower::VideoPlayer`].

mod command;
pub mod domain;
pub mod error;
pub mod follower;
mod formatter;
mod runner;
mod session;
mod ui;

pub use runner::{ClientConfig, RoomTarget, run_client, websocket_url};
