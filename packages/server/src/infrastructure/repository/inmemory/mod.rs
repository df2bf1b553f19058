//! InMemory Repository 実装

mod room;
mod session;

pub use room::InMemoryRoomRepository;
pub use session::InMemorySessionRepository;
