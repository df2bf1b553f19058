//! Domain entities.

mod chat_message;
mod participant;
mod playback;
mod room;

pub use chat_message::ChatMessage;
pub use participant::{Participant, PendingDeparture};
pub use playback::{PlaybackAction, PlaybackCommand, PlaybackState, PlaybackStatus};
pub use room::{Room, RoomSnapshot};
