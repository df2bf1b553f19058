//! Domain layer: entities, value objects, domain services and the
//! interfaces the domain needs from the outside world.

pub mod entity;
pub mod error;
pub mod event;
pub mod factory;
pub mod message_channel;
pub mod message_pusher;
pub mod policy;
pub mod presence;
pub mod repository;
pub mod session;
pub mod value_object;

pub use entity::{
    ChatMessage, Participant, PendingDeparture, PlaybackAction, PlaybackCommand, PlaybackState,
    PlaybackStatus, Room, RoomSnapshot,
};
pub use error::{
    AccessError, MessagePushError, PlaybackError, PresenceError, RepositoryError,
    ValueObjectError,
};
pub use event::RoomEvent;
pub use factory::{ConnectionIdFactory, GuestIdentityFactory, RoomIdFactory, TokenFactory};
pub use message_channel::{Delivery, DedupWindow, MessageChannel};
pub use message_pusher::{MessagePusher, PushFrame, PusherChannel};
#[cfg(test)]
pub use message_pusher::MockMessagePusher;
pub use policy::RoomPolicy;
pub use presence::{JoinOutcome, Presence};
pub use repository::{EndedRoomLedger, RoomHandle, RoomRepository, SessionRepository};
pub use session::{SESSION_TTL_MILLIS, SessionToken, SessionValidator};
pub use value_object::{
    ConnectionId, DisplayName, Identity, MessageContent, MessageId, Role, RoomId, Timestamp,
    TokenValue, VideoId,
};
