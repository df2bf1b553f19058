//! Events pushed from the core to connected clients.

use super::{
    entity::{ChatMessage, Participant, PlaybackState},
    error::AccessError,
    session::SessionToken,
    value_object::{ConnectionId, MessageId, RoomId},
};

/// Outbound room event. The transport layer decides how it is encoded.
#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    ParticipantsUpdated {
        room_id: RoomId,
        participants: Vec<Participant>,
    },
    MessageDelivered {
        message: ChatMessage,
    },
    MessageAcked {
        room_id: RoomId,
        message_id: MessageId,
    },
    MessageHistory {
        room_id: RoomId,
        messages: Vec<ChatMessage>,
    },
    PlaybackStateChanged {
        room_id: RoomId,
        state: PlaybackState,
        authoritative: bool,
        issued_by: Option<ConnectionId>,
    },
    RoomEnded {
        room_id: RoomId,
        ended_by_name: String,
    },
    AccessRejected {
        /// Raw room id as requested; it may not be a valid [`RoomId`].
        room_id: String,
        reason: AccessError,
    },
    SessionIssued {
        session: SessionToken,
        connection_id: ConnectionId,
    },
}

impl RoomEvent {
    pub fn name(&self) -> &'static str {
        match self {
            RoomEvent::ParticipantsUpdated { .. } => "participants_updated",
            RoomEvent::MessageDelivered { .. } => "message_delivered",
            RoomEvent::MessageAcked { .. } => "message_acked",
            RoomEvent::MessageHistory { .. } => "message_history",
            RoomEvent::PlaybackStateChanged { .. } => "playback_state_changed",
            RoomEvent::RoomEnded { .. } => "room_ended",
            RoomEvent::AccessRejected { .. } => "access_rejected",
            RoomEvent::SessionIssued { .. } => "session_issued",
        }
    }
}
