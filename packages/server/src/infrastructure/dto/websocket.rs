//! WebSocket message DTOs.
//!
//! Every frame is a JSON object tagged by `type` (snake_case). The client
//! crate reuses these types, so both directions derive Serialize and Deserialize.

use serde::{Deserialize, Serialize};

/// How a `leave` was triggered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveReasonDto {
    #[default]
    Intentional,
    Disconnect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackActionDto {
    Play,
    Pause,
    Seek,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStatusDto {
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleDto {
    Creator,
    Guest,
}

/// Wire reason of an `access_rejected` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReasonDto {
    Expired,
    RoomEnded,
    RoomMismatch,
    RoomNotFound,
    InvalidToken,
    Rejected,
}

impl RejectReasonDto {
    /// Permanent rejections must never be retried with the same token.
    pub fn is_permanent(&self) -> bool {
        matches!(self, RejectReasonDto::RoomEnded | RejectReasonDto::RoomMismatch)
    }
}

/// Messages sent by clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    Join {
        room_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token: Option<String>,
        name: String,
    },
    Leave {
        room_id: String,
        #[serde(default)]
        reason: LeaveReasonDto,
    },
    /// The next transport drop is an in-app navigation.
    Navigating {
        room_id: String,
    },
    SendMessage {
        room_id: String,
        message_id: String,
        text: String,
    },
    PlaybackCommand {
        room_id: String,
        action: PlaybackActionDto,
        time: f64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        video_id: Option<String>,
    },
    SyncRequest {
        room_id: String,
    },
    EndRoom {
        room_id: String,
    },
}

impl ClientMessage {
    pub fn room_id(&self) -> &str {
        match self {
            ClientMessage::Join { room_id, .. }
            | ClientMessage::Leave { room_id, .. }
            | ClientMessage::Navigating { room_id }
            | ClientMessage::SendMessage { room_id, .. }
            | ClientMessage::PlaybackCommand { room_id, .. }
            | ClientMessage::SyncRequest { room_id }
            | ClientMessage::EndRoom { room_id } => room_id,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantInfo {
    pub connection_id: String,
    pub name: String,
    pub role: RoleDto,
    /// Unix timestamp in milliseconds
    pub joined_at: i64,
    /// `false` while the participant's slot is held by the grace window
    pub connected: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageDto {
    pub message_id: String,
    pub sender_connection_id: String,
    pub sender_name: String,
    pub text: String,
    /// Unix timestamp in milliseconds
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackStateDto {
    #[serde(default)]
    pub video_id: Option<String>,
    /// Position in seconds at `server_timestamp`
    pub time: f64,
    pub status: PlaybackStatusDto,
    /// Unix timestamp in milliseconds
    pub server_timestamp: i64,
    pub leader: String,
    pub version: u64,
}

/// Messages pushed by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    SessionIssued {
        room_id: String,
        token: String,
        identity: String,
        role: RoleDto,
        connection_id: String,
        expires_at: i64,
    },
    ParticipantsUpdated {
        room_id: String,
        participants: Vec<ParticipantInfo>,
    },
    MessageDelivered {
        room_id: String,
        message: ChatMessageDto,
    },
    MessageAcked {
        room_id: String,
        message_id: String,
    },
    MessageHistory {
        room_id: String,
        messages: Vec<ChatMessageDto>,
    },
    PlaybackStateChanged {
        room_id: String,
        state: PlaybackStateDto,
        /// `false` for a relayed command of a non-leader
        authoritative: bool,
        #[serde(default)]
        issued_by: Option<String>,
    },
    RoomEnded {
        room_id: String,
        ended_by_name: String,
    },
    AccessRejected {
        room_id: String,
        reason: RejectReasonDto,
        permanent: bool,
        detail: String,
    },
    /// A request could not be handled (malformed frame, invalid command, ...).
    Error {
        message: String,
    },
}
