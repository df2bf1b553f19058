//! Conversion logic between DTOs and domain entities.

use codepair_shared::time::timestamp_to_jst_rfc3339;

use crate::domain::{
    AccessError, ChatMessage, Participant, PlaybackAction, PlaybackState, PlaybackStatus, Role,
    RoomEvent, RoomSnapshot, Timestamp,
};
use crate::infrastructure::dto::{
    http::{ParticipantDetailDto, RoomDetailDto},
    websocket::{
        ChatMessageDto, ParticipantInfo, PlaybackActionDto, PlaybackStateDto, PlaybackStatusDto,
        RejectReasonDto, RoleDto, ServerMessage,
    },
};

/// RFC 3339 (JST) representation, falling back to raw milliseconds for out-of-range values.
pub fn format_timestamp(timestamp: Timestamp) -> String {
    timestamp_to_jst_rfc3339(timestamp.value()).unwrap_or_else(|| timestamp.value().to_string())
}

// ========================================
// DTO → Domain
// ========================================

impl From<PlaybackActionDto> for PlaybackAction {
    fn from(dto: PlaybackActionDto) -> Self {
        match dto {
            PlaybackActionDto::Play => PlaybackAction::Play,
            PlaybackActionDto::Pause => PlaybackAction::Pause,
            PlaybackActionDto::Seek => PlaybackAction::Seek,
        }
    }
}

// ========================================
// Domain → DTO
// ========================================

impl From<Role> for RoleDto {
    fn from(role: Role) -> Self {
        match role {
            Role::Creator => RoleDto::Creator,
            Role::Guest => RoleDto::Guest,
        }
    }
}

impl From<PlaybackStatus> for PlaybackStatusDto {
    fn from(status: PlaybackStatus) -> Self {
        match status {
            PlaybackStatus::Stopped => PlaybackStatusDto::Stopped,
            PlaybackStatus::Playing => PlaybackStatusDto::Playing,
            PlaybackStatus::Paused => PlaybackStatusDto::Paused,
        }
    }
}

impl From<&AccessError> for RejectReasonDto {
    fn from(error: &AccessError) -> Self {
        match error {
            AccessError::Expired => RejectReasonDto::Expired,
            AccessError::RoomEnded => RejectReasonDto::RoomEnded,
            AccessError::RoomMismatch => RejectReasonDto::RoomMismatch,
            AccessError::RoomNotFound => RejectReasonDto::RoomNotFound,
            AccessError::InvalidToken => RejectReasonDto::InvalidToken,
            AccessError::Rejected(_) => RejectReasonDto::Rejected,
        }
    }
}

impl From<Participant> for ParticipantInfo {
    fn from(model: Participant) -> Self {
        Self {
            connected: model.is_live(),
            connection_id: model.connection_id.into_string(),
            name: model.name.into_string(),
            role: model.role.into(),
            joined_at: model.joined_at.value(),
        }
    }
}

impl From<Participant> for ParticipantDetailDto {
    fn from(model: Participant) -> Self {
        Self {
            connected: model.is_live(),
            connection_id: model.connection_id.into_string(),
            name: model.name.into_string(),
            role: model.role.into(),
            joined_at: format_timestamp(model.joined_at),
        }
    }
}

impl From<ChatMessage> for ChatMessageDto {
    fn from(model: ChatMessage) -> Self {
        Self {
            message_id: model.id.into_string(),
            sender_connection_id: model.from.into_string(),
            sender_name: model.sender_name.into_string(),
            text: model.content.into_string(),
            timestamp: model.timestamp.value(),
        }
    }
}

impl From<PlaybackState> for PlaybackStateDto {
    fn from(model: PlaybackState) -> Self {
        Self {
            video_id: model.video_id.map(|id| id.into_string()),
            time: model.time,
            status: model.status.into(),
            server_timestamp: model.updated_at.value(),
            leader: model.leader.into_string(),
            version: model.version,
        }
    }
}

impl From<RoomSnapshot> for RoomDetailDto {
    fn from(room: RoomSnapshot) -> Self {
        Self {
            id: room.id.into_string(),
            created_at: format_timestamp(room.created_at),
            participants: room.participants.into_iter().map(Into::into).collect(),
            playback: room.playback.into(),
        }
    }
}

impl From<RoomEvent> for ServerMessage {
    fn from(event: RoomEvent) -> Self {
        match event {
            RoomEvent::ParticipantsUpdated {
                room_id,
                participants,
            } => ServerMessage::ParticipantsUpdated {
                room_id: room_id.into_string(),
                participants: participants.into_iter().map(Into::into).collect(),
            },
            RoomEvent::MessageDelivered { message } => ServerMessage::MessageDelivered {
                room_id: message.room_id.as_str().to_string(),
                message: message.into(),
            },
            RoomEvent::MessageAcked {
                room_id,
                message_id,
            } => ServerMessage::MessageAcked {
                room_id: room_id.into_string(),
                message_id: message_id.into_string(),
            },
            RoomEvent::MessageHistory { room_id, messages } => ServerMessage::MessageHistory {
                room_id: room_id.into_string(),
                messages: messages.into_iter().map(Into::into).collect(),
            },
            RoomEvent::PlaybackStateChanged {
                room_id,
                state,
                authoritative,
                issued_by,
            } => ServerMessage::PlaybackStateChanged {
                room_id: room_id.into_string(),
                state: state.into(),
                authoritative,
                issued_by: issued_by.map(|id| id.into_string()),
            },
            RoomEvent::RoomEnded {
                room_id,
                ended_by_name,
            } => ServerMessage::RoomEnded {
                room_id: room_id.into_string(),
                ended_by_name,
            },
            RoomEvent::AccessRejected { room_id, reason } => ServerMessage::AccessRejected {
                room_id,
                reason: (&reason).into(),
                permanent: reason.is_permanent(),
                detail: reason.to_string(),
            },
            RoomEvent::SessionIssued {
                session,
                connection_id,
            } => ServerMessage::SessionIssued {
                expires_at: session.expires_at().value(),
                room_id: session.room_id.into_string(),
                token: session.token.into_string(),
                identity: session.holder.into_string(),
                role: session.role.into(),
                connection_id: connection_id.into_string(),
            },
        }
    }
}
