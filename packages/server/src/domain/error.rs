//! Domain error types.

use thiserror::Error;

/// Value Object の生成エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },
}

/// Why a connection was refused access to a room.
///
/// `RoomEnded` and `RoomMismatch` are permanent: the client must discard its
/// token for the room and never retry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    #[error("session token has expired")]
    Expired,

    #[error("room has ended")]
    RoomEnded,

    #[error("session token belongs to a different room")]
    RoomMismatch,

    #[error("room not found")]
    RoomNotFound,

    #[error("unknown session token")]
    InvalidToken,

    #[error("rejected: {0}")]
    Rejected(String),
}

impl AccessError {
    pub fn is_permanent(&self) -> bool {
        matches!(self, AccessError::RoomEnded | AccessError::RoomMismatch)
    }

    /// Wire name of the reason.
    pub fn code(&self) -> &'static str {
        match self {
            AccessError::Expired => "expired",
            AccessError::RoomEnded => "room_ended",
            AccessError::RoomMismatch => "room_mismatch",
            AccessError::RoomNotFound => "room_not_found",
            AccessError::InvalidToken => "invalid_token",
            AccessError::Rejected(_) => "rejected",
        }
    }
}

/// Presence registry errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresenceError {
    #[error("connection '{0}' has already joined this room")]
    AlreadyJoined(String),
}

/// Playback state machine errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("cannot {action} while {status}")]
    InvalidTransition {
        status: &'static str,
        action: &'static str,
    },

    #[error("no video is loaded")]
    MissingVideo,

    #[error("command targets video '{requested}' but '{current}' is loaded")]
    VideoMismatch { current: String, requested: String },

    #[error("playback time must be a finite, non-negative number of seconds")]
    InvalidTime,
}

/// Repository errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    #[error("room '{0}' already exists")]
    RoomAlreadyExists(String),

    #[error("room '{0}' has ended")]
    RoomEnded(String),

    #[error("persistence failure: {0}")]
    Persistence(String),
}

/// MessagePusher errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("client '{0}' not found")]
    ClientNotFound(String),

    #[error("push failed: {0}")]
    PushFailed(String),

    #[error("failed to encode event: {0}")]
    Encode(String),
}
