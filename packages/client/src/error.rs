//! Error types for the codepair client.

use codepair_server::infrastructure::dto::websocket::RejectReasonDto;
use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    /// The server refused access to the room
    #[error("Access to room '{room_id}' rejected ({reason:?}): {detail}")]
    AccessRejected {
        room_id: String,
        reason: RejectReasonDto,
        detail: String,
    },

    /// The room was ended while connected
    #[error("Room '{room_id}' was ended by {ended_by}")]
    RoomEnded { room_id: String, ended_by: String },

    /// HTTP API error
    #[error("HTTP error: {0}")]
    HttpError(String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),
}

impl ClientError {
    /// Whether the error means the room must never be retried.
    pub fn is_permanent(&self) -> bool {
        match self {
            ClientError::AccessRejected { reason, .. } => reason.is_permanent(),
            ClientError::RoomEnded { .. } => true,
            ClientError::HttpError(_) | ClientError::ConnectionError(_) => false,
        }
    }
}
